//! Filtered bulk edits of an engineering model.
//!
//! A run opens a model snapshot, computes the element scope from the filter
//! criteria, lets exactly one batch command stage its edits as transactions
//! and commits the changeset back to disk unless it is a dry run.

pub mod cli;
pub mod commands;
pub mod domain;
pub mod error;
pub mod services;

#[cfg(test)]
pub mod test_support;

pub use cli::{Action, Cli, SwitchKind};
pub use commands::{dispatch, execute, handle_run, BatchCommands, BatchEditor};
pub use domain::models::{JsonOut, ModelSnapshot, RunReport};
pub use error::SessionError;
