//! Error types for the session and commit layer.
//!
//! Batch commands never fail: lookup and conversion problems are logged and
//! the run continues. What can fail is reading the snapshot and replaying the
//! staged changeset onto it.

use crate::domain::models::Iid;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The snapshot file could not be read or parsed.
    #[error("cannot open model {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("cannot write model {path}: {reason}")]
    Unwritable { path: PathBuf, reason: String },

    /// Another writer touched the file between open and commit.
    #[error("model {path} changed on disk since it was opened (expected digest {expected}, found {found}); nothing committed")]
    ModelChanged {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A staged transaction names a thing the snapshot does not contain.
    #[error("staged {operation} targets {iid}, which is not in the model")]
    MissingThing { operation: &'static str, iid: Iid },

    /// The clone and the live thing at its identity are of different classes.
    #[error("staged {operation} on {iid}: expected a {expected}")]
    ClassMismatch {
        operation: &'static str,
        iid: Iid,
        expected: &'static str,
    },

    /// A created child cannot be contained by the thing it was attached to.
    #[error("a {child} cannot be contained in a {container}")]
    InvalidContainment {
        child: &'static str,
        container: &'static str,
    },
}
