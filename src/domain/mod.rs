//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Mirror the engineering model a session opens: reference data
//!   (domains, scales, parameter types) and one iteration of element
//!   definitions, parameters, subscriptions and value sets.
//! - Keep report/output structs in one place.
//!
//! ## Files
//! - `models.rs`: model snapshot, value sets, run report structs.
//! - `constants.rs`: sentinel value, scale factors, prescribed owners.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem side effects.
//!
//! ## Compatibility note
//! These structs are the on-disk model format and the `--json` output.
//! Keep schema-impacting changes synchronized with `docs/contracts/*`.

pub mod constants;
pub mod models;
