//! Service layer containing the engine behind the batch commands and its
//! side-effect helpers.
//!
//! ## Service map
//! - `filter.rs`: element, category and owner scope of a run.
//! - `cache.rs`: identity index over the opened snapshot.
//! - `staging.rs`: transactions on checked-out copies, in submission order.
//! - `conversion.rs`: scale conversion of a parameter and its subscriptions.
//! - `session.rs`: file-backed session: open, dispatch, replay and commit.
//! - `storage.rs`: snapshot persistence, digests and the audit log.
//! - `report.rs`: CSV parameter report.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod cache;
pub mod conversion;
pub mod filter;
pub mod output;
pub mod report;
pub mod session;
pub mod staging;
pub mod storage;
