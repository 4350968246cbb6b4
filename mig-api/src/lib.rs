//! HTTP control surface for the migration validator.
//!
//! Exposes table listings and pool statistics for both databases, the
//! per-table migration status, and the two run triggers (`init` for the
//! bulk copy, `sync` for drift reconciliation) under the `/validator`
//! base path.

pub mod routes;
pub mod startup;
