//! Backend core for the coding practice platform: admission control for
//! incoming solution attempts, verdict classification, and the per-user
//! progress ledger (points, solved set, daily streak).
//!
//! Catalog CRUD, authentication, and code execution live elsewhere; this
//! crate consumes judge results and store collaborators through traits.

pub mod config;
pub mod error;
pub mod submissions;
pub mod telemetry;
