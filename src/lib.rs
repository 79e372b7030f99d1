//! Role-gated CRM core for a music production studio.
//!
//! Clients, projects, and tasks live in a local SQLite store; every
//! derived number (money remaining, status buckets, the trailing-month
//! series, commission) is computed on demand by the pure `metrics` module,
//! and every action or financial field is gated by the pure `permissions`
//! module. The `commands` module is the operation surface that ties the
//! two to the store.

pub mod commands;
pub mod db;
pub mod devtools;
pub mod error;
pub mod metrics;
mod migrations;
pub mod permissions;
pub mod reports;
pub mod types;
pub mod util;
