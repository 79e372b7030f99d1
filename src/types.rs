//! Domain records for the studio CRM.
//!
//! These mirror the four store tables one-to-one. Nullable columns are
//! `Option`; all timestamps are RFC 3339 strings. Derived values
//! (money-left, commission) are never stored on these records; they are
//! computed on demand by the `metrics` module.

use serde::{Deserialize, Serialize};

/// Default status for a client row when none was supplied.
pub const DEFAULT_CLIENT_STATUS: &str = "Active";

/// Canonical project status vocabulary. Unknown statuses are stored and
/// displayed as-is but fall into no report bucket.
pub const PROJECT_STATUSES: [&str; 4] = ["Active", "On Hold", "Completed", "Cancelled"];

/// Task status vocabulary.
pub const TASK_STATUSES: [&str; 3] = ["To Do", "In Progress", "Completed"];

/// A row from the `clients` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// A row from the `projects` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub client_id: String,
    pub status: String,
    pub progress: Option<i64>,
    pub budget: Option<f64>,
    pub amount_paid: Option<f64>,
    pub start_date: Option<String>,
    pub commission_enabled: bool,
    pub commission_percentage: Option<f64>,
    pub created_at: String,
}

/// A row from the `tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub project_id: String,
    pub status: String,
    pub due_date: Option<String>,
    pub created_at: String,
}

/// A row from the `user_roles` table.
///
/// The `role` column is a free-form string in storage; it resolves to a
/// [`crate::permissions::Role`] (or to no role at all) only at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub id: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

/// Fields accepted when creating or updating a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

/// Fields accepted when creating or updating a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    pub client_id: String,
    pub status: Option<String>,
    pub progress: Option<i64>,
    pub budget: Option<f64>,
    pub amount_paid: Option<f64>,
    pub start_date: Option<String>,
    #[serde(default)]
    pub commission_enabled: bool,
    pub commission_percentage: Option<f64>,
}

/// Fields accepted when creating or updating a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    pub project_id: String,
    pub status: Option<String>,
    pub due_date: Option<String>,
}
