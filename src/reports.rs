//! Consolidated view models.
//!
//! The product's pages each used to recompute money-left, status buckets,
//! and the monthly series inline. These builders derive every page-level
//! view in one place so all callers agree on the numbers. They are pure:
//! collections in, serializable view structs out. Permission gating
//! happens via the `show_money` dimension here and via the command layer
//! for whole-report access.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::{
    commission, money_left, monthly_series, progress_value, status_counts, task_status_counts,
    MonthlyBucket, StatusCount,
};
use crate::permissions::{can_see_money, role_label, Role};
use crate::types::{Client, Project, Task, PROJECT_STATUSES};

/// Placeholder shown when a project references a client that is not in the
/// supplied collection. Lookup misses never fail.
pub const UNKNOWN_CLIENT: &str = "Unknown client";

/// The dashboard header: totals, status buckets, trailing-month series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub role_label: String,
    pub show_money: bool,
    pub total_clients: usize,
    pub total_projects: usize,
    /// Sum of amount-paid over all projects; 0 when money is hidden.
    pub total_revenue: f64,
    /// Sum of budgets over all projects; 0 when money is hidden.
    pub total_budget: f64,
    pub status_counts: Vec<StatusCount>,
    pub monthly: Vec<MonthlyBucket>,
}

/// Build the dashboard from already-fetched collections.
///
/// When the role lacks money visibility the revenue and budget totals are
/// not computed at all (the money fields are never even read) and the
/// series carries zeroed revenue.
pub fn dashboard_summary(
    clients: &[Client],
    projects: &[Project],
    role: Option<Role>,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let show_money = can_see_money(role);

    let (total_revenue, total_budget) = if show_money {
        (
            projects.iter().map(|p| p.amount_paid.unwrap_or(0.0)).sum(),
            projects.iter().map(|p| p.budget.unwrap_or(0.0)).sum(),
        )
    } else {
        (0.0, 0.0)
    };

    DashboardSummary {
        role_label: role_label(role).to_string(),
        show_money,
        total_clients: clients.len(),
        total_projects: projects.len(),
        total_revenue,
        total_budget,
        status_counts: status_counts(projects, &PROJECT_STATUSES),
        monthly: monthly_series(clients, projects, show_money, now),
    }
}

/// One row of the projects listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub client_name: String,
    pub status: String,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<f64>,
    /// Signed: negative means the client overpaid. Absent when the role
    /// lacks money visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money_left: Option<f64>,
}

/// Project rows with client names resolved and money derived. Rows keep
/// the order the projects came in.
pub fn project_overview(
    projects: &[Project],
    clients: &[Client],
    role: Option<Role>,
) -> Vec<ProjectRow> {
    let show_money = can_see_money(role);
    let names: HashMap<&str, &str> = clients
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    projects
        .iter()
        .map(|p| ProjectRow {
            id: p.id.clone(),
            name: p.name.clone(),
            client_name: names
                .get(p.client_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_CLIENT)
                .to_string(),
            status: p.status.clone(),
            progress: progress_value(p),
            budget: if show_money { p.budget } else { None },
            amount_paid: if show_money { p.amount_paid } else { None },
            money_left: show_money.then(|| money_left(p)),
        })
        .collect()
}

/// The project detail view: the row itself plus its tasks and their
/// status buckets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub project: ProjectRow,
    pub tasks: Vec<Task>,
    pub task_status: Vec<StatusCount>,
}

/// Build the detail view for one project. `client` is the project's owner
/// if it resolved; a miss renders the placeholder, never an error.
pub fn project_detail(
    project: &Project,
    client: Option<&Client>,
    tasks: &[Task],
    role: Option<Role>,
) -> ProjectDetail {
    let owner = client.map(std::slice::from_ref).unwrap_or(&[]);
    let mut rows = project_overview(std::slice::from_ref(project), owner, role);

    ProjectDetail {
        project: rows.remove(0),
        tasks: tasks.to_vec(),
        task_status: task_status_counts(tasks),
    }
}

/// Which projects the commission report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissionFilter {
    All,
    EnabledOnly,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRow {
    pub project_id: String,
    pub project_name: String,
    pub client_name: String,
    pub status: String,
    pub budget: Option<f64>,
    pub commission_enabled: bool,
    pub commission_percentage: f64,
    pub commission_amount: f64,
}

/// The sales-commission report.
///
/// `total_budget` and `total_commission` are summed over the same filtered
/// set as `rows`, so switching the filter moves them together.
/// `enabled_count` / `total_count` always describe the full project
/// collection, filter or not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionReport {
    pub total_budget: f64,
    pub total_commission: f64,
    pub enabled_count: usize,
    pub total_count: usize,
    pub rows: Vec<CommissionRow>,
}

pub fn commission_report(
    projects: &[Project],
    clients: &[Client],
    filter: CommissionFilter,
) -> CommissionReport {
    let names: HashMap<&str, &str> = clients
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    let filtered: Vec<&Project> = projects
        .iter()
        .filter(|p| filter == CommissionFilter::All || p.commission_enabled)
        .collect();

    let total_budget = filtered.iter().map(|p| p.budget.unwrap_or(0.0)).sum();
    let total_commission = filtered.iter().map(|p| commission(p)).sum();

    let rows = filtered
        .iter()
        .map(|p| CommissionRow {
            project_id: p.id.clone(),
            project_name: p.name.clone(),
            client_name: names
                .get(p.client_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_CLIENT)
                .to_string(),
            status: p.status.clone(),
            budget: p.budget,
            commission_enabled: p.commission_enabled,
            commission_percentage: p.commission_percentage.unwrap_or(0.0),
            commission_amount: commission(p),
        })
        .collect();

    CommissionReport {
        total_budget,
        total_commission,
        enabled_count: projects.iter().filter(|p| p.commission_enabled).count(),
        total_count: projects.len(),
        rows,
    }
}
