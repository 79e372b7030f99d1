//! Pure derivations over already-fetched collections.
//!
//! Every page-level number in the product comes from here: money remaining
//! per project, status buckets, the trailing-six-month series behind the
//! dashboard charts, and commission amounts. Nothing in this module touches
//! the store, reads the clock, or fails: missing or malformed optional
//! fields coerce to zero by policy, and the time-series anchor is a `now`
//! the caller captured exactly once.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::types::{Client, Project};
use crate::util::parse_date;

/// Number of calendar months covered by [`monthly_series`], current month
/// included.
pub const TRAILING_MONTHS: u32 = 6;

/// Budget minus amount already paid, both defaulting to zero.
///
/// The sign is preserved: a negative result means the client has overpaid,
/// and callers render it differently rather than clamping it here.
pub fn money_left(project: &Project) -> f64 {
    project.budget.unwrap_or(0.0) - project.amount_paid.unwrap_or(0.0)
}

/// Commission owed on a project: `budget * percentage / 100`, but only when
/// commission is enabled and a budget is present. Everything else is 0,
/// including an enabled project with no budget and a disabled project with
/// a percentage on file.
pub fn commission(project: &Project) -> f64 {
    if !project.commission_enabled {
        return 0.0;
    }
    match project.budget {
        Some(budget) => budget * project.commission_percentage.unwrap_or(0.0) / 100.0,
        None => 0.0,
    }
}

/// Progress for display: missing → 0, out-of-range values clamped to
/// 0..=100. Input widgets constrain the range but the store does not, so
/// the derivation has to degrade gracefully.
pub fn progress_value(project: &Project) -> u8 {
    project.progress.unwrap_or(0).clamp(0, 100) as u8
}

/// One status bucket: a known status label and how many projects carry it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Count projects per status label, in label order. Only exact string
/// matches count; a project with a status outside `labels` lands in no
/// bucket, which is not an error.
pub fn status_counts(projects: &[Project], labels: &[&str]) -> Vec<StatusCount> {
    count_labels(projects.iter().map(|p| p.status.as_str()), labels)
}

/// Same bucketing for tasks, over the task vocabulary.
pub fn task_status_counts(tasks: &[crate::types::Task]) -> Vec<StatusCount> {
    count_labels(
        tasks.iter().map(|t| t.status.as_str()),
        &crate::types::TASK_STATUSES,
    )
}

fn count_labels<'a>(
    statuses: impl Iterator<Item = &'a str> + Clone,
    labels: &[&str],
) -> Vec<StatusCount> {
    labels
        .iter()
        .map(|label| StatusCount {
            status: (*label).to_string(),
            count: statuses.clone().filter(|s| s == label).count(),
        })
        .collect()
}

/// One month of the trailing series.
///
/// `revenue` is always present; when the caller lacks money visibility it
/// is reported as 0 rather than omitted, so downstream rendering never has
/// to special-case its absence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub month: String,
    pub clients: usize,
    pub projects: usize,
    pub revenue: f64,
}

/// Build the trailing-[`TRAILING_MONTHS`]-month series, oldest month first.
///
/// Each bucket covers one calendar month, inclusive on both ends as dates:
/// a row created any time on the first or last day of the month belongs to
/// that month. `now` anchors the whole window set and is captured once by
/// the caller, so all six boundaries stay consistent even across midnight.
/// Rows with an unparseable `created_at` fall in no bucket.
pub fn monthly_series(
    clients: &[Client],
    projects: &[Project],
    show_money: bool,
    now: DateTime<Utc>,
) -> Vec<MonthlyBucket> {
    let anchor = now.date_naive();
    let mut series = Vec::with_capacity(TRAILING_MONTHS as usize);

    for i in (0..TRAILING_MONTHS).rev() {
        let (start, end) = month_window(anchor, i);

        let month_clients = clients
            .iter()
            .filter(|c| created_within(&c.created_at, start, end))
            .count();

        let month_projects: Vec<&Project> = projects
            .iter()
            .filter(|p| created_within(&p.created_at, start, end))
            .collect();

        let revenue = if show_money {
            month_projects
                .iter()
                .map(|p| p.amount_paid.unwrap_or(0.0))
                .sum()
        } else {
            0.0
        };

        series.push(MonthlyBucket {
            month: start.format("%b %y").to_string(),
            clients: month_clients,
            projects: month_projects.len(),
            revenue,
        });
    }

    series
}

/// First and last day of the month `months_back` before the anchor's month.
fn month_window(anchor: NaiveDate, months_back: u32) -> (NaiveDate, NaiveDate) {
    let total = anchor.year() * 12 + anchor.month0() as i32 - months_back as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;

    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .expect("first of month is always a valid date");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("first of month is always a valid date");

    (start, next.pred_opt().unwrap_or(start))
}

fn created_within(created_at: &str, start: NaiveDate, end: NaiveDate) -> bool {
    match parse_date(created_at) {
        Some(date) => date >= start && date <= end,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            client_id: "c1".to_string(),
            status: "Active".to_string(),
            progress: Some(50),
            budget: None,
            amount_paid: None,
            start_date: None,
            commission_enabled: false,
            commission_percentage: None,
            created_at: "2026-08-10T12:00:00+00:00".to_string(),
        }
    }

    fn client(id: &str, created_at: &str) -> Client {
        Client {
            id: id.to_string(),
            name: format!("Client {id}"),
            email: None,
            phone: None,
            status: "Active".to_string(),
            created_at: created_at.to_string(),
        }
    }

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 10, 30, 0).unwrap()
    }

    #[test]
    fn money_left_basic_and_negative() {
        let mut p = project("p1");
        p.budget = Some(10_000.0);
        p.amount_paid = Some(4_000.0);
        assert_eq!(money_left(&p), 6_000.0);

        p.budget = Some(4_000.0);
        p.amount_paid = Some(9_000.0);
        assert_eq!(money_left(&p), -5_000.0);
    }

    #[test]
    fn money_left_treats_missing_as_zero() {
        let mut p = project("p1");
        assert_eq!(money_left(&p), 0.0);

        p.amount_paid = Some(500.0);
        assert_eq!(money_left(&p), -500.0);
    }

    #[test]
    fn commission_requires_flag_and_budget() {
        let mut p = project("p1");
        p.commission_enabled = true;
        p.budget = Some(20_000.0);
        p.commission_percentage = Some(15.0);
        assert_eq!(commission(&p), 3_000.0);

        p.commission_enabled = false;
        assert_eq!(commission(&p), 0.0);

        p.commission_enabled = true;
        p.budget = None;
        assert_eq!(commission(&p), 0.0);

        p.budget = Some(20_000.0);
        p.commission_percentage = None;
        assert_eq!(commission(&p), 0.0);
    }

    #[test]
    fn progress_degrades_gracefully() {
        let mut p = project("p1");
        p.progress = None;
        assert_eq!(progress_value(&p), 0);

        p.progress = Some(-20);
        assert_eq!(progress_value(&p), 0);

        p.progress = Some(250);
        assert_eq!(progress_value(&p), 100);

        p.progress = Some(73);
        assert_eq!(progress_value(&p), 73);
    }

    #[test]
    fn status_counts_skips_unknown_statuses() {
        let mut projects = vec![project("p1"), project("p2"), project("p3"), project("p4")];
        projects[1].status = "On Hold".to_string();
        projects[2].status = "In Progress".to_string(); // legacy vocabulary
        projects[3].status = "Completed".to_string();

        let counts = status_counts(&projects, &crate::types::PROJECT_STATUSES);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[0].status, "Active");
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].count, 1); // On Hold
        assert_eq!(counts[2].count, 1); // Completed
        assert_eq!(counts[3].count, 0); // Cancelled
        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, 3, "unknown status must land in no bucket");
    }

    #[test]
    fn task_buckets_follow_task_vocabulary() {
        let task = |status: &str| crate::types::Task {
            id: "t".to_string(),
            title: "T".to_string(),
            project_id: "p1".to_string(),
            status: status.to_string(),
            due_date: None,
            created_at: "2026-08-10T00:00:00+00:00".to_string(),
        };
        let tasks = vec![task("To Do"), task("To Do"), task("Completed"), task("Blocked")];

        let counts = task_status_counts(&tasks);
        assert_eq!(counts[0].status, "To Do");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].count, 0); // In Progress
        assert_eq!(counts[2].count, 1); // Completed
    }

    #[test]
    fn series_has_six_buckets_oldest_first() {
        let series = monthly_series(&[], &[], true, anchor());
        assert_eq!(series.len(), 6);
        assert_eq!(series[0].month, "Mar 26");
        assert_eq!(series[5].month, "Aug 26");
        for bucket in &series {
            assert_eq!(bucket.clients, 0);
            assert_eq!(bucket.projects, 0);
            assert_eq!(bucket.revenue, 0.0);
        }
    }

    #[test]
    fn one_client_per_month_lands_in_each_bucket() {
        let clients = vec![
            client("c1", "2026-03-01T00:00:00+00:00"),
            client("c2", "2026-04-15T09:00:00+00:00"),
            client("c3", "2026-05-31T23:59:00+00:00"),
            client("c4", "2026-06-30T18:00:00+00:00"),
            client("c5", "2026-07-04T12:00:00+00:00"),
            client("c6", "2026-08-29T08:00:00+00:00"),
        ];

        let series = monthly_series(&clients, &[], false, anchor());
        for bucket in &series {
            assert_eq!(bucket.clients, 1, "bucket {}", bucket.month);
        }
    }

    #[test]
    fn project_counts_sum_to_window_total() {
        let mut projects = Vec::new();
        let dates = [
            "2026-03-05T12:00:00+00:00",
            "2026-03-28T12:00:00+00:00",
            "2026-06-01T12:00:00+00:00",
            "2026-08-29T12:00:00+00:00",
            "2027-01-01T12:00:00+00:00", // future, outside the window
            "2025-12-31T12:00:00+00:00", // too old
        ];
        for (i, date) in dates.iter().enumerate() {
            let mut p = project(&format!("p{i}"));
            p.created_at = (*date).to_string();
            projects.push(p);
        }

        let series = monthly_series(&[], &projects, false, anchor());
        let total: usize = series.iter().map(|b| b.projects).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn revenue_follows_money_visibility() {
        let mut p = project("p1");
        p.amount_paid = Some(12_500.0);
        p.created_at = "2026-08-02T12:00:00+00:00".to_string();

        let visible = monthly_series(&[], &[p.clone()], true, anchor());
        assert_eq!(visible[5].revenue, 12_500.0);

        let hidden = monthly_series(&[], &[p], false, anchor());
        assert_eq!(hidden[5].revenue, 0.0);
        assert_eq!(hidden[5].projects, 1, "counts stay even when money is hidden");
    }

    #[test]
    fn window_spans_a_year_boundary() {
        let january = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let series = monthly_series(&[], &[], false, january);
        assert_eq!(series[0].month, "Aug 25");
        assert_eq!(series[5].month, "Jan 26");
    }

    #[test]
    fn malformed_created_at_falls_in_no_bucket() {
        let clients = vec![client("c1", "not-a-date"), client("c2", "")];
        let series = monthly_series(&clients, &[], false, anchor());
        let total: usize = series.iter().map(|b| b.clients).sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn series_is_idempotent_for_fixed_anchor() {
        let clients = vec![client("c1", "2026-07-10T00:00:00+00:00")];
        let mut p = project("p1");
        p.amount_paid = Some(900.0);
        p.created_at = "2026-07-11T00:00:00+00:00".to_string();
        let projects = vec![p];

        let a = monthly_series(&clients, &projects, true, anchor());
        let b = monthly_series(&clients, &projects, true, anchor());
        assert_eq!(a, b);
    }
}
