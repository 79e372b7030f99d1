//! Demo data seeding.
//!
//! Populates an empty store with a bootstrap admin account, one user per
//! role, and a small client/project/task tree spread across the trailing
//! months so the dashboard series has something to show. Refuses to run
//! against a store that already has clients.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db::StudioDb;
use crate::error::AppError;
use crate::types::{Client, Project, Task, UserRole};

#[derive(Debug)]
pub struct SeedSummary {
    pub admin_user_id: String,
    pub sales_user_id: String,
    pub producer_user_id: String,
    pub clients: usize,
    pub projects: usize,
    pub tasks: usize,
}

/// Seed the demo dataset. Errors if the store already has client rows.
pub fn seed_demo_data(db: &StudioDb) -> Result<SeedSummary, AppError> {
    if !db.get_all_clients()?.is_empty() {
        return Err(AppError::Validation(
            "store already contains data; seed requires an empty database".to_string(),
        ));
    }

    let now = Utc::now();
    let months_ago = |m: i64| (now - Duration::days(30 * m)).to_rfc3339();

    let admin = user("admin@studiodesk.local", "admin", &months_ago(6));
    let sales = user("sales@studiodesk.local", "sales_team", &months_ago(6));
    let producer = user("producer@studiodesk.local", "music_producer", &months_ago(6));
    db.insert_user_role(&admin)?;
    db.insert_user_role(&sales)?;
    db.insert_user_role(&producer)?;

    let clients = vec![
        client("Asha Beats", Some("asha@example.com"), &months_ago(5)),
        client("Ravi Films", Some("ravi@example.com"), &months_ago(3)),
        client("Meera Collective", None, &months_ago(1)),
    ];
    for c in &clients {
        db.insert_client(c)?;
    }

    let projects = vec![
        project(
            "Debut EP",
            &clients[0].id,
            "Active",
            60,
            Some(250_000.0),
            Some(100_000.0),
            true,
            Some(10.0),
            &months_ago(4),
        ),
        project(
            "Festival Jingle",
            &clients[0].id,
            "Completed",
            100,
            Some(40_000.0),
            Some(40_000.0),
            false,
            None,
            &months_ago(3),
        ),
        project(
            "Film Score",
            &clients[1].id,
            "On Hold",
            25,
            Some(600_000.0),
            Some(150_000.0),
            true,
            Some(15.0),
            &months_ago(2),
        ),
        project(
            "Live Session Mix",
            &clients[2].id,
            "Active",
            10,
            None,
            None,
            false,
            None,
            &months_ago(0),
        ),
    ];
    for p in &projects {
        db.insert_project(p)?;
    }

    let tasks = vec![
        task("Track vocals", &projects[0].id, "Completed", &months_ago(4)),
        task("Mix master", &projects[0].id, "In Progress", &months_ago(1)),
        task("Score first act", &projects[2].id, "To Do", &months_ago(2)),
        task("Book studio time", &projects[3].id, "To Do", &months_ago(0)),
    ];
    for t in &tasks {
        db.insert_task(t)?;
    }

    log::info!(
        "Seeded demo data: {} clients, {} projects, {} tasks",
        clients.len(),
        projects.len(),
        tasks.len()
    );

    Ok(SeedSummary {
        admin_user_id: admin.id,
        sales_user_id: sales.id,
        producer_user_id: producer.id,
        clients: clients.len(),
        projects: projects.len(),
        tasks: tasks.len(),
    })
}

fn user(email: &str, role: &str, created_at: &str) -> UserRole {
    UserRole {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        role: role.to_string(),
        created_at: created_at.to_string(),
    }
}

fn client(name: &str, email: Option<&str>, created_at: &str) -> Client {
    Client {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.map(str::to_string),
        phone: None,
        status: "Active".to_string(),
        created_at: created_at.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn project(
    name: &str,
    client_id: &str,
    status: &str,
    progress: i64,
    budget: Option<f64>,
    amount_paid: Option<f64>,
    commission_enabled: bool,
    commission_percentage: Option<f64>,
    created_at: &str,
) -> Project {
    Project {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        client_id: client_id.to_string(),
        status: status.to_string(),
        progress: Some(progress),
        budget,
        amount_paid,
        start_date: None,
        commission_enabled,
        commission_percentage,
        created_at: created_at.to_string(),
    }
}

fn task(title: &str, project_id: &str, status: &str, created_at: &str) -> Task {
    Task {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        project_id: project_id.to_string(),
        status: status.to_string(),
        due_date: None,
        created_at: created_at.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands;
    use crate::db::test_support::test_db;
    use crate::permissions::Role;

    #[test]
    fn seed_populates_all_tables() {
        let db = test_db();
        let summary = seed_demo_data(&db).unwrap();

        assert_eq!(db.get_all_clients().unwrap().len(), summary.clients);
        assert_eq!(db.get_all_projects().unwrap().len(), summary.projects);
        assert_eq!(db.get_all_user_roles().unwrap().len(), 3);

        assert_eq!(
            commands::fetch_role(&db, &summary.admin_user_id).unwrap(),
            Some(Role::Admin)
        );
        assert_eq!(
            commands::fetch_role(&db, &summary.producer_user_id).unwrap(),
            Some(Role::MusicProducer)
        );
    }

    #[test]
    fn seed_refuses_populated_store() {
        let db = test_db();
        seed_demo_data(&db).unwrap();
        assert!(seed_demo_data(&db).is_err());
    }

    #[test]
    fn seeded_dashboard_and_commission_are_consistent() {
        let db = test_db();
        seed_demo_data(&db).unwrap();

        let summary = commands::dashboard(&db, Some(Role::Admin)).unwrap();
        assert_eq!(summary.total_projects, 4);
        assert!(summary.total_budget > 0.0);

        let report = commands::commission(
            &db,
            Some(Role::SalesTeam),
            crate::reports::CommissionFilter::EnabledOnly,
        )
        .unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.enabled_count, 2);
        assert_eq!(report.total_count, 4);
        // 10% of 250k + 15% of 600k
        assert_eq!(report.total_commission, 115_000.0);
    }
}
