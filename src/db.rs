//! SQLite-backed store for clients, projects, tasks, and user roles.
//!
//! The database lives at `~/.studiodesk/studio.db` (override with the
//! `STUDIODESK_DB` environment variable). This is the local stand-in for
//! the hosted backend the product originally ran against: plain keyed CRUD
//! plus the explicit cascade deletes. No derived value is ever stored here;
//! money-left, commission, and the report series are computed on demand by
//! the `metrics` module.

use std::path::PathBuf;

use rusqlite::{params, Connection, Row};

use crate::error::AppError;
use crate::migrations::run_migrations;
use crate::types::{Client, Project, Task, UserRole};

/// SQLite connection wrapper.
///
/// Intentionally not `Clone` or `Sync`; callers that need shared access
/// hold it behind a mutex. The CLI here is single-threaded.
pub struct StudioDb {
    conn: Connection,
}

impl StudioDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at the default path and bring the
    /// schema up to date.
    pub fn open() -> Result<Self, AppError> {
        Self::open_at(Self::db_path()?)
    }

    /// Open a database at an explicit path. Used by tests.
    pub fn open_at(path: PathBuf) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(AppError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Resolve the database path: `$STUDIODESK_DB` if set, otherwise
    /// `~/.studiodesk/studio.db`.
    fn db_path() -> Result<PathBuf, AppError> {
        if let Ok(path) = std::env::var("STUDIODESK_DB") {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let home = dirs::home_dir().ok_or(AppError::HomeDirNotFound)?;
        Ok(home.join(".studiodesk").join("studio.db"))
    }

    // =========================================================================
    // Clients
    // =========================================================================

    pub fn insert_client(&self, client: &Client) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO clients (id, name, email, phone, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                client.id,
                client.name,
                client.email,
                client.phone,
                client.status,
                client.created_at
            ],
        )?;
        Ok(())
    }

    pub fn get_client(&self, id: &str) -> Result<Option<Client>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, status, created_at
             FROM clients WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], map_client)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All clients, newest first.
    pub fn get_all_clients(&self) -> Result<Vec<Client>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, status, created_at
             FROM clients ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], map_client)?;
        collect(rows)
    }

    pub fn update_client(&self, client: &Client) -> Result<(), AppError> {
        let changed = self.conn.execute(
            "UPDATE clients SET name = ?2, email = ?3, phone = ?4, status = ?5
             WHERE id = ?1",
            params![
                client.id,
                client.name,
                client.email,
                client.phone,
                client.status
            ],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound {
                entity: "client",
                id: client.id.clone(),
            });
        }
        Ok(())
    }

    /// Delete a client and everything under it.
    ///
    /// Three explicit steps, in dependency order: the client's projects'
    /// tasks, then the projects, then the client row. The schema carries no
    /// FK cascade; this mirrors how the hosted backend was driven.
    /// Returns `(tasks_deleted, projects_deleted)`.
    pub fn delete_client_cascade(&self, id: &str) -> Result<(usize, usize), AppError> {
        let tasks = self.conn.execute(
            "DELETE FROM tasks WHERE project_id IN
               (SELECT id FROM projects WHERE client_id = ?1)",
            params![id],
        )?;
        let projects = self
            .conn
            .execute("DELETE FROM projects WHERE client_id = ?1", params![id])?;
        let clients = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1", params![id])?;
        if clients == 0 {
            return Err(AppError::NotFound {
                entity: "client",
                id: id.to_string(),
            });
        }
        log::info!(
            "Deleted client {} ({} projects, {} tasks)",
            id,
            projects,
            tasks
        );
        Ok((tasks, projects))
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub fn insert_project(&self, project: &Project) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO projects (id, name, client_id, status, progress, budget,
                                   amount_paid, start_date, commission_enabled,
                                   commission_percentage, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                project.id,
                project.name,
                project.client_id,
                project.status,
                project.progress,
                project.budget,
                project.amount_paid,
                project.start_date,
                project.commission_enabled as i64,
                project.commission_percentage,
                project.created_at
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLS} FROM projects WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], map_project)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All projects, newest first.
    pub fn get_all_projects(&self) -> Result<Vec<Project>, AppError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLS} FROM projects ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], map_project)?;
        collect(rows)
    }

    pub fn get_projects_for_client(&self, client_id: &str) -> Result<Vec<Project>, AppError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLS} FROM projects
             WHERE client_id = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map(params![client_id], map_project)?;
        collect(rows)
    }

    pub fn update_project(&self, project: &Project) -> Result<(), AppError> {
        let changed = self.conn.execute(
            "UPDATE projects SET name = ?2, client_id = ?3, status = ?4, progress = ?5,
                                 budget = ?6, amount_paid = ?7, start_date = ?8,
                                 commission_enabled = ?9, commission_percentage = ?10
             WHERE id = ?1",
            params![
                project.id,
                project.name,
                project.client_id,
                project.status,
                project.progress,
                project.budget,
                project.amount_paid,
                project.start_date,
                project.commission_enabled as i64,
                project.commission_percentage
            ],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound {
                entity: "project",
                id: project.id.clone(),
            });
        }
        Ok(())
    }

    /// Delete a project and its tasks: tasks first, then the project row.
    /// Returns the number of tasks deleted.
    pub fn delete_project_cascade(&self, id: &str) -> Result<usize, AppError> {
        let tasks = self
            .conn
            .execute("DELETE FROM tasks WHERE project_id = ?1", params![id])?;
        let projects = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if projects == 0 {
            return Err(AppError::NotFound {
                entity: "project",
                id: id.to_string(),
            });
        }
        log::info!("Deleted project {} ({} tasks)", id, tasks);
        Ok(tasks)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, project_id, status, due_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.id,
                task.title,
                task.project_id,
                task.status,
                task.due_date,
                task.created_at
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, project_id, status, due_date, created_at
             FROM tasks WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], map_task)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Tasks for a project, oldest first (creation order).
    pub fn get_tasks_for_project(&self, project_id: &str) -> Result<Vec<Task>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, project_id, status, due_date, created_at
             FROM tasks WHERE project_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![project_id], map_task)?;
        collect(rows)
    }

    pub fn update_task(&self, task: &Task) -> Result<(), AppError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?2, project_id = ?3, status = ?4, due_date = ?5
             WHERE id = ?1",
            params![task.id, task.title, task.project_id, task.status, task.due_date],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound {
                entity: "task",
                id: task.id.clone(),
            });
        }
        Ok(())
    }

    pub fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(AppError::NotFound {
                entity: "task",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // User roles
    // =========================================================================

    pub fn insert_user_role(&self, user: &UserRole) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO user_roles (id, email, role, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.email, user.role, user.created_at],
        )?;
        Ok(())
    }

    /// Single-row keyed lookup. A missing row is `None`, not an error.
    pub fn get_user_role(&self, id: &str) -> Result<Option<UserRole>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, role, created_at FROM user_roles WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], map_user_role)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_all_user_roles(&self) -> Result<Vec<UserRole>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, role, created_at FROM user_roles ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map([], map_user_role)?;
        collect(rows)
    }

    pub fn set_user_role(&self, id: &str, role: &str) -> Result<(), AppError> {
        let changed = self.conn.execute(
            "UPDATE user_roles SET role = ?2 WHERE id = ?1",
            params![id, role],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound {
                entity: "user",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

const PROJECT_COLS: &str = "id, name, client_id, status, progress, budget, amount_paid, \
                            start_date, commission_enabled, commission_percentage, created_at";

fn map_client(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        client_id: row.get(2)?,
        status: row.get(3)?,
        // Numeric columns coerce to None if the backend ever stored junk in
        // them; the aggregator then treats them as zero.
        progress: row.get(4).unwrap_or(None),
        budget: row.get(5).unwrap_or(None),
        amount_paid: row.get(6).unwrap_or(None),
        start_date: row.get(7)?,
        commission_enabled: row.get::<_, i64>(8).unwrap_or(0) != 0,
        commission_percentage: row.get(9).unwrap_or(None),
        created_at: row.get(10)?,
    })
}

fn map_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        project_id: row.get(2)?,
        status: row.get(3)?,
        due_date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_user_role(row: &Row<'_>) -> rusqlite::Result<UserRole> {
    Ok(UserRole {
        id: row.get(0)?,
        email: row.get(1)?,
        role: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn collect<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, AppError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}


#[cfg(test)]
mod tests {
    use super::test_support::test_db;
    use crate::types::{Client, Project, Task, UserRole};

    fn client(id: &str) -> Client {
        Client {
            id: id.to_string(),
            name: format!("Client {id}"),
            email: Some(format!("{id}@example.com")),
            phone: None,
            status: "Active".to_string(),
            created_at: "2026-08-01T00:00:00+00:00".to_string(),
        }
    }

    fn project(id: &str, client_id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            client_id: client_id.to_string(),
            status: "Active".to_string(),
            progress: Some(10),
            budget: Some(5_000.0),
            amount_paid: Some(1_000.0),
            start_date: None,
            commission_enabled: false,
            commission_percentage: None,
            created_at: "2026-08-02T00:00:00+00:00".to_string(),
        }
    }

    fn task(id: &str, project_id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            project_id: project_id.to_string(),
            status: "To Do".to_string(),
            due_date: None,
            created_at: "2026-08-03T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn client_crud_round_trip() {
        let db = test_db();
        db.insert_client(&client("c1")).unwrap();

        let mut stored = db.get_client("c1").unwrap().expect("client");
        assert_eq!(stored.name, "Client c1");

        stored.phone = Some("+91 98765 43210".to_string());
        db.update_client(&stored).unwrap();
        let updated = db.get_client("c1").unwrap().unwrap();
        assert_eq!(updated.phone.as_deref(), Some("+91 98765 43210"));

        assert!(db.get_client("missing").unwrap().is_none());
    }

    #[test]
    fn client_cascade_deletes_only_its_tree() {
        let db = test_db();
        db.insert_client(&client("c1")).unwrap();
        db.insert_client(&client("c2")).unwrap();
        db.insert_project(&project("p1", "c1")).unwrap();
        db.insert_project(&project("p2", "c1")).unwrap();
        db.insert_project(&project("p3", "c2")).unwrap();
        db.insert_task(&task("t1", "p1")).unwrap();
        db.insert_task(&task("t2", "p2")).unwrap();
        db.insert_task(&task("t3", "p3")).unwrap();

        let (tasks, projects) = db.delete_client_cascade("c1").unwrap();
        assert_eq!(tasks, 2);
        assert_eq!(projects, 2);

        assert!(db.get_client("c1").unwrap().is_none());
        assert!(db.get_project("p1").unwrap().is_none());
        assert!(db.get_task("t1").unwrap().is_none());

        // The other client's tree is untouched.
        assert!(db.get_client("c2").unwrap().is_some());
        assert!(db.get_project("p3").unwrap().is_some());
        assert!(db.get_task("t3").unwrap().is_some());
    }

    #[test]
    fn project_cascade_deletes_tasks() {
        let db = test_db();
        db.insert_client(&client("c1")).unwrap();
        db.insert_project(&project("p1", "c1")).unwrap();
        db.insert_task(&task("t1", "p1")).unwrap();
        db.insert_task(&task("t2", "p1")).unwrap();

        let tasks = db.delete_project_cascade("p1").unwrap();
        assert_eq!(tasks, 2);
        assert!(db.get_project("p1").unwrap().is_none());
        assert!(db.get_tasks_for_project("p1").unwrap().is_empty());
    }

    #[test]
    fn delete_missing_rows_is_not_found() {
        let db = test_db();
        assert!(db.delete_client_cascade("nope").is_err());
        assert!(db.delete_project_cascade("nope").is_err());
        assert!(db.delete_task("nope").is_err());
    }

    #[test]
    fn projects_ordered_newest_first() {
        let db = test_db();
        db.insert_client(&client("c1")).unwrap();
        let mut old = project("p-old", "c1");
        old.created_at = "2026-01-01T00:00:00+00:00".to_string();
        let mut new = project("p-new", "c1");
        new.created_at = "2026-08-01T00:00:00+00:00".to_string();
        db.insert_project(&old).unwrap();
        db.insert_project(&new).unwrap();

        let all = db.get_all_projects().unwrap();
        assert_eq!(all[0].id, "p-new");
        assert_eq!(all[1].id, "p-old");
    }

    #[test]
    fn user_role_lookup_misses_are_none() {
        let db = test_db();
        assert!(db.get_user_role("u1").unwrap().is_none());

        db.insert_user_role(&UserRole {
            id: "u1".to_string(),
            email: "owner@example.com".to_string(),
            role: "admin".to_string(),
            created_at: "2026-08-01T00:00:00+00:00".to_string(),
        })
        .unwrap();

        let user = db.get_user_role("u1").unwrap().unwrap();
        assert_eq!(user.role, "admin");

        db.set_user_role("u1", "sales_team").unwrap();
        assert_eq!(db.get_user_role("u1").unwrap().unwrap().role, "sales_team");
    }

    #[test]
    fn commission_fields_round_trip() {
        let db = test_db();
        db.insert_client(&client("c1")).unwrap();
        let mut p = project("p1", "c1");
        p.commission_enabled = true;
        p.commission_percentage = Some(12.5);
        db.insert_project(&p).unwrap();

        let stored = db.get_project("p1").unwrap().unwrap();
        assert!(stored.commission_enabled);
        assert_eq!(stored.commission_percentage, Some(12.5));
    }
}
