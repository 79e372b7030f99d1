//! The operation surface: role-gated CRUD and report entry points.
//!
//! Every function takes the caller's role (or user id) explicitly; there
//! is no ambient session state. Mutations consult the permission engine
//! before touching the store; reads that expose money pass the role down
//! into the report builders. Validation mirrors what the product always
//! enforced: a client needs a name, a project needs a name and a client,
//! a task needs a title and a project.

use chrono::Utc;
use uuid::Uuid;

use crate::db::StudioDb;
use crate::error::AppError;
use crate::permissions::{can_access_admin, can_delete, can_edit, can_see_money, Role};
use crate::reports::{
    commission_report, dashboard_summary, project_detail, project_overview, CommissionFilter,
    CommissionReport, DashboardSummary, ProjectDetail, ProjectRow,
};
use crate::types::{
    Client, ClientInput, Project, ProjectInput, Task, TaskInput, UserRole, DEFAULT_CLIENT_STATUS,
};

/// Resolve the caller's role by user id, fresh from the store.
///
/// Called on every command invocation, never cached, so a role change
/// takes effect immediately. A missing row or an unrecognized role string
/// both resolve to `None` (no capabilities), not an error.
pub fn fetch_role(db: &StudioDb, user_id: &str) -> Result<Option<Role>, AppError> {
    let Some(user) = db.get_user_role(user_id)? else {
        return Ok(None);
    };
    let parsed = Role::parse(&user.role);
    if parsed.is_none() {
        log::warn!("Unknown role '{}' on user {}; treating as no role", user.role, user_id);
    }
    Ok(parsed)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

// =============================================================================
// Clients
// =============================================================================

pub fn create_client(
    db: &StudioDb,
    role: Option<Role>,
    input: ClientInput,
) -> Result<Client, AppError> {
    if !can_edit(role) {
        return Err(AppError::permission("create clients"));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::required("name"));
    }

    let client = Client {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        email: input.email,
        phone: input.phone,
        status: input
            .status
            .unwrap_or_else(|| DEFAULT_CLIENT_STATUS.to_string()),
        created_at: now_rfc3339(),
    };
    db.insert_client(&client)?;
    log::info!("Created client {} ({})", client.name, client.id);
    Ok(client)
}

pub fn update_client(
    db: &StudioDb,
    role: Option<Role>,
    id: &str,
    input: ClientInput,
) -> Result<Client, AppError> {
    if !can_edit(role) {
        return Err(AppError::permission("edit clients"));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::required("name"));
    }

    let mut client = db.get_client(id)?.ok_or(AppError::NotFound {
        entity: "client",
        id: id.to_string(),
    })?;
    client.name = input.name;
    client.email = input.email;
    client.phone = input.phone;
    if let Some(status) = input.status {
        client.status = status;
    }
    db.update_client(&client)?;
    Ok(client)
}

/// Delete a client, its projects, and those projects' tasks.
pub fn delete_client(db: &StudioDb, role: Option<Role>, id: &str) -> Result<(), AppError> {
    if !can_delete(role) {
        return Err(AppError::permission("delete clients"));
    }
    db.delete_client_cascade(id)?;
    Ok(())
}

pub fn list_clients(db: &StudioDb) -> Result<Vec<Client>, AppError> {
    db.get_all_clients()
}

pub fn get_client(db: &StudioDb, id: &str) -> Result<Client, AppError> {
    db.get_client(id)?.ok_or(AppError::NotFound {
        entity: "client",
        id: id.to_string(),
    })
}

// =============================================================================
// Projects
// =============================================================================

pub fn create_project(
    db: &StudioDb,
    role: Option<Role>,
    input: ProjectInput,
) -> Result<Project, AppError> {
    if !can_edit(role) {
        return Err(AppError::permission("create projects"));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::required("name"));
    }
    if input.client_id.trim().is_empty() {
        return Err(AppError::required("client"));
    }
    if db.get_client(&input.client_id)?.is_none() {
        return Err(AppError::NotFound {
            entity: "client",
            id: input.client_id,
        });
    }

    let project = Project {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        client_id: input.client_id,
        status: input.status.unwrap_or_else(|| "Active".to_string()),
        progress: input.progress,
        budget: input.budget,
        amount_paid: input.amount_paid,
        start_date: input.start_date,
        commission_enabled: input.commission_enabled,
        commission_percentage: input.commission_percentage,
        created_at: now_rfc3339(),
    };
    db.insert_project(&project)?;
    log::info!("Created project {} ({})", project.name, project.id);
    Ok(project)
}

pub fn update_project(
    db: &StudioDb,
    role: Option<Role>,
    id: &str,
    input: ProjectInput,
) -> Result<Project, AppError> {
    if !can_edit(role) {
        return Err(AppError::permission("edit projects"));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::required("name"));
    }
    if input.client_id.trim().is_empty() {
        return Err(AppError::required("client"));
    }

    let mut project = db.get_project(id)?.ok_or(AppError::NotFound {
        entity: "project",
        id: id.to_string(),
    })?;
    project.name = input.name;
    project.client_id = input.client_id;
    if let Some(status) = input.status {
        project.status = status;
    }
    project.progress = input.progress;
    project.budget = input.budget;
    project.amount_paid = input.amount_paid;
    project.start_date = input.start_date;
    project.commission_enabled = input.commission_enabled;
    project.commission_percentage = input.commission_percentage;
    db.update_project(&project)?;
    Ok(project)
}

/// Delete a project and its tasks.
pub fn delete_project(db: &StudioDb, role: Option<Role>, id: &str) -> Result<(), AppError> {
    if !can_delete(role) {
        return Err(AppError::permission("delete projects"));
    }
    db.delete_project_cascade(id)?;
    Ok(())
}

pub fn list_projects(db: &StudioDb) -> Result<Vec<Project>, AppError> {
    db.get_all_projects()
}

pub fn list_projects_for_client(
    db: &StudioDb,
    client_id: &str,
) -> Result<Vec<Project>, AppError> {
    db.get_projects_for_client(client_id)
}

// =============================================================================
// Tasks
// =============================================================================

pub fn create_task(
    db: &StudioDb,
    role: Option<Role>,
    input: TaskInput,
) -> Result<Task, AppError> {
    if !can_edit(role) {
        return Err(AppError::permission("create tasks"));
    }
    if input.title.trim().is_empty() {
        return Err(AppError::required("title"));
    }
    if input.project_id.trim().is_empty() {
        return Err(AppError::required("project"));
    }
    if db.get_project(&input.project_id)?.is_none() {
        return Err(AppError::NotFound {
            entity: "project",
            id: input.project_id,
        });
    }

    let task = Task {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        project_id: input.project_id,
        status: input.status.unwrap_or_else(|| "To Do".to_string()),
        due_date: input.due_date,
        created_at: now_rfc3339(),
    };
    db.insert_task(&task)?;
    Ok(task)
}

pub fn update_task(
    db: &StudioDb,
    role: Option<Role>,
    id: &str,
    input: TaskInput,
) -> Result<Task, AppError> {
    if !can_edit(role) {
        return Err(AppError::permission("edit tasks"));
    }
    if input.title.trim().is_empty() {
        return Err(AppError::required("title"));
    }

    let mut task = db.get_task(id)?.ok_or(AppError::NotFound {
        entity: "task",
        id: id.to_string(),
    })?;
    task.title = input.title;
    if !input.project_id.trim().is_empty() {
        task.project_id = input.project_id;
    }
    if let Some(status) = input.status {
        task.status = status;
    }
    task.due_date = input.due_date;
    db.update_task(&task)?;
    Ok(task)
}

pub fn delete_task(db: &StudioDb, role: Option<Role>, id: &str) -> Result<(), AppError> {
    if !can_delete(role) {
        return Err(AppError::permission("delete tasks"));
    }
    db.delete_task(id)
}

pub fn list_tasks_for_project(
    db: &StudioDb,
    project_id: &str,
) -> Result<Vec<Task>, AppError> {
    db.get_tasks_for_project(project_id)
}

// =============================================================================
// Reports
// =============================================================================

/// Build the dashboard. `now` is captured once here and anchors the whole
/// monthly window set.
pub fn dashboard(db: &StudioDb, role: Option<Role>) -> Result<DashboardSummary, AppError> {
    dashboard_at(db, role, Utc::now())
}

/// Same as [`dashboard`] with an explicit anchor, for deterministic tests.
pub fn dashboard_at(
    db: &StudioDb,
    role: Option<Role>,
    now: chrono::DateTime<Utc>,
) -> Result<DashboardSummary, AppError> {
    let clients = db.get_all_clients()?;
    let projects = db.get_all_projects()?;
    Ok(dashboard_summary(&clients, &projects, role, now))
}

pub fn projects_overview(
    db: &StudioDb,
    role: Option<Role>,
) -> Result<Vec<ProjectRow>, AppError> {
    let clients = db.get_all_clients()?;
    let projects = db.get_all_projects()?;
    Ok(project_overview(&projects, &clients, role))
}

/// Detail view for one project: row, tasks, task-status buckets. A project
/// whose client row is gone still renders, with the owner shown as the
/// placeholder.
pub fn get_project_detail(
    db: &StudioDb,
    role: Option<Role>,
    id: &str,
) -> Result<ProjectDetail, AppError> {
    let project = db.get_project(id)?.ok_or(AppError::NotFound {
        entity: "project",
        id: id.to_string(),
    })?;
    let client = db.get_client(&project.client_id)?;
    let tasks = db.get_tasks_for_project(id)?;
    Ok(project_detail(&project, client.as_ref(), &tasks, role))
}

/// The sales-commission report. The whole report is financial, so it is
/// gated on money visibility, not just its columns.
pub fn commission(
    db: &StudioDb,
    role: Option<Role>,
    filter: CommissionFilter,
) -> Result<CommissionReport, AppError> {
    if !can_see_money(role) {
        return Err(AppError::permission("view commission reports"));
    }
    let clients = db.get_all_clients()?;
    let projects = db.get_all_projects()?;
    Ok(commission_report(&projects, &clients, filter))
}

// =============================================================================
// User administration
// =============================================================================

pub fn list_users(db: &StudioDb, role: Option<Role>) -> Result<Vec<UserRole>, AppError> {
    if !can_access_admin(role) {
        return Err(AppError::permission("manage users"));
    }
    db.get_all_user_roles()
}

/// Create a user account with an assigned role. Legacy roles cannot be
/// newly assigned.
pub fn create_user(
    db: &StudioDb,
    role: Option<Role>,
    email: &str,
    new_role: Role,
) -> Result<UserRole, AppError> {
    if !can_access_admin(role) {
        return Err(AppError::permission("create users"));
    }
    if email.trim().is_empty() {
        return Err(AppError::required("email"));
    }
    if new_role.is_legacy() {
        return Err(AppError::Validation(format!(
            "role '{}' is legacy and cannot be assigned",
            new_role.as_str()
        )));
    }

    let user = UserRole {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        role: new_role.as_str().to_string(),
        created_at: now_rfc3339(),
    };
    db.insert_user_role(&user)?;
    log::info!("Created user {} with role {}", user.email, user.role);
    Ok(user)
}

pub fn set_user_role(
    db: &StudioDb,
    role: Option<Role>,
    user_id: &str,
    new_role: Role,
) -> Result<(), AppError> {
    if !can_access_admin(role) {
        return Err(AppError::permission("assign roles"));
    }
    if new_role.is_legacy() {
        return Err(AppError::Validation(format!(
            "role '{}' is legacy and cannot be assigned",
            new_role.as_str()
        )));
    }
    db.set_user_role(user_id, new_role.as_str())
}
