use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::models::{
    Employee, EmployeePatch, NewEmployee, NewNotification, NewProject, NewTask, NewTeam, NewTicket, Notification,
    Project, ProjectMember, Task, Team, Ticket,
};
use super::store::{Store, StoreError};
use crate::types::Status;

const EMPLOYEE_COLUMNS: &str = "id, name, email, role, active, project_assigned_id, created_at, updated_at";
const TEAM_COLUMNS: &str = "id, team_leader_id, name, description, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, manager_id, name, status, description, start_date, created_at, updated_at";
const TICKET_COLUMNS: &str =
    "id, project_id, assigned_to_id, status, title, description, priority, created_at, completed_at";
const TASK_COLUMNS: &str =
    "id, title, description, assigned_to_id, project_id, due_date, status, priority, created_at, completed_at";
const MEMBER_COLUMNS: &str = "project_id, employee_id, role, created_at";
const NOTIFICATION_COLUMNS: &str = "id, message, employee_id, kind, created_at, read";

/// Store backed by the PostgreSQL schema in `migrations/`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate a unique-constraint violation into a client-facing conflict
fn conflict_on_unique(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what()),
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees WHERE deleted_at IS NULL ORDER BY id", EMPLOYEE_COLUMNS);
        Ok(sqlx::query_as::<_, Employee>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_employee(&self, id: i32) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees WHERE id = $1 AND deleted_at IS NULL", EMPLOYEE_COLUMNS);
        Ok(sqlx::query_as::<_, Employee>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_employee_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees WHERE email = $1 AND deleted_at IS NULL", EMPLOYEE_COLUMNS);
        Ok(sqlx::query_as::<_, Employee>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn create_employee(&self, input: NewEmployee) -> Result<Employee, StoreError> {
        let sql = format!(
            "INSERT INTO employees (name, email, role, project_assigned_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            EMPLOYEE_COLUMNS
        );
        sqlx::query_as::<_, Employee>(&sql)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role.as_str())
            .bind(input.project_assigned_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, || format!("email '{}' is already in use", input.email)))
    }

    async fn update_employee(&self, id: i32, patch: EmployeePatch) -> Result<Employee, StoreError> {
        // Read-modify-write inside one transaction so the patch applies to a consistent row
        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT {} FROM employees WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
            EMPLOYEE_COLUMNS
        );
        let mut employee = sqlx::query_as::<_, Employee>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("employee", id))?;

        patch.apply(&mut employee);

        let update = format!(
            "UPDATE employees SET name = $2, email = $3, role = $4, active = $5, project_assigned_id = $6, \
             updated_at = $7 WHERE id = $1 RETURNING {}",
            EMPLOYEE_COLUMNS
        );
        let updated = sqlx::query_as::<_, Employee>(&update)
            .bind(id)
            .bind(&employee.name)
            .bind(&employee.email)
            .bind(employee.role.as_str())
            .bind(employee.active)
            .bind(employee.project_assigned_id)
            .bind(employee.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, || format!("email '{}' is already in use", employee.email)))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_employee(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE employees SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let sql = format!("SELECT {} FROM teams WHERE deleted_at IS NULL ORDER BY id", TEAM_COLUMNS);
        Ok(sqlx::query_as::<_, Team>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_team(&self, id: i32) -> Result<Option<Team>, StoreError> {
        let sql = format!("SELECT {} FROM teams WHERE id = $1 AND deleted_at IS NULL", TEAM_COLUMNS);
        Ok(sqlx::query_as::<_, Team>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_team(&self, input: NewTeam) -> Result<Team, StoreError> {
        let sql = format!(
            "INSERT INTO teams (name, description, team_leader_id) VALUES ($1, $2, $3) RETURNING {}",
            TEAM_COLUMNS
        );
        Ok(sqlx::query_as::<_, Team>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.team_leader_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn add_team_engineer(&self, team_id: i32, engineer_id: i32) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO team_engineers (team_id, engineer_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(team_id)
            .bind(engineer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn team_engineers(&self, team_id: i32) -> Result<Vec<Employee>, StoreError> {
        let sql = format!(
            "SELECT {} FROM employees e JOIN team_engineers te ON te.engineer_id = e.id \
             WHERE te.team_id = $1 AND e.deleted_at IS NULL ORDER BY e.id",
            prefixed("e", EMPLOYEE_COLUMNS)
        );
        Ok(sqlx::query_as::<_, Employee>(&sql).bind(team_id).fetch_all(&self.pool).await?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE deleted_at IS NULL ORDER BY id", PROJECT_COLUMNS);
        Ok(sqlx::query_as::<_, Project>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_project(&self, id: i32) -> Result<Option<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1 AND deleted_at IS NULL", PROJECT_COLUMNS);
        Ok(sqlx::query_as::<_, Project>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_project(&self, input: NewProject) -> Result<Project, StoreError> {
        let sql = format!(
            "INSERT INTO projects (name, description, manager_id, status, start_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.manager_id)
            .bind(input.status.as_str())
            .bind(input.start_date.unwrap_or_else(Utc::now))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_project_status(&self, id: i32, status: Status) -> Result<Project, StoreError> {
        let sql = format!(
            "UPDATE projects SET status = $2, updated_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("project", id))
    }

    async fn assign_team_to_project(&self, project_id: i32, team_id: i32) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO project_teams (project_id, team_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(project_id)
            .bind(team_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn project_teams(&self, project_id: i32) -> Result<Vec<Team>, StoreError> {
        let sql = format!(
            "SELECT {} FROM teams t JOIN project_teams pt ON pt.team_id = t.id \
             WHERE pt.project_id = $1 AND t.deleted_at IS NULL ORDER BY t.id",
            prefixed("t", TEAM_COLUMNS)
        );
        Ok(sqlx::query_as::<_, Team>(&sql).bind(project_id).fetch_all(&self.pool).await?)
    }

    async fn add_project_member(
        &self,
        project_id: i32,
        employee_id: i32,
        role: &str,
    ) -> Result<ProjectMember, StoreError> {
        let sql = format!(
            "INSERT INTO project_employees (project_id, employee_id, role) VALUES ($1, $2, $3) \
             ON CONFLICT (project_id, employee_id) DO UPDATE SET role = EXCLUDED.role RETURNING {}",
            MEMBER_COLUMNS
        );
        Ok(sqlx::query_as::<_, ProjectMember>(&sql)
            .bind(project_id)
            .bind(employee_id)
            .bind(role)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn project_members(&self, project_id: i32) -> Result<Vec<ProjectMember>, StoreError> {
        let sql = format!(
            "SELECT {} FROM project_employees pe JOIN employees e ON e.id = pe.employee_id \
             WHERE pe.project_id = $1 AND e.deleted_at IS NULL ORDER BY pe.employee_id",
            prefixed("pe", MEMBER_COLUMNS)
        );
        Ok(sqlx::query_as::<_, ProjectMember>(&sql).bind(project_id).fetch_all(&self.pool).await?)
    }

    async fn list_tickets(&self, project_id: Option<i32>) -> Result<Vec<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE deleted_at IS NULL AND ($1::int IS NULL OR project_id = $1) ORDER BY id",
            TICKET_COLUMNS
        );
        Ok(sqlx::query_as::<_, Ticket>(&sql).bind(project_id).fetch_all(&self.pool).await?)
    }

    async fn get_ticket(&self, id: i32) -> Result<Option<Ticket>, StoreError> {
        let sql = format!("SELECT {} FROM tickets WHERE id = $1 AND deleted_at IS NULL", TICKET_COLUMNS);
        Ok(sqlx::query_as::<_, Ticket>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_ticket(&self, input: NewTicket) -> Result<Ticket, StoreError> {
        let sql = format!(
            "INSERT INTO tickets (project_id, title, description, assigned_to_id, priority, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TICKET_COLUMNS
        );
        Ok(sqlx::query_as::<_, Ticket>(&sql)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.assigned_to_id)
            .bind(input.priority.as_str())
            .bind(Status::NotStarted.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_ticket_status(&self, id: i32, status: Status) -> Result<Ticket, StoreError> {
        let sql = format!(
            "UPDATE tickets SET status = $2, \
             completed_at = CASE WHEN $2::text = 'COMPLETED' THEN now() ELSE NULL END \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TICKET_COLUMNS
        );
        sqlx::query_as::<_, Ticket>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("ticket", id))
    }

    async fn list_tasks(&self, assigned_to_id: Option<i32>) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE deleted_at IS NULL AND ($1::int IS NULL OR assigned_to_id = $1) ORDER BY id",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql).bind(assigned_to_id).fetch_all(&self.pool).await?)
    }

    async fn create_task(&self, input: NewTask) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, assigned_to_id, project_id, due_date, priority, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.assigned_to_id)
            .bind(input.project_id)
            .bind(input.due_date)
            .bind(input.priority.as_str())
            .bind(Status::NotStarted.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_task_status(&self, id: i32, status: Status) -> Result<Task, StoreError> {
        let sql = format!(
            "UPDATE tasks SET status = $2, \
             completed_at = CASE WHEN $2::text = 'COMPLETED' THEN now() ELSE NULL END \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("task", id))
    }

    async fn list_notifications(&self, employee_id: i32, unread_only: bool) -> Result<Vec<Notification>, StoreError> {
        let sql = format!(
            "SELECT {} FROM notifications WHERE employee_id = $1 AND deleted_at IS NULL \
             AND (NOT $2 OR read = false) ORDER BY id",
            NOTIFICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .bind(employee_id)
            .bind(unread_only)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_notification(&self, input: NewNotification) -> Result<Notification, StoreError> {
        let sql = format!(
            "INSERT INTO notifications (employee_id, message, kind) VALUES ($1, $2, $3) RETURNING {}",
            NOTIFICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .bind(input.employee_id)
            .bind(&input.message)
            .bind(input.kind.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn mark_notification_read(&self, id: i32) -> Result<Notification, StoreError> {
        let sql = format!(
            "UPDATE notifications SET read = true WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            NOTIFICATION_COLUMNS
        );
        sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("notification", id))
    }
}

/// Qualify every column in a comma-separated list with a table alias
fn prefixed(alias: &str, columns: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_each_column() {
        assert_eq!(prefixed("e", "id, name,email"), "e.id, e.name, e.email");
    }

    #[test]
    fn column_lists_match_model_fields() {
        assert_eq!(EMPLOYEE_COLUMNS.split(',').count(), 8);
        assert_eq!(TICKET_COLUMNS.split(',').count(), 9);
        assert_eq!(TASK_COLUMNS.split(',').count(), 10);
    }
}
