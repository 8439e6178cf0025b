use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_trait::async_trait;
use thiserror::Error;

use super::models::{
    Employee, EmployeePatch, NewEmployee, NewNotification, NewProject, NewTask, NewTeam, NewTicket, Notification,
    Project, ProjectMember, Task, Team, Ticket,
};
use crate::types::Status;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn not_found(kind: &str, id: i32) -> Self {
        StoreError::NotFound(format!("{} {} does not exist", kind, id))
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::Conflict(_) => "CONFLICT",
            StoreError::Invalid(_) => "BAD_USER_INPUT",
            StoreError::Database(_) | StoreError::Migration(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for StoreError {
    fn extend(&self) -> async_graphql::Error {
        let message = match self {
            StoreError::Database(e) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", e);
                "Database error occurred".to_string()
            }
            StoreError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                "Service is being updated, please try again later".to_string()
            }
            other => other.to_string(),
        };

        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", self.code()))
    }
}

/// Persistence operations behind the schema.
///
/// Every read ignores soft-deleted employees. Ids are assigned by the store.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
    async fn get_employee(&self, id: i32) -> Result<Option<Employee>, StoreError>;
    async fn find_employee_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError>;
    /// Fails with `Conflict` when a live employee already uses the email
    async fn create_employee(&self, input: NewEmployee) -> Result<Employee, StoreError>;
    async fn update_employee(&self, id: i32, patch: EmployeePatch) -> Result<Employee, StoreError>;
    /// Soft delete. Returns false when no live employee has this id.
    async fn delete_employee(&self, id: i32) -> Result<bool, StoreError>;

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError>;
    async fn get_team(&self, id: i32) -> Result<Option<Team>, StoreError>;
    async fn create_team(&self, input: NewTeam) -> Result<Team, StoreError>;
    /// Idempotent
    async fn add_team_engineer(&self, team_id: i32, engineer_id: i32) -> Result<(), StoreError>;
    async fn team_engineers(&self, team_id: i32) -> Result<Vec<Employee>, StoreError>;

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    async fn get_project(&self, id: i32) -> Result<Option<Project>, StoreError>;
    async fn create_project(&self, input: NewProject) -> Result<Project, StoreError>;
    async fn update_project_status(&self, id: i32, status: Status) -> Result<Project, StoreError>;
    /// Idempotent
    async fn assign_team_to_project(&self, project_id: i32, team_id: i32) -> Result<(), StoreError>;
    async fn project_teams(&self, project_id: i32) -> Result<Vec<Team>, StoreError>;
    /// Adding an existing member replaces the member's project role
    async fn add_project_member(&self, project_id: i32, employee_id: i32, role: &str)
        -> Result<ProjectMember, StoreError>;
    /// Members whose employee is still live
    async fn project_members(&self, project_id: i32) -> Result<Vec<ProjectMember>, StoreError>;

    async fn list_tickets(&self, project_id: Option<i32>) -> Result<Vec<Ticket>, StoreError>;
    async fn get_ticket(&self, id: i32) -> Result<Option<Ticket>, StoreError>;
    async fn create_ticket(&self, input: NewTicket) -> Result<Ticket, StoreError>;
    async fn update_ticket_status(&self, id: i32, status: Status) -> Result<Ticket, StoreError>;

    async fn list_tasks(&self, assigned_to_id: Option<i32>) -> Result<Vec<Task>, StoreError>;
    async fn create_task(&self, input: NewTask) -> Result<Task, StoreError>;
    async fn update_task_status(&self, id: i32, status: Status) -> Result<Task, StoreError>;

    async fn list_notifications(&self, employee_id: i32, unread_only: bool) -> Result<Vec<Notification>, StoreError>;
    async fn create_notification(&self, input: NewNotification) -> Result<Notification, StoreError>;
    async fn mark_notification_read(&self, id: i32) -> Result<Notification, StoreError>;
}

pub type SharedStore = Arc<dyn Store>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = StoreError::not_found("project", 7).extend();
        assert_eq!(err.message, "Not found: project 7 does not exist");
    }

    #[test]
    fn database_errors_are_masked() {
        let err = StoreError::Database(sqlx::Error::PoolTimedOut).extend();
        assert_eq!(err.message, "Database error occurred");
        assert_eq!(StoreError::Database(sqlx::Error::PoolTimedOut).code(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn codes_follow_error_kind() {
        assert_eq!(StoreError::Conflict("x".into()).code(), "CONFLICT");
        assert_eq!(StoreError::Invalid("x".into()).code(), "BAD_USER_INPUT");
    }
}
