pub mod employee;
pub mod notification;
pub mod project;
pub mod project_member;
pub mod task;
pub mod team;
pub mod ticket;

pub use employee::{Employee, EmployeePatch, NewEmployee};
pub use notification::{NewNotification, Notification};
pub use project::{NewProject, Project};
pub use project_member::{validate_member_role, ProjectMember, DEFAULT_MEMBER_ROLE};
pub use task::{NewTask, Task};
pub use team::{NewTeam, Team};
pub use ticket::{NewTicket, Ticket};

use chrono::{DateTime, Utc};

use crate::database::store::StoreError;
use crate::types::Status;

/// Reject empty or whitespace-only text for a required field
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Invalid(format!("{} must not be blank", field)));
    }
    Ok(())
}

/// `completed_at` follows the status: stamped on COMPLETED, cleared otherwise
pub fn completion_time(status: Status, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (status == Status::Completed).then_some(now)
}
