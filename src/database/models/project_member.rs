use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::require_text;
use crate::database::store::StoreError;

pub const DEFAULT_MEMBER_ROLE: &str = "MEMBER";

/// An employee's membership in a project. `role` is a free-form project
/// role such as `MEMBER` or `REVIEWER`, unrelated to the access role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct ProjectMember {
    pub project_id: i32,
    pub employee_id: i32,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Project roles are stored as given, at most 50 characters
pub fn validate_member_role(role: &str) -> Result<(), StoreError> {
    require_text("role", role)?;
    if role.chars().count() > 50 {
        return Err(StoreError::Invalid("role must be at most 50 characters".to_string()));
    }
    Ok(())
}
