use async_graphql::{InputObject, MaybeUndefined, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::require_text;
use crate::database::store::StoreError;
use crate::types::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub active: bool,
    pub project_assigned_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, InputObject)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub project_assigned_id: Option<i32>,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_text("name", &self.name)?;
        validate_email(&self.email)
    }
}

/// Fields left out keep their stored value. `projectAssignedId: null`
/// clears the assignment.
#[derive(Debug, Clone, Default, InputObject)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub project_assigned_id: MaybeUndefined<i32>,
}

impl EmployeePatch {
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    pub fn apply(self, employee: &mut Employee) {
        if let Some(name) = self.name {
            employee.name = name;
        }
        if let Some(email) = self.email {
            employee.email = email;
        }
        if let Some(role) = self.role {
            employee.role = role;
        }
        if let Some(active) = self.active {
            employee.active = active;
        }
        match self.project_assigned_id {
            MaybeUndefined::Value(project_id) => employee.project_assigned_id = Some(project_id),
            MaybeUndefined::Null => employee.project_assigned_id = None,
            MaybeUndefined::Undefined => {}
        }
        employee.updated_at = Utc::now();
    }
}

fn validate_email(email: &str) -> Result<(), StoreError> {
    require_text("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(StoreError::Invalid(format!("'{}' is not an email address", email))),
    }
}
