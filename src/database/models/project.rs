use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::require_text;
use crate::database::store::StoreError;
use crate::types::Status;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct Project {
    pub id: i32,
    pub manager_id: Option<i32>,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub status: Status,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, InputObject)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<i32>,
    #[graphql(default)]
    pub status: Status,
    /// Defaults to the time of creation
    pub start_date: Option<DateTime<Utc>>,
}

impl NewProject {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_text("name", &self.name)
    }
}
