use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::require_text;
use crate::database::store::StoreError;
use crate::types::{Priority, Status};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: Option<i32>,
    pub project_id: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    #[sqlx(try_from = "String")]
    pub status: Status,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, InputObject)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: Option<i32>,
    pub project_id: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    #[graphql(default)]
    pub priority: Priority,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_text("title", &self.title)
    }
}
