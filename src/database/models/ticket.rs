use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::require_text;
use crate::database::store::StoreError;
use crate::types::{Priority, Status};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct Ticket {
    pub id: i32,
    pub project_id: i32,
    pub assigned_to_id: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: Status,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, InputObject)]
pub struct NewTicket {
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: Option<i32>,
    #[graphql(default)]
    pub priority: Priority,
}

impl NewTicket {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_text("title", &self.title)
    }
}
