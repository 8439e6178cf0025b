use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::require_text;
use crate::database::store::StoreError;
use crate::types::NotificationKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct Notification {
    pub id: i32,
    pub message: String,
    pub employee_id: i32,
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, InputObject)]
pub struct NewNotification {
    pub employee_id: i32,
    pub message: String,
    #[graphql(default)]
    pub kind: NotificationKind,
}

impl NewNotification {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_text("message", &self.message)
    }
}
