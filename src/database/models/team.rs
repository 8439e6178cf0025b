use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::require_text;
use crate::database::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct Team {
    pub id: i32,
    pub team_leader_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, InputObject)]
pub struct NewTeam {
    pub name: String,
    pub description: Option<String>,
    pub team_leader_id: Option<i32>,
}

impl NewTeam {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_text("name", &self.name)
    }
}
