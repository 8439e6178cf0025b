use async_graphql::{Context, Object, Result};

use super::{admit, extend, store};
use crate::auth::Principal;
use crate::database::models::{Employee, Notification, Project, Task, Team, Ticket};
use crate::middleware::RequestScope;
use crate::types::Role;

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The caller as resolved by the identity middleware
    async fn me(&self, ctx: &Context<'_>) -> Option<Principal> {
        ctx.data_opt::<RequestScope>()
            .and_then(RequestScope::principal)
            .cloned()
    }

    async fn employees(&self, ctx: &Context<'_>) -> Result<Vec<Employee>> {
        store(ctx)?.list_employees().await.map_err(extend)
    }

    async fn employee(&self, ctx: &Context<'_>, id: i32) -> Result<Option<Employee>> {
        store(ctx)?.get_employee(id).await.map_err(extend)
    }

    /// Lookup by email is restricted to administrators
    async fn employee_by_email(&self, ctx: &Context<'_>, email: String) -> Result<Option<Employee>> {
        if !admit(ctx, Role::Admin).await {
            return Ok(None);
        }
        store(ctx)?.find_employee_by_email(&email).await.map_err(extend)
    }

    async fn teams(&self, ctx: &Context<'_>) -> Result<Vec<Team>> {
        store(ctx)?.list_teams().await.map_err(extend)
    }

    async fn team(&self, ctx: &Context<'_>, id: i32) -> Result<Option<Team>> {
        store(ctx)?.get_team(id).await.map_err(extend)
    }

    async fn projects(&self, ctx: &Context<'_>) -> Result<Vec<Project>> {
        store(ctx)?.list_projects().await.map_err(extend)
    }

    async fn project(&self, ctx: &Context<'_>, id: i32) -> Result<Option<Project>> {
        store(ctx)?.get_project(id).await.map_err(extend)
    }

    async fn tickets(&self, ctx: &Context<'_>, project_id: Option<i32>) -> Result<Vec<Ticket>> {
        store(ctx)?.list_tickets(project_id).await.map_err(extend)
    }

    async fn tasks(&self, ctx: &Context<'_>, assigned_to_id: Option<i32>) -> Result<Vec<Task>> {
        store(ctx)?.list_tasks(assigned_to_id).await.map_err(extend)
    }

    async fn notifications(
        &self,
        ctx: &Context<'_>,
        employee_id: i32,
        #[graphql(default)] unread_only: bool,
    ) -> Result<Vec<Notification>> {
        store(ctx)?
            .list_notifications(employee_id, unread_only)
            .await
            .map_err(extend)
    }
}
