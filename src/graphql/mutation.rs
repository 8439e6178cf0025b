use async_graphql::{Context, MaybeUndefined, Object, Result};

use super::{admit, extend, store};
use crate::database::models::{
    validate_member_role, Employee, EmployeePatch, NewEmployee, NewNotification, NewProject, NewTask, NewTeam, NewTicket,
    Notification, Project, Task, Team, Ticket, DEFAULT_MEMBER_ROLE,
};
use crate::database::{SharedStore, StoreError};
use crate::types::{Role, Status};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_employee(&self, ctx: &Context<'_>, input: NewEmployee) -> Result<Option<Employee>> {
        if !admit(ctx, Role::Admin).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        input.validate().map_err(extend)?;
        if let Some(project_id) = input.project_assigned_id {
            require_project(store, project_id).await?;
        }
        store.create_employee(input).await.map_err(extend).map(Some)
    }

    async fn update_employee(&self, ctx: &Context<'_>, id: i32, input: EmployeePatch) -> Result<Option<Employee>> {
        if !admit(ctx, Role::Admin).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        input.validate().map_err(extend)?;
        if let MaybeUndefined::Value(project_id) = input.project_assigned_id {
            require_project(store, project_id).await?;
        }
        store.update_employee(id, input).await.map_err(extend).map(Some)
    }

    /// Soft delete. False when no live employee has this id.
    async fn delete_employee(&self, ctx: &Context<'_>, id: i32) -> Result<Option<bool>> {
        if !admit(ctx, Role::Admin).await {
            return Ok(None);
        }
        store(ctx)?.delete_employee(id).await.map_err(extend).map(Some)
    }

    async fn create_team(&self, ctx: &Context<'_>, input: NewTeam) -> Result<Option<Team>> {
        if !admit(ctx, Role::Manager).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        input.validate().map_err(extend)?;
        if let Some(leader_id) = input.team_leader_id {
            require_employee(store, leader_id).await?;
        }
        store.create_team(input).await.map_err(extend).map(Some)
    }

    async fn add_engineer_to_team(&self, ctx: &Context<'_>, team_id: i32, engineer_id: i32) -> Result<Option<Team>> {
        if !admit(ctx, Role::Manager).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        let team = require_team(store, team_id).await?;
        require_employee(store, engineer_id).await?;
        store.add_team_engineer(team_id, engineer_id).await.map_err(extend)?;
        Ok(Some(team))
    }

    async fn create_project(&self, ctx: &Context<'_>, input: NewProject) -> Result<Option<Project>> {
        if !admit(ctx, Role::Manager).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        input.validate().map_err(extend)?;
        if let Some(manager_id) = input.manager_id {
            require_employee(store, manager_id).await?;
        }
        store.create_project(input).await.map_err(extend).map(Some)
    }

    async fn update_project_status(&self, ctx: &Context<'_>, id: i32, status: Status) -> Result<Option<Project>> {
        if !admit(ctx, Role::Manager).await {
            return Ok(None);
        }
        store(ctx)?.update_project_status(id, status).await.map_err(extend).map(Some)
    }

    async fn assign_team_to_project(&self, ctx: &Context<'_>, project_id: i32, team_id: i32) -> Result<Option<Project>> {
        if !admit(ctx, Role::Manager).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        let project = require_project(store, project_id).await?;
        require_team(store, team_id).await?;
        store.assign_team_to_project(project_id, team_id).await.map_err(extend)?;
        Ok(Some(project))
    }

    /// Adding an existing member again replaces their project role
    async fn add_employee_to_project(
        &self,
        ctx: &Context<'_>,
        project_id: i32,
        employee_id: i32,
        #[graphql(default_with = "DEFAULT_MEMBER_ROLE.to_string()")] role: String,
    ) -> Result<Option<Project>> {
        if !admit(ctx, Role::Manager).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        validate_member_role(&role).map_err(extend)?;
        let project = require_project(store, project_id).await?;
        require_employee(store, employee_id).await?;
        store.add_project_member(project_id, employee_id, &role).await.map_err(extend)?;
        Ok(Some(project))
    }

    async fn create_ticket(&self, ctx: &Context<'_>, input: NewTicket) -> Result<Option<Ticket>> {
        if !admit(ctx, Role::TeamLead).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        input.validate().map_err(extend)?;
        require_project(store, input.project_id).await?;
        if let Some(assignee) = input.assigned_to_id {
            require_employee(store, assignee).await?;
        }
        store.create_ticket(input).await.map_err(extend).map(Some)
    }

    async fn update_ticket_status(&self, ctx: &Context<'_>, id: i32, status: Status) -> Result<Option<Ticket>> {
        if !admit(ctx, Role::TeamLead).await {
            return Ok(None);
        }
        store(ctx)?.update_ticket_status(id, status).await.map_err(extend).map(Some)
    }

    async fn create_task(&self, ctx: &Context<'_>, input: NewTask) -> Result<Option<Task>> {
        if !admit(ctx, Role::TeamLead).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        input.validate().map_err(extend)?;
        if let Some(assignee) = input.assigned_to_id {
            require_employee(store, assignee).await?;
        }
        if let Some(project_id) = input.project_id {
            require_project(store, project_id).await?;
        }
        store.create_task(input).await.map_err(extend).map(Some)
    }

    async fn update_task_status(&self, ctx: &Context<'_>, id: i32, status: Status) -> Result<Option<Task>> {
        if !admit(ctx, Role::Employee).await {
            return Ok(None);
        }
        store(ctx)?.update_task_status(id, status).await.map_err(extend).map(Some)
    }

    async fn send_notification(&self, ctx: &Context<'_>, input: NewNotification) -> Result<Option<Notification>> {
        if !admit(ctx, Role::Manager).await {
            return Ok(None);
        }
        let store = store(ctx)?;
        input.validate().map_err(extend)?;
        require_employee(store, input.employee_id).await?;
        store.create_notification(input).await.map_err(extend).map(Some)
    }

    async fn mark_notification_read(&self, ctx: &Context<'_>, id: i32) -> Result<Option<Notification>> {
        if !admit(ctx, Role::Employee).await {
            return Ok(None);
        }
        store(ctx)?.mark_notification_read(id).await.map_err(extend).map(Some)
    }
}

async fn require_employee(store: &SharedStore, id: i32) -> Result<Employee> {
    store
        .get_employee(id)
        .await
        .and_then(|found| found.ok_or_else(|| StoreError::not_found("employee", id)))
        .map_err(extend)
}

async fn require_team(store: &SharedStore, id: i32) -> Result<Team> {
    store
        .get_team(id)
        .await
        .and_then(|found| found.ok_or_else(|| StoreError::not_found("team", id)))
        .map_err(extend)
}

async fn require_project(store: &SharedStore, id: i32) -> Result<Project> {
    store
        .get_project(id)
        .await
        .and_then(|found| found.ok_or_else(|| StoreError::not_found("project", id)))
        .map_err(extend)
}
