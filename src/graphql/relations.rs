//! Object relations resolved lazily against the store.

use async_graphql::{ComplexObject, Context, Result};

use super::{extend, store};
use crate::database::models::{Employee, Notification, Project, ProjectMember, Task, Team, Ticket};

#[ComplexObject]
impl Employee {
    async fn notifications(&self, ctx: &Context<'_>) -> Result<Vec<Notification>> {
        store(ctx)?.list_notifications(self.id, false).await.map_err(extend)
    }

    async fn project_assigned(&self, ctx: &Context<'_>) -> Result<Option<Project>> {
        match self.project_assigned_id {
            Some(id) => store(ctx)?.get_project(id).await.map_err(extend),
            None => Ok(None),
        }
    }
}

#[ComplexObject]
impl Team {
    async fn leader(&self, ctx: &Context<'_>) -> Result<Option<Employee>> {
        match self.team_leader_id {
            Some(id) => store(ctx)?.get_employee(id).await.map_err(extend),
            None => Ok(None),
        }
    }

    async fn engineers(&self, ctx: &Context<'_>) -> Result<Vec<Employee>> {
        store(ctx)?.team_engineers(self.id).await.map_err(extend)
    }
}

#[ComplexObject]
impl Project {
    async fn manager(&self, ctx: &Context<'_>) -> Result<Option<Employee>> {
        match self.manager_id {
            Some(id) => store(ctx)?.get_employee(id).await.map_err(extend),
            None => Ok(None),
        }
    }

    async fn teams(&self, ctx: &Context<'_>) -> Result<Vec<Team>> {
        store(ctx)?.project_teams(self.id).await.map_err(extend)
    }

    async fn tickets(&self, ctx: &Context<'_>) -> Result<Vec<Ticket>> {
        store(ctx)?.list_tickets(Some(self.id)).await.map_err(extend)
    }

    async fn members(&self, ctx: &Context<'_>) -> Result<Vec<ProjectMember>> {
        store(ctx)?.project_members(self.id).await.map_err(extend)
    }
}

#[ComplexObject]
impl ProjectMember {
    async fn employee(&self, ctx: &Context<'_>) -> Result<Option<Employee>> {
        store(ctx)?.get_employee(self.employee_id).await.map_err(extend)
    }
}

#[ComplexObject]
impl Ticket {
    async fn project(&self, ctx: &Context<'_>) -> Result<Option<Project>> {
        store(ctx)?.get_project(self.project_id).await.map_err(extend)
    }

    /// `None` when unassigned or the assignee has been deleted
    async fn assignee(&self, ctx: &Context<'_>) -> Result<Option<Employee>> {
        match self.assigned_to_id {
            Some(id) => store(ctx)?.get_employee(id).await.map_err(extend),
            None => Ok(None),
        }
    }
}

#[ComplexObject]
impl Task {
    async fn assignee(&self, ctx: &Context<'_>) -> Result<Option<Employee>> {
        match self.assigned_to_id {
            Some(id) => store(ctx)?.get_employee(id).await.map_err(extend),
            None => Ok(None),
        }
    }

    async fn project(&self, ctx: &Context<'_>) -> Result<Option<Project>> {
        match self.project_id {
            Some(id) => store(ctx)?.get_project(id).await.map_err(extend),
            None => Ok(None),
        }
    }
}
