use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{
    completion_time, Employee, EmployeePatch, NewEmployee, NewNotification, NewProject, NewTask, NewTeam, NewTicket,
    Notification, Project, ProjectMember, Task, Team, Ticket,
};
use super::store::{Store, StoreError};
use crate::types::Status;

/// Store kept entirely in process memory. Used by tests and by the
/// development profile when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    /// Live employees only; deleting removes the row, which is what a
    /// soft delete looks like to every read
    employees: BTreeMap<i32, Employee>,
    teams: BTreeMap<i32, Team>,
    projects: BTreeMap<i32, Project>,
    tickets: BTreeMap<i32, Ticket>,
    tasks: BTreeMap<i32, Task>,
    notifications: BTreeMap<i32, Notification>,
    team_engineers: BTreeSet<(i32, i32)>,
    project_teams: BTreeSet<(i32, i32)>,
    project_members: BTreeMap<(i32, i32), ProjectMember>,
    sequences: Sequences,
}

#[derive(Default)]
struct Sequences {
    employee: i32,
    team: i32,
    project: i32,
    ticket: i32,
    task: i32,
    notification: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.employees
            .values()
            .any(|e| e.email == email && Some(e.id) != except)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.tables.read().await.employees.values().cloned().collect())
    }

    async fn get_employee(&self, id: i32) -> Result<Option<Employee>, StoreError> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn find_employee_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.employees.values().find(|e| e.email == email).cloned())
    }

    async fn create_employee(&self, input: NewEmployee) -> Result<Employee, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&input.email, None) {
            return Err(StoreError::Conflict(format!("email '{}' is already in use", input.email)));
        }

        let now = Utc::now();
        let employee = Employee {
            id: next(&mut tables.sequences.employee),
            name: input.name,
            email: input.email,
            role: input.role,
            active: true,
            project_assigned_id: input.project_assigned_id,
            created_at: now,
            updated_at: now,
        };
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, id: i32, patch: EmployeePatch) -> Result<Employee, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &patch.email {
            if tables.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict(format!("email '{}' is already in use", email)));
            }
        }

        let employee = tables
            .employees
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("employee", id))?;
        patch.apply(employee);
        Ok(employee.clone())
    }

    async fn delete_employee(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.employees.remove(&id).is_some())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        Ok(self.tables.read().await.teams.values().cloned().collect())
    }

    async fn get_team(&self, id: i32) -> Result<Option<Team>, StoreError> {
        Ok(self.tables.read().await.teams.get(&id).cloned())
    }

    async fn create_team(&self, input: NewTeam) -> Result<Team, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let team = Team {
            id: next(&mut tables.sequences.team),
            team_leader_id: input.team_leader_id,
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        tables.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn add_team_engineer(&self, team_id: i32, engineer_id: i32) -> Result<(), StoreError> {
        self.tables.write().await.team_engineers.insert((team_id, engineer_id));
        Ok(())
    }

    async fn team_engineers(&self, team_id: i32) -> Result<Vec<Employee>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .team_engineers
            .iter()
            .filter(|(team, _)| *team == team_id)
            .filter_map(|(_, engineer)| tables.employees.get(engineer).cloned())
            .collect())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.tables.read().await.projects.values().cloned().collect())
    }

    async fn get_project(&self, id: i32) -> Result<Option<Project>, StoreError> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn create_project(&self, input: NewProject) -> Result<Project, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let project = Project {
            id: next(&mut tables.sequences.project),
            manager_id: input.manager_id,
            name: input.name,
            status: input.status,
            description: input.description,
            start_date: input.start_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project_status(&self, id: i32, status: Status) -> Result<Project, StoreError> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("project", id))?;
        project.status = status;
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn assign_team_to_project(&self, project_id: i32, team_id: i32) -> Result<(), StoreError> {
        self.tables.write().await.project_teams.insert((project_id, team_id));
        Ok(())
    }

    async fn project_teams(&self, project_id: i32) -> Result<Vec<Team>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .project_teams
            .iter()
            .filter(|(project, _)| *project == project_id)
            .filter_map(|(_, team)| tables.teams.get(team).cloned())
            .collect())
    }

    async fn add_project_member(
        &self,
        project_id: i32,
        employee_id: i32,
        role: &str,
    ) -> Result<ProjectMember, StoreError> {
        let mut tables = self.tables.write().await;
        let member = tables
            .project_members
            .entry((project_id, employee_id))
            .or_insert_with(|| ProjectMember {
                project_id,
                employee_id,
                role: role.to_string(),
                created_at: Utc::now(),
            });
        member.role = role.to_string();
        Ok(member.clone())
    }

    async fn project_members(&self, project_id: i32) -> Result<Vec<ProjectMember>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .project_members
            .range((project_id, i32::MIN)..=(project_id, i32::MAX))
            .filter(|((_, employee), _)| tables.employees.contains_key(employee))
            .map(|(_, member)| member.clone())
            .collect())
    }

    async fn list_tickets(&self, project_id: Option<i32>) -> Result<Vec<Ticket>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tickets
            .values()
            .filter(|t| project_id.map_or(true, |p| t.project_id == p))
            .cloned()
            .collect())
    }

    async fn get_ticket(&self, id: i32) -> Result<Option<Ticket>, StoreError> {
        Ok(self.tables.read().await.tickets.get(&id).cloned())
    }

    async fn create_ticket(&self, input: NewTicket) -> Result<Ticket, StoreError> {
        let mut tables = self.tables.write().await;
        let ticket = Ticket {
            id: next(&mut tables.sequences.ticket),
            project_id: input.project_id,
            assigned_to_id: input.assigned_to_id,
            status: Status::NotStarted,
            title: input.title,
            description: input.description,
            priority: input.priority,
            created_at: Utc::now(),
            completed_at: None,
        };
        tables.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket_status(&self, id: i32, status: Status) -> Result<Ticket, StoreError> {
        let mut tables = self.tables.write().await;
        let ticket = tables
            .tickets
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("ticket", id))?;
        ticket.status = status;
        ticket.completed_at = completion_time(status, Utc::now());
        Ok(ticket.clone())
    }

    async fn list_tasks(&self, assigned_to_id: Option<i32>) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| assigned_to_id.map_or(true, |a| t.assigned_to_id == Some(a)))
            .cloned()
            .collect())
    }

    async fn create_task(&self, input: NewTask) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        let task = Task {
            id: next(&mut tables.sequences.task),
            title: input.title,
            description: input.description,
            assigned_to_id: input.assigned_to_id,
            project_id: input.project_id,
            due_date: input.due_date,
            status: Status::NotStarted,
            priority: input.priority,
            created_at: Utc::now(),
            completed_at: None,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task_status(&self, id: i32, status: Status) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        let task = tables
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("task", id))?;
        task.status = status;
        task.completed_at = completion_time(status, Utc::now());
        Ok(task.clone())
    }

    async fn list_notifications(&self, employee_id: i32, unread_only: bool) -> Result<Vec<Notification>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .values()
            .filter(|n| n.employee_id == employee_id && !(unread_only && n.read))
            .cloned()
            .collect())
    }

    async fn create_notification(&self, input: NewNotification) -> Result<Notification, StoreError> {
        let mut tables = self.tables.write().await;
        let notification = Notification {
            id: next(&mut tables.sequences.notification),
            message: input.message,
            employee_id: input.employee_id,
            kind: input.kind,
            created_at: Utc::now(),
            read: false,
        };
        tables.notifications.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn mark_notification_read(&self, id: i32) -> Result<Notification, StoreError> {
        let mut tables = self.tables.write().await;
        let notification = tables
            .notifications
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("notification", id))?;
        notification.read = true;
        Ok(notification.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, Role};

    fn employee(name: &str, email: &str) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Employee,
            project_assigned_id: None,
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.create_employee(employee("A", "a@example.com")).await.unwrap();
        let b = store.create_employee(employee("B", "b@example.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert!(a.active);
    }

    #[tokio::test]
    async fn duplicate_live_email_conflicts() {
        let store = MemoryStore::new();
        store.create_employee(employee("A", "a@example.com")).await.unwrap();
        let err = store.create_employee(employee("A2", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn soft_deleted_employee_disappears_and_frees_email() {
        let store = MemoryStore::new();
        let a = store.create_employee(employee("A", "a@example.com")).await.unwrap();

        assert!(store.delete_employee(a.id).await.unwrap());
        assert!(!store.delete_employee(a.id).await.unwrap());
        assert!(store.get_employee(a.id).await.unwrap().is_none());
        assert!(store.list_employees().await.unwrap().is_empty());

        let again = store.create_employee(employee("A", "a@example.com")).await.unwrap();
        assert_ne!(again.id, a.id);
    }

    #[tokio::test]
    async fn updating_missing_employee_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update_employee(99, EmployeePatch::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn completing_a_ticket_stamps_completion_time() {
        let store = MemoryStore::new();
        let project = store
            .create_project(NewProject {
                name: "Apollo".to_string(),
                description: None,
                manager_id: None,
                status: Status::NotStarted,
                start_date: None,
            })
            .await
            .unwrap();
        let ticket = store
            .create_ticket(NewTicket {
                project_id: project.id,
                title: "Wire up login".to_string(),
                description: None,
                assigned_to_id: None,
                priority: Priority::High,
            })
            .await
            .unwrap();
        assert!(ticket.completed_at.is_none());

        let done = store.update_ticket_status(ticket.id, Status::Completed).await.unwrap();
        assert!(done.completed_at.is_some());

        let reopened = store.update_ticket_status(ticket.id, Status::InProgress).await.unwrap();
        assert!(reopened.completed_at.is_none());
    }

    #[tokio::test]
    async fn joins_are_idempotent() {
        let store = MemoryStore::new();
        let team = store
            .create_team(NewTeam { name: "Core".to_string(), description: None, team_leader_id: None })
            .await
            .unwrap();
        let engineer = store.create_employee(employee("E", "e@example.com")).await.unwrap();

        store.add_team_engineer(team.id, engineer.id).await.unwrap();
        store.add_team_engineer(team.id, engineer.id).await.unwrap();

        let engineers = store.team_engineers(team.id).await.unwrap();
        assert_eq!(engineers.len(), 1);
        assert_eq!(engineers[0].id, engineer.id);
    }

    #[tokio::test]
    async fn re_adding_a_member_updates_the_project_role() {
        let store = MemoryStore::new();
        let e = store.create_employee(employee("E", "e@example.com")).await.unwrap();

        store.add_project_member(1, e.id, "MEMBER").await.unwrap();
        let updated = store.add_project_member(1, e.id, "REVIEWER").await.unwrap();
        assert_eq!(updated.role, "REVIEWER");

        let members = store.project_members(1).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, "REVIEWER");

        store.delete_employee(e.id).await.unwrap();
        assert!(store.project_members(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unread_filter_hides_read_notifications() {
        let store = MemoryStore::new();
        let e = store.create_employee(employee("E", "e@example.com")).await.unwrap();
        let first = store
            .create_notification(NewNotification {
                employee_id: e.id,
                message: "hello".to_string(),
                kind: Default::default(),
            })
            .await
            .unwrap();
        store
            .create_notification(NewNotification {
                employee_id: e.id,
                message: "again".to_string(),
                kind: Default::default(),
            })
            .await
            .unwrap();

        store.mark_notification_read(first.id).await.unwrap();

        assert_eq!(store.list_notifications(e.id, false).await.unwrap().len(), 2);
        let unread = store.list_notifications(e.id, true).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "again");
    }
}
