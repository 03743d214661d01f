use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::user::USER_ALREADY_REGISTERED;
use crate::models::{Task, TaskChanges, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
}

/// In-process store. Insertion order doubles as creation order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.matches(identifier)).cloned())
    }

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: User) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::BadRequest(USER_ALREADY_REGISTERED.into()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_tasks_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_task_by_id(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned())
    }

    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        self.tables.write().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
            .map(|task| {
                task.apply(changes);
                task.clone()
            }))
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let mut tables = self.tables.write().await;
        let position = tables
            .tasks
            .iter()
            .position(|t| t.id == id && t.user_id == owner);
        Ok(position.map(|index| tables.tasks.remove(index)))
    }
}
