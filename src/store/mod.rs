//!
//! # Persistence
//!
//! Handlers only see the [`Store`] trait. [`PgStore`] keeps data in Postgres
//! through `sqlx`; [`MemoryStore`] keeps it in process memory and backs the
//! test suite and database-less local runs.
//!
//! Every task operation is scoped by owner: a task that exists but belongs to
//! someone else is reported exactly like a missing one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskChanges, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Looks a user up by email or username.
    async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError>;

    /// Looks for a user whose email is `email` or whose username is
    /// `username`. Each value is only compared against its own column.
    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, AppError>;

    /// Persists a new user. Fails with `BadRequest` if the email or username
    /// is already taken.
    async fn create_user(&self, user: User) -> Result<User, AppError>;

    /// All tasks owned by `owner`, oldest first.
    async fn find_tasks_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, AppError>;

    async fn find_task_by_id(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError>;

    async fn create_task(&self, task: Task) -> Result<Task, AppError>;

    /// Applies `changes` and returns the updated task, or `None` if there is
    /// no such task for `owner`.
    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError>;

    /// Removes the task and returns it, or `None` if there is no such task
    /// for `owner`.
    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError>;
}
