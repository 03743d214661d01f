pub mod task;
pub mod user;

pub use task::{Task, TaskChanges, TaskInput, TaskStatus};
pub use user::{Gender, User};
