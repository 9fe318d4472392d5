pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskInput, TaskQuery, TaskRecord};
pub use user::{User, UserCreate, UserRecord};
