pub mod category;
pub mod task;
pub mod user;

pub use category::{Category, CategoryInput, TaskCategory, TaskCategoryInput};
pub use task::{Task, TaskInput, TaskPriority, TaskQuery, TaskStatus};
pub use user::{Identity, NewUser, Role, User};
