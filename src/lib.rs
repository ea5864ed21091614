// TaskList - in-memory to-do list store with priority ordering

pub mod config;
pub mod filter;
pub mod intent;
pub mod models;
pub mod record;
pub mod render;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use filter::{Filter, FilterOp};
pub use intent::{Intent, Target};
pub use models::{NewTask, Priority, Task, TaskChanges, TaskId, ViewFlags};
pub use record::{IndexValue, Record};
pub use store::{Change, SubscriptionId, TaskDefaults, TaskListStore};
