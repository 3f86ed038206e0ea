// TaskList - Task list state management with local key-value persistence

pub mod auth;
pub mod config;
pub mod filter;
pub mod models;
pub mod notice;
pub mod record;
pub mod render;
pub mod sqlite;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use filter::{SortDirection, StatusFilter};
pub use models::{StatusSet, Task, TaskId, now_ms};
pub use notice::Notice;
pub use record::{Record, load_record, save_record};
pub use sqlite::SqliteStorage;
pub use storage::{MemoryStorage, Storage};
pub use store::{PendingInput, StoreOptions, TaskStore, View};
