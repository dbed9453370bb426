pub mod config_service;
pub mod paths;
pub mod snapshot_store;

pub use crate::config_service::{ConfigService, load_tables, load_tables_file};
pub use crate::paths::FinbotPaths;
pub use crate::snapshot_store::{InMemorySnapshotStore, JsonFileSnapshotStore};
