//! Snapshot store trait.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value store for serialized snapshots (the budget planner's single write).
///
/// Values are opaque strings; there is no versioning or read-back contract
/// beyond returning the last value written under a key.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Returns the last value written under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}
