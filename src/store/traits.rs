//! `Database` trait: async key/value interface for bot state.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Backend-agnostic store for scoped JSON state.
///
/// Keys are full scope keys such as `"cli/conversations/abc"`. Writes are
/// upserts; the last write wins.
#[async_trait]
pub trait Database: Send + Sync {
    /// Create or migrate the schema.
    async fn init_schema(&self) -> Result<(), DatabaseError>;

    /// Fetch the value stored under `key`.
    async fn get_state(&self, key: &str) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Store `value` under `key`, replacing anything already there.
    async fn set_state(&self, key: &str, value: &serde_json::Value) -> Result<(), DatabaseError>;

    /// Remove `key`. Returns whether anything was deleted.
    async fn delete_state(&self, key: &str) -> Result<bool, DatabaseError>;
}
