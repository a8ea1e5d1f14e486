//! Conversation- and user-scoped state containers.
//!
//! A container loads a typed record at turn start and writes it back at
//! turn end. Writes are skipped when the record is unchanged since it was
//! loaded, unless forced.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::bot::Activity;
use crate::error::DatabaseError;
use crate::store::traits::Database;

/// Which slice of state a container manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScope {
    Conversation,
    User,
}

impl StateScope {
    /// Storage key for this scope in the context of `activity`.
    pub fn key_for(&self, activity: &Activity) -> String {
        match self {
            Self::Conversation => {
                conversation_key(&activity.channel_id, &activity.conversation.id)
            }
            Self::User => user_key(&activity.channel_id, &activity.from.id),
        }
    }
}

pub fn conversation_key(channel_id: &str, conversation_id: &str) -> String {
    format!("{channel_id}/conversations/{conversation_id}")
}

pub fn user_key(channel_id: &str, user_id: &str) -> String {
    format!("{channel_id}/users/{user_id}")
}

/// A loaded record plus a snapshot used for change detection.
#[derive(Debug)]
pub struct CachedState<T> {
    key: String,
    original: serde_json::Value,
    pub value: T,
}

impl<T: Serialize> CachedState<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_changed(&self) -> Result<bool, DatabaseError> {
        Ok(to_json(&self.value)? != self.original)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(value).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

/// State container bound to one scope.
#[derive(Clone)]
pub struct BotState {
    scope: StateScope,
    db: Arc<dyn Database>,
}

impl BotState {
    pub fn new(scope: StateScope, db: Arc<dyn Database>) -> Self {
        Self { scope, db }
    }

    pub fn conversation(db: Arc<dyn Database>) -> Self {
        Self::new(StateScope::Conversation, db)
    }

    pub fn user(db: Arc<dyn Database>) -> Self {
        Self::new(StateScope::User, db)
    }

    /// Load the record for `activity`, or `T::default()` when none exists.
    pub async fn load<T>(&self, activity: &Activity) -> Result<CachedState<T>, DatabaseError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let key = self.scope.key_for(activity);
        let value: T = match self.db.get_state(&key).await? {
            Some(json) => serde_json::from_value(json)
                .map_err(|e| DatabaseError::Serialization(format!("{key}: {e}")))?,
            None => T::default(),
        };
        let original = to_json(&value)?;
        Ok(CachedState {
            key,
            original,
            value,
        })
    }

    /// Write the record back. Returns whether a write happened.
    pub async fn save_changes<T: Serialize>(
        &self,
        state: &mut CachedState<T>,
        force: bool,
    ) -> Result<bool, DatabaseError> {
        let current = to_json(&state.value)?;
        if !force && current == state.original {
            return Ok(false);
        }
        self.db.set_state(&state.key, &current).await?;
        tracing::debug!(key = %state.key, scope = ?self.scope, "State saved");
        state.original = current;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::UserProfile;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, BotState, BotState) {
        let store = Arc::new(MemoryStore::new());
        let db: Arc<dyn Database> = store.clone();
        (store, BotState::conversation(db.clone()), BotState::user(db))
    }

    #[test]
    fn keys_are_scoped_by_channel() {
        let a = Activity::message("c1", "u1", "hi").with_channel("cli");
        assert_eq!(StateScope::Conversation.key_for(&a), "cli/conversations/c1");
        assert_eq!(StateScope::User.key_for(&a), "cli/users/u1");
    }

    #[tokio::test]
    async fn unchanged_state_is_not_written() {
        let (store, _, users) = setup();
        let a = Activity::message("c1", "u1", "hi");

        let mut profile = users.load::<Option<UserProfile>>(&a).await.unwrap();
        assert!(profile.value.is_none());
        assert!(!profile.is_changed().unwrap());
        assert!(!users.save_changes(&mut profile, false).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn changed_state_is_written_once() {
        let (store, _, users) = setup();
        let a = Activity::message("c1", "u1", "hi");

        let mut profile = users.load::<Option<UserProfile>>(&a).await.unwrap();
        profile.value.get_or_insert_with(UserProfile::default).name = "Sam".to_string();
        assert!(profile.is_changed().unwrap());
        assert!(users.save_changes(&mut profile, false).await.unwrap());
        assert!(!users.save_changes(&mut profile, false).await.unwrap());

        let stored = store.get_state(profile.key()).await.unwrap().unwrap();
        assert_eq!(stored["name"], "Sam");

        let reloaded = users.load::<Option<UserProfile>>(&a).await.unwrap();
        assert_eq!(reloaded.value.unwrap().name, "Sam");
    }

    #[tokio::test]
    async fn forced_save_writes_even_when_unchanged() {
        let (store, conversations, _) = setup();
        let a = Activity::message("c1", "u1", "hi");

        let mut data = conversations
            .load::<crate::dialog::ConversationData>(&a)
            .await
            .unwrap();
        assert!(conversations.save_changes(&mut data, true).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn corrupt_record_is_a_serialization_error() {
        let (store, _, users) = setup();
        let a = Activity::message("c1", "u1", "hi");
        store
            .set_state(&StateScope::User.key_for(&a), &serde_json::json!({"name": 42}))
            .await
            .unwrap();
        let err = users.load::<Option<UserProfile>>(&a).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Serialization(_)));
    }
}
