//! Channel message façade. CRUD plus reaction aggregation.

use std::sync::Arc;

use huddle_core::{ChannelMessage, EntityKind, RecordId, StoreResult, Timestamp, ValidationError};

use super::reactions;
use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct ChannelMessageDraft {
    pub channel_id: String,
    pub sender: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChannelMessagePatch {
    pub body: Option<String>,
    pub reactions: Option<Vec<huddle_core::Reaction>>,
}

#[derive(Debug, Clone, Default)]
pub struct ChannelMessageFilter {
    pub channel_id: Option<String>,
    pub sender: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum ChannelMessageSortField {
    CreatedAt,
    UpdatedAt,
}

impl Entity for ChannelMessage {
    type Draft = ChannelMessageDraft;
    type Patch = ChannelMessagePatch;
    type Filter = ChannelMessageFilter;
    type SortField = ChannelMessageSortField;

    fn kind() -> EntityKind {
        EntityKind::ChannelMessage
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn touch(&mut self, at: Timestamp) {
        self.updated_at = at;
    }

    fn build(
        id: RecordId,
        at: Timestamp,
        draft: ChannelMessageDraft,
    ) -> Result<Self, ValidationError> {
        if draft.channel_id.trim().is_empty() {
            return Err(ValidationError::required("channel_id"));
        }
        if draft.sender.trim().is_empty() {
            return Err(ValidationError::required("sender"));
        }
        Ok(ChannelMessage {
            id,
            channel_id: draft.channel_id,
            sender: draft.sender,
            body: draft.body,
            reactions: Vec::new(),
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: ChannelMessagePatch) {
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(reactions) = patch.reactions {
            self.reactions = reactions;
        }
    }

    fn matches(&self, filter: &ChannelMessageFilter) -> bool {
        filter
            .channel_id
            .as_ref()
            .map_or(true, |v| *v == self.channel_id)
            && filter.sender.as_ref().map_or(true, |v| *v == self.sender)
    }

    fn sort_value(&self, field: ChannelMessageSortField) -> SortValue {
        match field {
            ChannelMessageSortField::CreatedAt => SortValue::Time(self.created_at),
            ChannelMessageSortField::UpdatedAt => SortValue::Time(self.updated_at),
        }
    }
}

/// Channel message collection bound to its namespace and capacity.
pub struct ChannelMessageStore {
    store: EntityStore<ChannelMessage>,
}

impl ChannelMessageStore {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: ChannelMessageDraft) -> StoreResult<ChannelMessage> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<ChannelMessage> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: ChannelMessagePatch) -> StoreResult<ChannelMessage> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &ChannelMessageFilter,
        sort: Option<SortSpec<ChannelMessageSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<ChannelMessage>> {
        self.store.filter(filter, sort, limit)
    }

    /// Messages in a channel, oldest first.
    pub fn for_channel(&self, channel_id: &str) -> StoreResult<Vec<ChannelMessage>> {
        self.store.filter(
            &ChannelMessageFilter {
                channel_id: Some(channel_id.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(ChannelMessageSortField::CreatedAt)),
            None,
        )
    }

    /// Add `participant`'s reaction with `symbol`. Appends to the symbol's
    /// existing group or creates one; reacting twice with the same symbol
    /// is a no-op.
    pub fn add_reaction(
        &self,
        id: &str,
        symbol: &str,
        participant: &str,
    ) -> StoreResult<ChannelMessage> {
        let message = self.store.get(id)?;
        let mut groups = message.reactions.clone();
        if !reactions::add(&mut groups, symbol, participant) {
            return Ok(message);
        }
        self.store.update(
            id,
            ChannelMessagePatch {
                reactions: Some(groups),
                ..Default::default()
            },
        )
    }

    /// Remove `participant`'s reaction with `symbol`, dropping the group
    /// if it empties. Removing a reaction that was never added is a no-op.
    pub fn remove_reaction(
        &self,
        id: &str,
        symbol: &str,
        participant: &str,
    ) -> StoreResult<ChannelMessage> {
        let message = self.store.get(id)?;
        let mut groups = message.reactions.clone();
        if !reactions::remove(&mut groups, symbol, participant) {
            return Ok(message);
        }
        self.store.update(
            id,
            ChannelMessagePatch {
                reactions: Some(groups),
                ..Default::default()
            },
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substrate::MemorySubstrate;

    fn store() -> ChannelMessageStore {
        ChannelMessageStore::new(Arc::new(MemorySubstrate::new())).unwrap()
    }

    fn draft(channel: &str, body: &str) -> ChannelMessageDraft {
        ChannelMessageDraft {
            channel_id: channel.to_string(),
            sender: "ana".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_reaction_lifecycle_persists() {
        let store = store();
        let msg = store.create(draft("ch-1", "hello")).unwrap();

        store.add_reaction(&msg.id, "+1", "u1").unwrap();
        store.add_reaction(&msg.id, "+1", "u2").unwrap();

        let loaded = store.get(&msg.id).unwrap();
        assert_eq!(loaded.reactions.len(), 1);
        assert_eq!(loaded.reactions[0].participants, vec!["u1", "u2"]);

        store.remove_reaction(&msg.id, "+1", "u1").unwrap();
        store.remove_reaction(&msg.id, "+1", "u2").unwrap();
        assert!(store.get(&msg.id).unwrap().reactions.is_empty());
    }

    #[test]
    fn test_duplicate_reaction_does_not_touch_record() {
        let store = store();
        let msg = store.create(draft("ch-1", "hello")).unwrap();
        let reacted = store.add_reaction(&msg.id, "eyes", "u1").unwrap();
        let unchanged = store.add_reaction(&msg.id, "eyes", "u1").unwrap();
        assert_eq!(unchanged.updated_at, reacted.updated_at);
        assert_eq!(unchanged.reactions[0].participants, vec!["u1"]);
    }

    #[test]
    fn test_reaction_on_missing_message_is_not_found() {
        let store = store();
        assert!(store.add_reaction("gone", "+1", "u1").is_err());
    }

    #[test]
    fn test_for_channel_scopes_and_orders() {
        let store = store();
        store.create(draft("ch-1", "first")).unwrap();
        store.create(draft("ch-2", "elsewhere")).unwrap();
        store.create(draft("ch-1", "second")).unwrap();

        let thread = store.for_channel("ch-1").unwrap();
        let bodies: Vec<&str> = thread.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }
}
