//! Group message façade. Room-scoped messaging with reaction aggregation.

use std::sync::Arc;

use huddle_core::{EntityKind, GroupMessage, RecordId, StoreResult, Timestamp, ValidationError};

use super::reactions;
use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct GroupMessageDraft {
    pub room_id: String,
    pub sender: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct GroupMessagePatch {
    pub body: Option<String>,
    pub reactions: Option<Vec<huddle_core::Reaction>>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupMessageFilter {
    pub room_id: Option<String>,
    pub sender: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum GroupMessageSortField {
    CreatedAt,
    UpdatedAt,
}

impl Entity for GroupMessage {
    type Draft = GroupMessageDraft;
    type Patch = GroupMessagePatch;
    type Filter = GroupMessageFilter;
    type SortField = GroupMessageSortField;

    fn kind() -> EntityKind {
        EntityKind::GroupMessage
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

    fn build(id: RecordId, at: Timestamp, draft: GroupMessageDraft) -> Result<Self, ValidationError> {
        if draft.room_id.trim().is_empty() {
            return Err(ValidationError::required("room_id"));
        }
        if draft.sender.trim().is_empty() {
            return Err(ValidationError::required("sender"));
        }
        Ok(GroupMessage {
            id,
            room_id: draft.room_id,
            sender: draft.sender,
            body: draft.body,
            reactions: Vec::new(),
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: GroupMessagePatch) {
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(reactions) = patch.reactions {
            self.reactions = reactions;
        }
    }

    fn matches(&self, filter: &GroupMessageFilter) -> bool {
        filter.room_id.as_ref().map_or(true, |v| *v == self.room_id)
            && filter.sender.as_ref().map_or(true, |v| *v == self.sender)
    }

    fn sort_value(&self, field: GroupMessageSortField) -> SortValue {
        match field {
            GroupMessageSortField::CreatedAt => SortValue::Time(self.created_at),
            GroupMessageSortField::UpdatedAt => SortValue::Time(self.updated_at),
        }
    }
}

/// Group message collection bound to its namespace and capacity.
pub struct GroupMessageStore {
    store: EntityStore<GroupMessage>,
}

impl GroupMessageStore {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: GroupMessageDraft) -> StoreResult<GroupMessage> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<GroupMessage> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: GroupMessagePatch) -> StoreResult<GroupMessage> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &GroupMessageFilter,
        sort: Option<SortSpec<GroupMessageSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<GroupMessage>> {
        self.store.filter(filter, sort, limit)
    }

    /// Messages in a room, oldest first.
    pub fn for_room(&self, room_id: &str) -> StoreResult<Vec<GroupMessage>> {
        self.store.filter(
            &GroupMessageFilter {
                room_id: Some(room_id.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(GroupMessageSortField::CreatedAt)),
            None,
        )
    }

    /// Add `participant`'s reaction with `symbol`; a repeat reaction with
    /// the same symbol is a no-op.
    pub fn add_reaction(
        &self,
        id: &str,
        symbol: &str,
        participant: &str,
    ) -> StoreResult<GroupMessage> {
        let message = self.store.get(id)?;
        let mut groups = message.reactions.clone();
        if !reactions::add(&mut groups, symbol, participant) {
            return Ok(message);
        }
        self.store.update(
            id,
            GroupMessagePatch {
                reactions: Some(groups),
                ..Default::default()
            },
        )
    }

    /// Remove `participant`'s reaction with `symbol`, dropping the group
    /// if it empties.
    pub fn remove_reaction(
        &self,
        id: &str,
        symbol: &str,
        participant: &str,
    ) -> StoreResult<GroupMessage> {
        let message = self.store.get(id)?;
        let mut groups = message.reactions.clone();
        if !reactions::remove(&mut groups, symbol, participant) {
            return Ok(message);
        }
        self.store.update(
            id,
            GroupMessagePatch {
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

    fn store() -> GroupMessageStore {
        GroupMessageStore::new(Arc::new(MemorySubstrate::new())).unwrap()
    }

    fn draft(room: &str, body: &str) -> GroupMessageDraft {
        GroupMessageDraft {
            room_id: room.to_string(),
            sender: "ana".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_for_room_scopes_and_orders() {
        let store = store();
        store.create(draft("room-1", "first")).unwrap();
        store.create(draft("room-2", "elsewhere")).unwrap();
        store.create(draft("room-1", "second")).unwrap();

        let thread = store.for_room("room-1").unwrap();
        let bodies: Vec<&str> = thread.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[test]
    fn test_reaction_groups_aggregate_by_symbol() {
        let store = store();
        let msg = store.create(draft("room-1", "hello")).unwrap();

        store.add_reaction(&msg.id, "+1", "u1").unwrap();
        let loaded = store.add_reaction(&msg.id, "+1", "u2").unwrap();
        assert_eq!(loaded.reactions.len(), 1);
        assert_eq!(loaded.reactions[0].participants, vec!["u1", "u2"]);
    }

    #[test]
    fn test_removing_last_participant_drops_group() {
        let store = store();
        let msg = store.create(draft("room-1", "hello")).unwrap();
        store.add_reaction(&msg.id, "eyes", "u1").unwrap();
        let cleared = store.remove_reaction(&msg.id, "eyes", "u1").unwrap();
        assert!(cleared.reactions.is_empty());
    }

    #[test]
    fn test_removing_absent_reaction_is_noop() {
        let store = store();
        let msg = store.create(draft("room-1", "hello")).unwrap();
        let unchanged = store.remove_reaction(&msg.id, "eyes", "u1").unwrap();
        assert_eq!(unchanged.updated_at, msg.updated_at);
    }
}
