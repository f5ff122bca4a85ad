//! Direct message façade.
//!
//! A conversation between two users is identified by a canonical key
//! derived from the sorted participant pair, so messages in either
//! direction land in the same thread regardless of who sent them.

use std::sync::Arc;

use huddle_core::{DirectMessage, EntityKind, RecordId, StoreError, StoreResult, Timestamp, ValidationError};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

/// Canonical conversation key for a participant pair. Symmetric:
/// `conversation_key(a, b) == conversation_key(b, a)`.
pub fn conversation_key(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}:{hi}")
}

#[derive(Debug, Clone)]
pub struct DirectMessageDraft {
    pub sender: String,
    pub recipient: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct DirectMessagePatch {
    pub body: Option<String>,
    pub read: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct DirectMessageFilter {
    pub conversation_key: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub read: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub enum DirectMessageSortField {
    CreatedAt,
    UpdatedAt,
}

impl Entity for DirectMessage {
    type Draft = DirectMessageDraft;
    type Patch = DirectMessagePatch;
    type Filter = DirectMessageFilter;
    type SortField = DirectMessageSortField;

    fn kind() -> EntityKind {
        EntityKind::DirectMessage
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
        draft: DirectMessageDraft,
    ) -> Result<Self, ValidationError> {
        if draft.sender.trim().is_empty() {
            return Err(ValidationError::required("sender"));
        }
        if draft.recipient.trim().is_empty() {
            return Err(ValidationError::required("recipient"));
        }
        let key = conversation_key(&draft.sender, &draft.recipient);
        Ok(DirectMessage {
            id,
            sender: draft.sender,
            recipient: draft.recipient,
            conversation_key: key,
            body: draft.body,
            read: false,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: DirectMessagePatch) {
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(read) = patch.read {
            self.read = read;
        }
    }

    fn matches(&self, filter: &DirectMessageFilter) -> bool {
        filter
            .conversation_key
            .as_ref()
            .map_or(true, |v| *v == self.conversation_key)
            && filter.sender.as_ref().map_or(true, |v| *v == self.sender)
            && filter
                .recipient
                .as_ref()
                .map_or(true, |v| *v == self.recipient)
            && filter.read.map_or(true, |v| v == self.read)
    }

    fn sort_value(&self, field: DirectMessageSortField) -> SortValue {
        match field {
            DirectMessageSortField::CreatedAt => SortValue::Time(self.created_at),
            DirectMessageSortField::UpdatedAt => SortValue::Time(self.updated_at),
        }
    }
}

/// Direct message collection bound to its namespace and capacity.
pub struct DirectMessageStore {
    store: EntityStore<DirectMessage>,
}

impl DirectMessageStore {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: DirectMessageDraft) -> StoreResult<DirectMessage> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<DirectMessage> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: DirectMessagePatch) -> StoreResult<DirectMessage> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &DirectMessageFilter,
        sort: Option<SortSpec<DirectMessageSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<DirectMessage>> {
        self.store.filter(filter, sort, limit)
    }

    /// Both directions of the conversation between `a` and `b`, oldest
    /// first.
    pub fn get_conversation(&self, a: &str, b: &str) -> StoreResult<Vec<DirectMessage>> {
        self.store.filter(
            &DirectMessageFilter {
                conversation_key: Some(conversation_key(a, b)),
                ..Default::default()
            },
            Some(SortSpec::ascending(DirectMessageSortField::CreatedAt)),
            None,
        )
    }

    /// Mark the given messages read. Ids that no longer exist (evicted or
    /// deleted) are skipped; returns how many records were updated.
    pub fn mark_as_read(&self, ids: &[RecordId]) -> StoreResult<usize> {
        let mut updated = 0;
        for id in ids {
            match self.store.update(
                id,
                DirectMessagePatch {
                    read: Some(true),
                    ..Default::default()
                },
            ) {
                Ok(_) => updated += 1,
                Err(StoreError::NotFound { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(updated)
    }

    /// Unread messages addressed to `recipient`.
    pub fn unread_count(&self, recipient: &str) -> StoreResult<usize> {
        Ok(self
            .store
            .filter(
                &DirectMessageFilter {
                    recipient: Some(recipient.to_string()),
                    read: Some(false),
                    ..Default::default()
                },
                None,
                None,
            )?
            .len())
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// conversation_key(a, b) == conversation_key(b, a) for all pairs.
        #[test]
        fn prop_conversation_key_symmetry(a in "[a-z0-9]{1,12}", b in "[a-z0-9]{1,12}") {
            prop_assert_eq!(conversation_key(&a, &b), conversation_key(&b, &a));
        }

        /// The key always carries both participant identifiers.
        #[test]
        fn prop_conversation_key_carries_participants(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            let key = conversation_key(&a, &b);
            prop_assert!(key.contains(&a));
            prop_assert!(key.contains(&b));
        }
    }
}
