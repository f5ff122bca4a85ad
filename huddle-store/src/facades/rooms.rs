//! Collaboration room façade. CRUD plus membership helpers.

use std::sync::Arc;

use huddle_core::{CollaborationRoom, EntityKind, RecordId, StoreResult, Timestamp, ValidationError};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct CollaborationRoomDraft {
    pub organization_id: String,
    pub name: String,
    pub purpose: Option<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CollaborationRoomPatch {
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct CollaborationRoomFilter {
    pub organization_id: Option<String>,
    /// Containment on the members list.
    pub member: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum CollaborationRoomSortField {
    CreatedAt,
    Name,
}

impl Entity for CollaborationRoom {
    type Draft = CollaborationRoomDraft;
    type Patch = CollaborationRoomPatch;
    type Filter = CollaborationRoomFilter;
    type SortField = CollaborationRoomSortField;

    fn kind() -> EntityKind {
        EntityKind::CollaborationRoom
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
        draft: CollaborationRoomDraft,
    ) -> Result<Self, ValidationError> {
        if draft.organization_id.trim().is_empty() {
            return Err(ValidationError::required("organization_id"));
        }
        if draft.name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        Ok(CollaborationRoom {
            id,
            organization_id: draft.organization_id,
            name: draft.name,
            purpose: draft.purpose,
            members: draft.members,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: CollaborationRoomPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(purpose) = patch.purpose {
            self.purpose = Some(purpose);
        }
        if let Some(members) = patch.members {
            self.members = members;
        }
    }

    fn matches(&self, filter: &CollaborationRoomFilter) -> bool {
        filter
            .organization_id
            .as_ref()
            .map_or(true, |v| *v == self.organization_id)
            && filter
                .member
                .as_ref()
                .map_or(true, |v| self.members.contains(v))
    }

    fn sort_value(&self, field: CollaborationRoomSortField) -> SortValue {
        match field {
            CollaborationRoomSortField::CreatedAt => SortValue::Time(self.created_at),
            CollaborationRoomSortField::Name => SortValue::Text(self.name.clone()),
        }
    }
}

/// Collaboration room collection bound to its namespace and capacity.
pub struct CollaborationRoomStore {
    store: EntityStore<CollaborationRoom>,
}

impl CollaborationRoomStore {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: CollaborationRoomDraft) -> StoreResult<CollaborationRoom> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<CollaborationRoom> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: CollaborationRoomPatch) -> StoreResult<CollaborationRoom> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &CollaborationRoomFilter,
        sort: Option<SortSpec<CollaborationRoomSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<CollaborationRoom>> {
        self.store.filter(filter, sort, limit)
    }

    /// Rooms a user belongs to, by name.
    pub fn for_member(&self, member: &str) -> StoreResult<Vec<CollaborationRoom>> {
        self.store.filter(
            &CollaborationRoomFilter {
                member: Some(member.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(CollaborationRoomSortField::Name)),
            None,
        )
    }

    /// Add a member; adding a present member is a no-op.
    pub fn add_member(&self, id: &str, member: &str) -> StoreResult<CollaborationRoom> {
        let room = self.store.get(id)?;
        if room.members.iter().any(|m| m == member) {
            return Ok(room);
        }
        let mut members = room.members;
        members.push(member.to_string());
        self.store.update(
            id,
            CollaborationRoomPatch {
                members: Some(members),
                ..Default::default()
            },
        )
    }

    /// Remove a member; removing an absent member is a no-op.
    pub fn remove_member(&self, id: &str, member: &str) -> StoreResult<CollaborationRoom> {
        let room = self.store.get(id)?;
        if !room.members.iter().any(|m| m == member) {
            return Ok(room);
        }
        let mut members = room.members;
        members.retain(|m| m != member);
        self.store.update(
            id,
            CollaborationRoomPatch {
                members: Some(members),
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

    fn store() -> CollaborationRoomStore {
        CollaborationRoomStore::new(Arc::new(MemorySubstrate::new())).unwrap()
    }

    fn draft(name: &str) -> CollaborationRoomDraft {
        CollaborationRoomDraft {
            organization_id: "org-1".to_string(),
            name: name.to_string(),
            purpose: None,
            members: vec!["ana".to_string(), "bo".to_string()],
        }
    }

    #[test]
    fn test_membership_round_trip() {
        let store = store();
        let room = store.create(draft("launch")).unwrap();

        let grown = store.add_member(&room.id, "cy").unwrap();
        assert_eq!(grown.members, vec!["ana", "bo", "cy"]);

        let shrunk = store.remove_member(&room.id, "bo").unwrap();
        assert_eq!(shrunk.members, vec!["ana", "cy"]);
    }

    #[test]
    fn test_membership_is_idempotent() {
        let store = store();
        let room = store.create(draft("launch")).unwrap();
        let same = store.add_member(&room.id, "ana").unwrap();
        assert_eq!(same.updated_at, room.updated_at);
        let same = store.remove_member(&room.id, "nobody").unwrap();
        assert_eq!(same.updated_at, room.updated_at);
    }

    #[test]
    fn test_for_member_containment() {
        let store = store();
        store.create(draft("launch")).unwrap();
        let mut other = draft("zz-private");
        other.members = vec!["cy".to_string()];
        store.create(other).unwrap();

        let rooms = store.for_member("ana").unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "launch");
    }
}
