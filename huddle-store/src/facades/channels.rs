//! Channel façade. CRUD plus membership helpers.

use std::sync::Arc;

use huddle_core::{Channel, EntityKind, RecordId, StoreResult, Timestamp, ValidationError};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct ChannelDraft {
    pub organization_id: String,
    pub name: String,
    pub topic: Option<String>,
    pub members: Vec<String>,
    pub private: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ChannelPatch {
    pub name: Option<String>,
    pub topic: Option<String>,
    pub members: Option<Vec<String>>,
    pub private: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ChannelFilter {
    pub organization_id: Option<String>,
    pub name: Option<String>,
    /// Containment on the members list.
    pub member: Option<String>,
    pub private: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub enum ChannelSortField {
    CreatedAt,
    Name,
}

impl Entity for Channel {
    type Draft = ChannelDraft;
    type Patch = ChannelPatch;
    type Filter = ChannelFilter;
    type SortField = ChannelSortField;

    fn kind() -> EntityKind {
        EntityKind::Channel
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

    fn build(id: RecordId, at: Timestamp, draft: ChannelDraft) -> Result<Self, ValidationError> {
        if draft.organization_id.trim().is_empty() {
            return Err(ValidationError::required("organization_id"));
        }
        if draft.name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        Ok(Channel {
            id,
            organization_id: draft.organization_id,
            name: draft.name,
            topic: draft.topic,
            members: draft.members,
            private: draft.private,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: ChannelPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(topic) = patch.topic {
            self.topic = Some(topic);
        }
        if let Some(members) = patch.members {
            self.members = members;
        }
        if let Some(private) = patch.private {
            self.private = private;
        }
    }

    fn matches(&self, filter: &ChannelFilter) -> bool {
        filter
            .organization_id
            .as_ref()
            .map_or(true, |v| *v == self.organization_id)
            && filter.name.as_ref().map_or(true, |v| *v == self.name)
            && filter
                .member
                .as_ref()
                .map_or(true, |v| self.members.contains(v))
            && filter.private.map_or(true, |v| v == self.private)
    }

    fn sort_value(&self, field: ChannelSortField) -> SortValue {
        match field {
            ChannelSortField::CreatedAt => SortValue::Time(self.created_at),
            ChannelSortField::Name => SortValue::Text(self.name.clone()),
        }
    }
}

/// Channel collection bound to its namespace and capacity.
pub struct ChannelStore {
    store: EntityStore<Channel>,
}

impl ChannelStore {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: ChannelDraft) -> StoreResult<Channel> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<Channel> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: ChannelPatch) -> StoreResult<Channel> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &ChannelFilter,
        sort: Option<SortSpec<ChannelSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Channel>> {
        self.store.filter(filter, sort, limit)
    }

    /// Channels a user belongs to within an organization.
    pub fn for_member(&self, organization_id: &str, member: &str) -> StoreResult<Vec<Channel>> {
        self.store.filter(
            &ChannelFilter {
                organization_id: Some(organization_id.to_string()),
                member: Some(member.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(ChannelSortField::Name)),
            None,
        )
    }

    /// Add a member via read-modify-write of the members array. Adding a
    /// member who is already present is a no-op and does not bump
    /// `updated_at`.
    pub fn add_member(&self, id: &str, member: &str) -> StoreResult<Channel> {
        let channel = self.store.get(id)?;
        if channel.members.iter().any(|m| m == member) {
            return Ok(channel);
        }
        let mut members = channel.members;
        members.push(member.to_string());
        self.store.update(
            id,
            ChannelPatch {
                members: Some(members),
                ..Default::default()
            },
        )
    }

    /// Remove a member; removing an absent member is a no-op.
    pub fn remove_member(&self, id: &str, member: &str) -> StoreResult<Channel> {
        let channel = self.store.get(id)?;
        if !channel.members.iter().any(|m| m == member) {
            return Ok(channel);
        }
        let mut members = channel.members;
        members.retain(|m| m != member);
        self.store.update(
            id,
            ChannelPatch {
                members: Some(members),
                ..Default::default()
            },
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
