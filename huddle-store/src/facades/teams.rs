//! Team façade. Teams sit under a department (optionally) within an
//! organization and carry their own membership list.

use std::sync::Arc;

use huddle_core::{EntityKind, RecordId, StoreResult, Team, Timestamp, ValidationError};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct TeamDraft {
    pub organization_id: String,
    pub department_id: Option<String>,
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TeamPatch {
    pub department_id: Option<String>,
    pub name: Option<String>,
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    pub organization_id: Option<String>,
    pub department_id: Option<String>,
    pub name: Option<String>,
    /// Containment on the members list.
    pub member: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum TeamSortField {
    CreatedAt,
    Name,
}

impl Entity for Team {
    type Draft = TeamDraft;
    type Patch = TeamPatch;
    type Filter = TeamFilter;
    type SortField = TeamSortField;

    fn kind() -> EntityKind {
        EntityKind::Team
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

    fn build(id: RecordId, at: Timestamp, draft: TeamDraft) -> Result<Self, ValidationError> {
        if draft.organization_id.trim().is_empty() {
            return Err(ValidationError::required("organization_id"));
        }
        if draft.name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        Ok(Team {
            id,
            organization_id: draft.organization_id,
            department_id: draft.department_id,
            name: draft.name,
            members: draft.members,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: TeamPatch) {
        if let Some(department_id) = patch.department_id {
            self.department_id = Some(department_id);
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(members) = patch.members {
            self.members = members;
        }
    }

    fn matches(&self, filter: &TeamFilter) -> bool {
        filter
            .organization_id
            .as_ref()
            .map_or(true, |v| *v == self.organization_id)
            && filter
                .department_id
                .as_ref()
                .map_or(true, |v| self.department_id.as_deref() == Some(v.as_str()))
            && filter.name.as_ref().map_or(true, |v| *v == self.name)
            && filter
                .member
                .as_ref()
                .map_or(true, |v| self.members.contains(v))
    }

    fn sort_value(&self, field: TeamSortField) -> SortValue {
        match field {
            TeamSortField::CreatedAt => SortValue::Time(self.created_at),
            TeamSortField::Name => SortValue::Text(self.name.clone()),
        }
    }
}

/// Team collection bound to its namespace and capacity.
pub struct TeamStore {
    store: EntityStore<Team>,
}

impl TeamStore {
    pub const DEFAULT_CAPACITY: usize = 150;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: TeamDraft) -> StoreResult<Team> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<Team> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: TeamPatch) -> StoreResult<Team> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &TeamFilter,
        sort: Option<SortSpec<TeamSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Team>> {
        self.store.filter(filter, sort, limit)
    }

    /// Teams within an organization, by name.
    pub fn for_organization(&self, organization_id: &str) -> StoreResult<Vec<Team>> {
        self.store.filter(
            &TeamFilter {
                organization_id: Some(organization_id.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(TeamSortField::Name)),
            None,
        )
    }

    /// Teams under a department, by name.
    pub fn for_department(&self, department_id: &str) -> StoreResult<Vec<Team>> {
        self.store.filter(
            &TeamFilter {
                department_id: Some(department_id.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(TeamSortField::Name)),
            None,
        )
    }

    /// Add a member; adding a present member is a no-op.
    pub fn add_member(&self, id: &str, member: &str) -> StoreResult<Team> {
        let team = self.store.get(id)?;
        if team.members.iter().any(|m| m == member) {
            return Ok(team);
        }
        let mut members = team.members;
        members.push(member.to_string());
        self.store.update(
            id,
            TeamPatch {
                members: Some(members),
                ..Default::default()
            },
        )
    }

    /// Remove a member; removing an absent member is a no-op.
    pub fn remove_member(&self, id: &str, member: &str) -> StoreResult<Team> {
        let team = self.store.get(id)?;
        if !team.members.iter().any(|m| m == member) {
            return Ok(team);
        }
        let mut members = team.members;
        members.retain(|m| m != member);
        self.store.update(
            id,
            TeamPatch {
                members: Some(members),
                ..Default::default()
            },
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
