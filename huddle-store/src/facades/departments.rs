//! Department façade.

use std::sync::Arc;

use huddle_core::{Department, EntityKind, RecordId, StoreResult, Timestamp, ValidationError};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct DepartmentDraft {
    pub organization_id: String,
    pub name: String,
    pub description: Option<String>,
    pub lead: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub lead: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentFilter {
    pub organization_id: Option<String>,
    pub name: Option<String>,
    pub lead: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum DepartmentSortField {
    CreatedAt,
    Name,
}

impl Entity for Department {
    type Draft = DepartmentDraft;
    type Patch = DepartmentPatch;
    type Filter = DepartmentFilter;
    type SortField = DepartmentSortField;

    fn kind() -> EntityKind {
        EntityKind::Department
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

    fn build(id: RecordId, at: Timestamp, draft: DepartmentDraft) -> Result<Self, ValidationError> {
        if draft.organization_id.trim().is_empty() {
            return Err(ValidationError::required("organization_id"));
        }
        if draft.name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        Ok(Department {
            id,
            organization_id: draft.organization_id,
            name: draft.name,
            description: draft.description,
            lead: draft.lead,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: DepartmentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(lead) = patch.lead {
            self.lead = Some(lead);
        }
    }

    fn matches(&self, filter: &DepartmentFilter) -> bool {
        filter
            .organization_id
            .as_ref()
            .map_or(true, |v| *v == self.organization_id)
            && filter.name.as_ref().map_or(true, |v| *v == self.name)
            && filter
                .lead
                .as_ref()
                .map_or(true, |v| self.lead.as_deref() == Some(v.as_str()))
    }

    fn sort_value(&self, field: DepartmentSortField) -> SortValue {
        match field {
            DepartmentSortField::CreatedAt => SortValue::Time(self.created_at),
            DepartmentSortField::Name => SortValue::Text(self.name.clone()),
        }
    }
}

/// Department collection bound to its namespace and capacity.
pub struct DepartmentStore {
    store: EntityStore<Department>,
}

impl DepartmentStore {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: DepartmentDraft) -> StoreResult<Department> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<Department> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: DepartmentPatch) -> StoreResult<Department> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &DepartmentFilter,
        sort: Option<SortSpec<DepartmentSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Department>> {
        self.store.filter(filter, sort, limit)
    }

    /// Departments within an organization, by name.
    pub fn for_organization(&self, organization_id: &str) -> StoreResult<Vec<Department>> {
        self.store.filter(
            &DepartmentFilter {
                organization_id: Some(organization_id.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(DepartmentSortField::Name)),
            None,
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
