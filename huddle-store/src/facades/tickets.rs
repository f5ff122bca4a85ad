//! Ticket façade.
//!
//! Plain capacity-bound CRUD; status, priority, assignee and tag queries
//! are all expressed through the typed filter, so no extra helpers exist
//! beyond the generic engine surface.

use std::sync::Arc;

use huddle_core::{
    EntityKind, RecordId, StoreResult, Ticket, TicketPriority, TicketStatus, Timestamp,
    ValidationError,
};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

/// Fields the caller supplies to open a ticket. Status always starts Open.
#[derive(Debug, Clone)]
pub struct TicketDraft {
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: TicketPriority,
    pub reporter: String,
    pub assignees: Vec<String>,
    pub tags: Vec<String>,
    pub department_id: Option<String>,
}

/// Shallow-merge update payload; unset fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assignees: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub department_id: Option<String>,
}

/// Typed filter. Scalar fields match by equality; `assignee` and `tag`
/// match by containment in the record's arrays.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub organization_id: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assignee: Option<String>,
    pub tag: Option<String>,
    pub reporter: Option<String>,
    pub department_id: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum TicketSortField {
    CreatedAt,
    UpdatedAt,
    Priority,
    Title,
}

impl Entity for Ticket {
    type Draft = TicketDraft;
    type Patch = TicketPatch;
    type Filter = TicketFilter;
    type SortField = TicketSortField;

    fn kind() -> EntityKind {
        EntityKind::Ticket
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

    fn build(id: RecordId, at: Timestamp, draft: TicketDraft) -> Result<Self, ValidationError> {
        if draft.organization_id.trim().is_empty() {
            return Err(ValidationError::required("organization_id"));
        }
        if draft.title.trim().is_empty() {
            return Err(ValidationError::required("title"));
        }
        Ok(Ticket {
            id,
            organization_id: draft.organization_id,
            title: draft.title,
            description: draft.description,
            status: TicketStatus::Open,
            priority: draft.priority,
            reporter: draft.reporter,
            assignees: draft.assignees,
            tags: draft.tags,
            department_id: draft.department_id,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: TicketPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignees) = patch.assignees {
            self.assignees = assignees;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(department_id) = patch.department_id {
            self.department_id = Some(department_id);
        }
    }

    fn matches(&self, filter: &TicketFilter) -> bool {
        filter
            .organization_id
            .as_ref()
            .map_or(true, |v| *v == self.organization_id)
            && filter.status.map_or(true, |v| v == self.status)
            && filter.priority.map_or(true, |v| v == self.priority)
            && filter
                .assignee
                .as_ref()
                .map_or(true, |v| self.assignees.contains(v))
            && filter.tag.as_ref().map_or(true, |v| self.tags.contains(v))
            && filter.reporter.as_ref().map_or(true, |v| *v == self.reporter)
            && filter
                .department_id
                .as_ref()
                .map_or(true, |v| self.department_id.as_deref() == Some(v.as_str()))
    }

    fn sort_value(&self, field: TicketSortField) -> SortValue {
        match field {
            TicketSortField::CreatedAt => SortValue::Time(self.created_at),
            TicketSortField::UpdatedAt => SortValue::Time(self.updated_at),
            TicketSortField::Priority => SortValue::Int(self.priority as i64),
            TicketSortField::Title => SortValue::Text(self.title.clone()),
        }
    }
}

/// Ticket collection bound to its namespace and capacity.
pub struct TicketStore {
    store: EntityStore<Ticket>,
}

impl TicketStore {
    /// Capacity tuned for moderate ticket volume on a client.
    pub const DEFAULT_CAPACITY: usize = 400;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: TicketDraft) -> StoreResult<Ticket> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<Ticket> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: TicketPatch) -> StoreResult<Ticket> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &TicketFilter,
        sort: Option<SortSpec<TicketSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Ticket>> {
        self.store.filter(filter, sort, limit)
    }

    pub fn list(&self) -> StoreResult<Vec<Ticket>> {
        self.store.list()
    }
}

// ============================================================================
// TESTS
// ============================================================================
