//! Notification façade. CRUD plus read-state helpers scoped by recipient.

use std::sync::Arc;

use huddle_core::{
    EntityKind, Notification, NotificationKind, RecordId, StoreResult, Timestamp, ValidationError,
};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub recipient: String,
    pub kind: NotificationKind,
    pub body: String,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationPatch {
    pub read: Option<bool>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub recipient: Option<String>,
    pub kind: Option<NotificationKind>,
    pub read: Option<bool>,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum NotificationSortField {
    CreatedAt,
    UpdatedAt,
}

impl Entity for Notification {
    type Draft = NotificationDraft;
    type Patch = NotificationPatch;
    type Filter = NotificationFilter;
    type SortField = NotificationSortField;

    fn kind() -> EntityKind {
        EntityKind::Notification
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
        draft: NotificationDraft,
    ) -> Result<Self, ValidationError> {
        if draft.recipient.trim().is_empty() {
            return Err(ValidationError::required("recipient"));
        }
        Ok(Notification {
            id,
            recipient: draft.recipient,
            kind: draft.kind,
            body: draft.body,
            read: false,
            organization_id: draft.organization_id,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: NotificationPatch) {
        if let Some(read) = patch.read {
            self.read = read;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
    }

    fn matches(&self, filter: &NotificationFilter) -> bool {
        filter
            .recipient
            .as_ref()
            .map_or(true, |v| *v == self.recipient)
            && filter.kind.map_or(true, |v| v == self.kind)
            && filter.read.map_or(true, |v| v == self.read)
            && filter
                .organization_id
                .as_ref()
                .map_or(true, |v| self.organization_id.as_deref() == Some(v.as_str()))
    }

    fn sort_value(&self, field: NotificationSortField) -> SortValue {
        match field {
            NotificationSortField::CreatedAt => SortValue::Time(self.created_at),
            NotificationSortField::UpdatedAt => SortValue::Time(self.updated_at),
        }
    }
}

/// Notification collection bound to its namespace and capacity.
pub struct NotificationStore {
    store: EntityStore<Notification>,
}

impl NotificationStore {
    pub const DEFAULT_CAPACITY: usize = 500;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: NotificationDraft) -> StoreResult<Notification> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<Notification> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: NotificationPatch) -> StoreResult<Notification> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &NotificationFilter,
        sort: Option<SortSpec<NotificationSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Notification>> {
        self.store.filter(filter, sort, limit)
    }

    /// Mark one notification read.
    pub fn mark_read(&self, id: &str) -> StoreResult<Notification> {
        self.store.update(
            id,
            NotificationPatch {
                read: Some(true),
                ..Default::default()
            },
        )
    }

    /// Mark every unread notification for `recipient` read. Returns how
    /// many were updated.
    pub fn mark_all_read(&self, recipient: &str) -> StoreResult<usize> {
        let unread = self.store.filter(
            &NotificationFilter {
                recipient: Some(recipient.to_string()),
                read: Some(false),
                ..Default::default()
            },
            None,
            None,
        )?;
        for notification in &unread {
            self.mark_read(&notification.id)?;
        }
        Ok(unread.len())
    }

    /// Unread notifications for `recipient`.
    pub fn unread_count(&self, recipient: &str) -> StoreResult<usize> {
        Ok(self
            .store
            .filter(
                &NotificationFilter {
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
