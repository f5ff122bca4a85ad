//! Join request façade.
//!
//! Requests to join an organization, reviewed by that organization's
//! admins - so read-state helpers are scoped by the owning organization
//! rather than by a user.

use std::sync::Arc;

use huddle_core::{
    EntityKind, JoinRequest, JoinRequestStatus, RecordId, StoreResult, Timestamp, ValidationError,
};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct JoinRequestDraft {
    pub organization_id: String,
    pub user_id: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JoinRequestPatch {
    pub status: Option<JoinRequestStatus>,
    pub read: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct JoinRequestFilter {
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<JoinRequestStatus>,
    pub read: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub enum JoinRequestSortField {
    CreatedAt,
    UpdatedAt,
}

impl Entity for JoinRequest {
    type Draft = JoinRequestDraft;
    type Patch = JoinRequestPatch;
    type Filter = JoinRequestFilter;
    type SortField = JoinRequestSortField;

    fn kind() -> EntityKind {
        EntityKind::JoinRequest
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

    fn build(id: RecordId, at: Timestamp, draft: JoinRequestDraft) -> Result<Self, ValidationError> {
        if draft.organization_id.trim().is_empty() {
            return Err(ValidationError::required("organization_id"));
        }
        if draft.user_id.trim().is_empty() {
            return Err(ValidationError::required("user_id"));
        }
        Ok(JoinRequest {
            id,
            organization_id: draft.organization_id,
            user_id: draft.user_id,
            message: draft.message,
            status: JoinRequestStatus::Pending,
            read: false,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: JoinRequestPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(read) = patch.read {
            self.read = read;
        }
    }

    fn matches(&self, filter: &JoinRequestFilter) -> bool {
        filter
            .organization_id
            .as_ref()
            .map_or(true, |v| *v == self.organization_id)
            && filter.user_id.as_ref().map_or(true, |v| *v == self.user_id)
            && filter.status.map_or(true, |v| v == self.status)
            && filter.read.map_or(true, |v| v == self.read)
    }

    fn sort_value(&self, field: JoinRequestSortField) -> SortValue {
        match field {
            JoinRequestSortField::CreatedAt => SortValue::Time(self.created_at),
            JoinRequestSortField::UpdatedAt => SortValue::Time(self.updated_at),
        }
    }
}

/// Join request collection bound to its namespace and capacity.
pub struct JoinRequestStore {
    store: EntityStore<JoinRequest>,
}

impl JoinRequestStore {
    pub const DEFAULT_CAPACITY: usize = 200;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: JoinRequestDraft) -> StoreResult<JoinRequest> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<JoinRequest> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: JoinRequestPatch) -> StoreResult<JoinRequest> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &JoinRequestFilter,
        sort: Option<SortSpec<JoinRequestSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<JoinRequest>> {
        self.store.filter(filter, sort, limit)
    }

    /// Pending requests awaiting review for an organization, oldest first.
    pub fn pending_for_organization(&self, organization_id: &str) -> StoreResult<Vec<JoinRequest>> {
        self.store.filter(
            &JoinRequestFilter {
                organization_id: Some(organization_id.to_string()),
                status: Some(JoinRequestStatus::Pending),
                ..Default::default()
            },
            Some(SortSpec::ascending(JoinRequestSortField::CreatedAt)),
            None,
        )
    }

    /// Mark one request read.
    pub fn mark_read(&self, id: &str) -> StoreResult<JoinRequest> {
        self.store.update(
            id,
            JoinRequestPatch {
                read: Some(true),
                ..Default::default()
            },
        )
    }

    /// Mark every unread request for an organization read. Returns how
    /// many were updated.
    pub fn mark_all_read(&self, organization_id: &str) -> StoreResult<usize> {
        let unread = self.store.filter(
            &JoinRequestFilter {
                organization_id: Some(organization_id.to_string()),
                read: Some(false),
                ..Default::default()
            },
            None,
            None,
        )?;
        for request in &unread {
            self.mark_read(&request.id)?;
        }
        Ok(unread.len())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substrate::MemorySubstrate;

    fn store() -> JoinRequestStore {
        JoinRequestStore::new(Arc::new(MemorySubstrate::new())).unwrap()
    }

    fn draft(org: &str, user: &str) -> JoinRequestDraft {
        JoinRequestDraft {
            organization_id: org.to_string(),
            user_id: user.to_string(),
            message: None,
        }
    }

    #[test]
    fn test_requests_start_pending_and_unread() {
        let store = store();
        let request = store.create(draft("org-1", "ana")).unwrap();
        assert_eq!(request.status, JoinRequestStatus::Pending);
        assert!(!request.read);
    }

    #[test]
    fn test_pending_for_organization_excludes_reviewed() {
        let store = store();
        let a = store.create(draft("org-1", "ana")).unwrap();
        store.create(draft("org-1", "bo")).unwrap();
        store.create(draft("org-2", "cy")).unwrap();

        store
            .update(
                &a.id,
                JoinRequestPatch {
                    status: Some(JoinRequestStatus::Approved),
                    ..Default::default()
                },
            )
            .unwrap();

        let pending = store.pending_for_organization("org-1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, "bo");
    }

    #[test]
    fn test_mark_all_read_scoped_to_organization() {
        let store = store();
        store.create(draft("org-1", "ana")).unwrap();
        store.create(draft("org-1", "bo")).unwrap();
        store.create(draft("org-2", "cy")).unwrap();

        assert_eq!(store.mark_all_read("org-1").unwrap(), 2);
        let still_unread = store
            .filter(
                &JoinRequestFilter {
                    read: Some(false),
                    ..Default::default()
                },
                None,
                None,
            )
            .unwrap();
        assert_eq!(still_unread.len(), 1);
        assert_eq!(still_unread[0].organization_id, "org-2");
    }

    #[test]
    fn test_create_requires_org_and_user() {
        let store = store();
        assert!(store.create(draft("", "ana")).is_err());
        assert!(store.create(draft("org-1", "")).is_err());
    }
}
