//! Comment façade.
//!
//! Comments hang off tickets; replies reference a parent comment. On top
//! of generic CRUD this façade adds thread queries (`get_by_ticket`,
//! `get_replies`), mention lookup and per-ticket aggregate statistics.

use std::sync::Arc;

use huddle_core::{Comment, EntityKind, RecordId, StoreResult, Timestamp, ValidationError};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct CommentDraft {
    pub ticket_id: String,
    pub author: String,
    pub body: String,
    pub parent_id: Option<RecordId>,
    pub mentions: Vec<String>,
    pub attachments: Vec<String>,
}

/// Patching the body marks the comment edited.
#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
    pub body: Option<String>,
    pub mentions: Option<Vec<String>>,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub ticket_id: Option<String>,
    pub author: Option<String>,
    /// Equality on the parent reference: matches replies to this comment.
    pub parent_id: Option<RecordId>,
    /// Containment on the mentions list.
    pub mention: Option<String>,
    pub edited: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub enum CommentSortField {
    CreatedAt,
    UpdatedAt,
}

/// Aggregate counts over one ticket's comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentStats {
    pub total: usize,
    pub replies: usize,
    pub with_attachments: usize,
    pub with_mentions: usize,
    pub edited: usize,
}

impl Entity for Comment {
    type Draft = CommentDraft;
    type Patch = CommentPatch;
    type Filter = CommentFilter;
    type SortField = CommentSortField;

    fn kind() -> EntityKind {
        EntityKind::Comment
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

    fn build(id: RecordId, at: Timestamp, draft: CommentDraft) -> Result<Self, ValidationError> {
        if draft.ticket_id.trim().is_empty() {
            return Err(ValidationError::required("ticket_id"));
        }
        if draft.author.trim().is_empty() {
            return Err(ValidationError::required("author"));
        }
        Ok(Comment {
            id,
            ticket_id: draft.ticket_id,
            author: draft.author,
            body: draft.body,
            parent_id: draft.parent_id,
            mentions: draft.mentions,
            attachments: draft.attachments,
            edited: false,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: CommentPatch) {
        if let Some(body) = patch.body {
            self.body = body;
            self.edited = true;
        }
        if let Some(mentions) = patch.mentions {
            self.mentions = mentions;
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
    }

    fn matches(&self, filter: &CommentFilter) -> bool {
        filter.ticket_id.as_ref().map_or(true, |v| *v == self.ticket_id)
            && filter.author.as_ref().map_or(true, |v| *v == self.author)
            && filter
                .parent_id
                .as_ref()
                .map_or(true, |v| self.parent_id.as_deref() == Some(v.as_str()))
            && filter
                .mention
                .as_ref()
                .map_or(true, |v| self.mentions.contains(v))
            && filter.edited.map_or(true, |v| v == self.edited)
    }

    fn sort_value(&self, field: CommentSortField) -> SortValue {
        match field {
            CommentSortField::CreatedAt => SortValue::Time(self.created_at),
            CommentSortField::UpdatedAt => SortValue::Time(self.updated_at),
        }
    }
}

/// Comment collection bound to its namespace and capacity.
pub struct CommentStore {
    store: EntityStore<Comment>,
}

impl CommentStore {
    pub const DEFAULT_CAPACITY: usize = 800;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: CommentDraft) -> StoreResult<Comment> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<Comment> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: CommentPatch) -> StoreResult<Comment> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &CommentFilter,
        sort: Option<SortSpec<CommentSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Comment>> {
        self.store.filter(filter, sort, limit)
    }

    /// All comments on a ticket, oldest first.
    pub fn get_by_ticket(&self, ticket_id: &str) -> StoreResult<Vec<Comment>> {
        self.store.filter(
            &CommentFilter {
                ticket_id: Some(ticket_id.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(CommentSortField::CreatedAt)),
            None,
        )
    }

    /// Replies to one comment, oldest first.
    pub fn get_replies(&self, parent_id: &str) -> StoreResult<Vec<Comment>> {
        self.store.filter(
            &CommentFilter {
                parent_id: Some(parent_id.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(CommentSortField::CreatedAt)),
            None,
        )
    }

    /// Comments mentioning the given user, newest first.
    pub fn get_mentions(&self, user: &str) -> StoreResult<Vec<Comment>> {
        self.store.filter(
            &CommentFilter {
                mention: Some(user.to_string()),
                ..Default::default()
            },
            Some(SortSpec::descending(CommentSortField::CreatedAt)),
            None,
        )
    }

    /// Aggregate counts over one ticket's comments.
    pub fn stats_for_ticket(&self, ticket_id: &str) -> StoreResult<CommentStats> {
        let comments = self.get_by_ticket(ticket_id)?;
        Ok(CommentStats {
            total: comments.len(),
            replies: comments.iter().filter(|c| c.parent_id.is_some()).count(),
            with_attachments: comments.iter().filter(|c| !c.attachments.is_empty()).count(),
            with_mentions: comments.iter().filter(|c| !c.mentions.is_empty()).count(),
            edited: comments.iter().filter(|c| c.edited).count(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substrate::MemorySubstrate;

    fn store() -> CommentStore {
        CommentStore::new(Arc::new(MemorySubstrate::new())).unwrap()
    }

    fn draft(ticket_id: &str, body: &str) -> CommentDraft {
        CommentDraft {
            ticket_id: ticket_id.to_string(),
            author: "ana".to_string(),
            body: body.to_string(),
            parent_id: None,
            mentions: vec![],
            attachments: vec![],
        }
    }

    #[test]
    fn test_get_by_ticket_scopes_and_orders() {
        let store = store();
        store.create(draft("t-1", "first")).unwrap();
        store.create(draft("t-2", "elsewhere")).unwrap();
        store.create(draft("t-1", "second")).unwrap();

        let thread = store.get_by_ticket("t-1").unwrap();
        let bodies: Vec<&str> = thread.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[test]
    fn test_get_replies() {
        let store = store();
        let root = store.create(draft("t-1", "root")).unwrap();
        let mut reply = draft("t-1", "reply");
        reply.parent_id = Some(root.id.clone());
        store.create(reply).unwrap();
        store.create(draft("t-1", "sibling root")).unwrap();

        let replies = store.get_replies(&root.id).unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].body, "reply");
    }

    #[test]
    fn test_get_mentions_containment() {
        let store = store();
        let mut with_mention = draft("t-1", "ping");
        with_mention.mentions = vec!["bo".to_string(), "cy".to_string()];
        store.create(with_mention).unwrap();
        store.create(draft("t-1", "quiet")).unwrap();

        assert_eq!(store.get_mentions("bo").unwrap().len(), 1);
        assert_eq!(store.get_mentions("dee").unwrap().len(), 0);
    }

    #[test]
    fn test_body_patch_marks_edited() {
        let store = store();
        let comment = store.create(draft("t-1", "tpyo")).unwrap();
        assert!(!comment.edited);

        let fixed = store
            .update(
                &comment.id,
                CommentPatch {
                    body: Some("typo".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(fixed.edited);
        assert_eq!(fixed.body, "typo");
    }

    #[test]
    fn test_stats_for_ticket() {
        let store = store();
        let root = store.create(draft("t-1", "root")).unwrap();

        let mut reply = draft("t-1", "reply");
        reply.parent_id = Some(root.id.clone());
        reply.mentions = vec!["bo".to_string()];
        store.create(reply).unwrap();

        let mut attached = draft("t-1", "see file");
        attached.attachments = vec!["trace.log".to_string()];
        let attached = store.create(attached).unwrap();
        store
            .update(
                &attached.id,
                CommentPatch {
                    body: Some("see attached file".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        store.create(draft("t-other", "unrelated")).unwrap();

        let stats = store.stats_for_ticket("t-1").unwrap();
        assert_eq!(
            stats,
            CommentStats {
                total: 3,
                replies: 1,
                with_attachments: 1,
                with_mentions: 1,
                edited: 1,
            }
        );
    }

    #[test]
    fn test_create_requires_ticket_reference() {
        let store = store();
        assert!(store.create(draft("", "orphan")).is_err());
    }
}
