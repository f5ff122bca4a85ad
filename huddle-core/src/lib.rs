//! Huddle Core - Entity Types
//!
//! Pure data structures with no behavior. Every record kind stored by the
//! local persistence layer is defined here, along with the shared error
//! taxonomy. Business logic (CRUD, eviction, domain helpers) lives in
//! huddle-store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Record identifier. Generated as a UUIDv7 string, so ids sort by
/// creation time lexicographically.
pub type RecordId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// Entity kind discriminator. One variant per locally persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Ticket,
    Comment,
    DirectMessage,
    Notification,
    JoinRequest,
    Channel,
    ChannelMessage,
    CollaborationRoom,
    GroupMessage,
    Organization,
    Department,
    Team,
}

impl EntityKind {
    /// Namespace key under which this kind's collection is persisted.
    /// Each kind owns exactly one key in the substrate.
    pub fn namespace(&self) -> &'static str {
        match self {
            EntityKind::Ticket => "huddle.tickets",
            EntityKind::Comment => "huddle.comments",
            EntityKind::DirectMessage => "huddle.direct_messages",
            EntityKind::Notification => "huddle.notifications",
            EntityKind::JoinRequest => "huddle.join_requests",
            EntityKind::Channel => "huddle.channels",
            EntityKind::ChannelMessage => "huddle.channel_messages",
            EntityKind::CollaborationRoom => "huddle.collaboration_rooms",
            EntityKind::GroupMessage => "huddle.group_messages",
            EntityKind::Organization => "huddle.organizations",
            EntityKind::Department => "huddle.departments",
            EntityKind::Team => "huddle.teams",
        }
    }
}

// ============================================================================
// DOMAIN ENUMS
// ============================================================================

/// Workflow status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// Priority of a ticket. Ordered low to high so priority sorts compare
/// by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Mention,
    Assignment,
    StatusChange,
    Membership,
    System,
}

/// Review state of an organization join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

// ============================================================================
// REACTIONS
// ============================================================================

/// One reaction group on a message: a symbol and the participants who
/// reacted with it. A group with no participants is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub symbol: String,
    pub participants: Vec<String>,
}

// ============================================================================
// ENTITY STRUCTS
// ============================================================================

/// Ticket - a tracked work item within an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: RecordId,
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub reporter: String,
    pub assignees: Vec<String>,
    pub tags: Vec<String>,
    pub department_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Comment on a ticket. Replies reference a parent comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: RecordId,
    pub ticket_id: String,
    pub author: String,
    pub body: String,
    pub parent_id: Option<RecordId>,
    pub mentions: Vec<String>,
    pub attachments: Vec<String>,
    pub edited: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Direct message between two users. `conversation_key` is derived from
/// the sorted participant pair so both directions share one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: RecordId,
    pub sender: String,
    pub recipient: String,
    pub conversation_key: String,
    pub body: String,
    pub read: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Notification delivered to a single recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: RecordId,
    pub recipient: String,
    pub kind: NotificationKind,
    pub body: String,
    pub read: bool,
    pub organization_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request by a user to join an organization. Reviewed by org admins,
/// so the owning organization is the read-state recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: RecordId,
    pub organization_id: String,
    pub user_id: String,
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    pub read: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Named messaging channel within an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: RecordId,
    pub organization_id: String,
    pub name: String,
    pub topic: Option<String>,
    pub members: Vec<String>,
    pub private: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Message posted to a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub id: RecordId,
    pub channel_id: String,
    pub sender: String,
    pub body: String,
    pub reactions: Vec<Reaction>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Ad-hoc collaboration room (group conversation outside channels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRoom {
    pub id: RecordId,
    pub organization_id: String,
    pub name: String,
    pub purpose: Option<String>,
    pub members: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Message posted to a collaboration room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMessage {
    pub id: RecordId,
    pub room_id: String,
    pub sender: String,
    pub body: String,
    pub reactions: Vec<Reaction>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Organization - top-level tenant. The role/permission evaluator is a
/// pure function over these records and lives outside this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: RecordId,
    /// Human-readable secondary identifier, unique by convention.
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
    pub members: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Department within an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: RecordId,
    pub organization_id: String,
    pub name: String,
    pub description: Option<String>,
    pub lead: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Team within an organization, optionally attached to a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: RecordId,
    pub organization_id: String,
    pub department_id: Option<String>,
    pub name: String,
    pub members: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Validation errors raised before a record is committed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for the common "required field missing" case.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::RequiredFieldMissing {
            field: field.into(),
        }
    }
}

/// Store layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Entity not found: {kind:?} with id {id}")]
    NotFound { kind: EntityKind, id: RecordId },

    #[error("Storage exhausted for {namespace}: substrate rejected the write after eviction retry")]
    StorageExhausted { namespace: String },

    #[error("Corrupt collection blob for {namespace}")]
    CorruptState { namespace: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_ticket() -> Ticket {
        let now = Utc::now();
        Ticket {
            id: "0192d0c8-0000-7000-8000-000000000001".to_string(),
            organization_id: "org-1".to_string(),
            title: "Broken login".to_string(),
            description: None,
            status: TicketStatus::Open,
            priority: TicketPriority::High,
            reporter: "ana".to_string(),
            assignees: vec!["bo".to_string()],
            tags: vec!["auth".to_string()],
            department_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_namespaces_are_distinct() {
        let kinds = [
            EntityKind::Ticket,
            EntityKind::Comment,
            EntityKind::DirectMessage,
            EntityKind::Notification,
            EntityKind::JoinRequest,
            EntityKind::Channel,
            EntityKind::ChannelMessage,
            EntityKind::CollaborationRoom,
            EntityKind::GroupMessage,
            EntityKind::Organization,
            EntityKind::Department,
            EntityKind::Team,
        ];
        let namespaces: std::collections::HashSet<_> =
            kinds.iter().map(|k| k.namespace()).collect();
        assert_eq!(namespaces.len(), kinds.len());
        assert!(namespaces.iter().all(|ns| ns.starts_with("huddle.")));
    }

    #[test]
    fn test_ticket_serde_round_trip() {
        let ticket = make_ticket();
        let json = serde_json::to_string(&ticket).unwrap();
        let back: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ticket);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TicketPriority::Urgent > TicketPriority::High);
        assert!(TicketPriority::High > TicketPriority::Medium);
        assert!(TicketPriority::Medium > TicketPriority::Low);
    }

    #[test]
    fn test_store_error_display_not_found() {
        let err = StoreError::NotFound {
            kind: EntityKind::Ticket,
            id: "missing".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("Ticket"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_store_error_display_storage_exhausted() {
        let err = StoreError::StorageExhausted {
            namespace: "huddle.tickets".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Storage exhausted"));
        assert!(msg.contains("huddle.tickets"));
    }

    #[test]
    fn test_validation_error_into_store_error() {
        let err = StoreError::from(ValidationError::required("organization_id"));
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(format!("{}", err).contains("organization_id"));
    }

    #[test]
    fn test_reaction_serde_round_trip() {
        let reaction = Reaction {
            symbol: "+1".to_string(),
            participants: vec!["u1".to_string(), "u2".to_string()],
        };
        let json = serde_json::to_string(&reaction).unwrap();
        let back: Reaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reaction);
    }
}
