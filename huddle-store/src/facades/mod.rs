//! Entity façades.
//!
//! One module per entity kind. Each façade binds an [`crate::EntityStore`]
//! to its namespace and a tuned default capacity, and layers the handful
//! of domain queries that kind needs (conversation lookup, reaction
//! aggregation, membership and read-state helpers). Everything else -
//! errors, eviction, corruption recovery - is inherited from the engine
//! verbatim.

mod reactions;

pub mod channel_messages;
pub mod channels;
pub mod comments;
pub mod departments;
pub mod direct_messages;
pub mod group_messages;
pub mod join_requests;
pub mod notifications;
pub mod organizations;
pub mod rooms;
pub mod teams;
pub mod tickets;
