//! Huddle Store - Local Entity Persistence
//!
//! A bounded, client-resident persistence layer for huddle entities.
//! One generic engine ([`EntityStore`]) provides create/get/filter/update/
//! delete over a namespaced collection, with capacity tracking and oldest-
//! first eviction; twelve façades bind the engine to the concrete entity
//! kinds and add their domain helpers.
//!
//! # Design Philosophy
//!
//! This layer is a cache with CRUD semantics, not a system of record.
//! Collections persist as whole JSON blobs in a shared, size-bounded
//! key-value substrate; every mutation rewrites its collection's blob.
//! When a collection crosses its high-water mark the oldest records are
//! silently evicted down to the low-water mark. Unreadable blobs are
//! treated as empty collections ("fail open") so a corrupt cache never
//! takes the application down with it.

pub mod engine;
pub mod entity;
pub mod facades;
pub mod id;
pub mod query;
pub mod quota;
pub mod substrate;

pub use engine::{EntityStore, StoreConfig};
pub use entity::Entity;
pub use id::IdGenerator;
pub use query::{Direction, SortSpec, SortValue};
pub use quota::QuotaGuard;
pub use substrate::{MemorySubstrate, Substrate, SubstrateError};

pub use facades::channel_messages::ChannelMessageStore;
pub use facades::channels::ChannelStore;
pub use facades::comments::CommentStore;
pub use facades::departments::DepartmentStore;
pub use facades::direct_messages::DirectMessageStore;
pub use facades::group_messages::GroupMessageStore;
pub use facades::join_requests::JoinRequestStore;
pub use facades::notifications::NotificationStore;
pub use facades::organizations::OrganizationStore;
pub use facades::rooms::CollaborationRoomStore;
pub use facades::teams::TeamStore;
pub use facades::tickets::TicketStore;
