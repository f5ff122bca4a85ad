//! Organization façade. The top of the entity hierarchy; departments,
//! teams, channels, and rooms all hang off an organization id.

use std::sync::Arc;

use huddle_core::{
    EntityKind, Organization, RecordId, StoreError, StoreResult, Timestamp, ValidationError,
};

use crate::engine::{EntityStore, StoreConfig};
use crate::entity::Entity;
use crate::query::{SortSpec, SortValue};
use crate::substrate::Substrate;

#[derive(Debug, Clone)]
pub struct OrganizationDraft {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationFilter {
    /// Match any organization whose id is in this set.
    pub ids: Option<Vec<String>>,
    pub slug: Option<String>,
    pub owner: Option<String>,
    /// Containment on the members list.
    pub member: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum OrganizationSortField {
    CreatedAt,
    Name,
}

impl Entity for Organization {
    type Draft = OrganizationDraft;
    type Patch = OrganizationPatch;
    type Filter = OrganizationFilter;
    type SortField = OrganizationSortField;

    fn kind() -> EntityKind {
        EntityKind::Organization
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

    fn build(id: RecordId, at: Timestamp, draft: OrganizationDraft) -> Result<Self, ValidationError> {
        if draft.slug.trim().is_empty() {
            return Err(ValidationError::required("slug"));
        }
        if draft.name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        if draft.owner.trim().is_empty() {
            return Err(ValidationError::required("owner"));
        }
        // The owner is a member from the start.
        let members = vec![draft.owner.clone()];
        Ok(Organization {
            id,
            slug: draft.slug,
            name: draft.name,
            description: draft.description,
            owner: draft.owner,
            members,
            created_at: at,
            updated_at: at,
        })
    }

    fn apply(&mut self, patch: OrganizationPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(owner) = patch.owner {
            self.owner = owner;
        }
        if let Some(members) = patch.members {
            self.members = members;
        }
    }

    fn matches(&self, filter: &OrganizationFilter) -> bool {
        filter.ids.as_ref().map_or(true, |v| v.contains(&self.id))
            && filter.slug.as_ref().map_or(true, |v| *v == self.slug)
            && filter.owner.as_ref().map_or(true, |v| *v == self.owner)
            && filter
                .member
                .as_ref()
                .map_or(true, |v| self.members.contains(v))
    }

    fn sort_value(&self, field: OrganizationSortField) -> SortValue {
        match field {
            OrganizationSortField::CreatedAt => SortValue::Time(self.created_at),
            OrganizationSortField::Name => SortValue::Text(self.name.clone()),
        }
    }
}

/// Organization collection bound to its namespace and capacity.
pub struct OrganizationStore {
    store: EntityStore<Organization>,
}

impl OrganizationStore {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new(substrate: Arc<dyn Substrate>) -> StoreResult<Self> {
        Self::with_config(substrate, StoreConfig::with_capacity(Self::DEFAULT_CAPACITY))
    }

    pub fn with_config(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: EntityStore::new(substrate, config)?,
        })
    }

    pub fn create(&self, draft: OrganizationDraft) -> StoreResult<Organization> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> StoreResult<Organization> {
        self.store.get(id)
    }

    pub fn update(&self, id: &str, patch: OrganizationPatch) -> StoreResult<Organization> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    pub fn filter(
        &self,
        filter: &OrganizationFilter,
        sort: Option<SortSpec<OrganizationSortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Organization>> {
        self.store.filter(filter, sort, limit)
    }

    /// Exact lookup by slug.
    pub fn find_by_slug(&self, slug: &str) -> StoreResult<Organization> {
        let mut hits = self.store.filter(
            &OrganizationFilter {
                slug: Some(slug.to_string()),
                ..Default::default()
            },
            None,
            Some(1),
        )?;
        hits.pop().ok_or_else(|| StoreError::NotFound {
            kind: EntityKind::Organization,
            id: slug.to_string(),
        })
    }

    /// Organizations a user belongs to, by name.
    pub fn for_member(&self, member: &str) -> StoreResult<Vec<Organization>> {
        self.store.filter(
            &OrganizationFilter {
                member: Some(member.to_string()),
                ..Default::default()
            },
            Some(SortSpec::ascending(OrganizationSortField::Name)),
            None,
        )
    }

    /// Add a member; adding a present member is a no-op.
    pub fn add_member(&self, id: &str, member: &str) -> StoreResult<Organization> {
        let org = self.store.get(id)?;
        if org.members.iter().any(|m| m == member) {
            return Ok(org);
        }
        let mut members = org.members;
        members.push(member.to_string());
        self.store.update(
            id,
            OrganizationPatch {
                members: Some(members),
                ..Default::default()
            },
        )
    }

    /// Remove a member; removing an absent member is a no-op.
    pub fn remove_member(&self, id: &str, member: &str) -> StoreResult<Organization> {
        let org = self.store.get(id)?;
        if !org.members.iter().any(|m| m == member) {
            return Ok(org);
        }
        let mut members = org.members;
        members.retain(|m| m != member);
        self.store.update(
            id,
            OrganizationPatch {
                members: Some(members),
                ..Default::default()
            },
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substrate::MemorySubstrate;

    fn store() -> OrganizationStore {
        OrganizationStore::new(Arc::new(MemorySubstrate::new())).unwrap()
    }

    fn draft(slug: &str) -> OrganizationDraft {
        OrganizationDraft {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            description: None,
            owner: "ana".to_string(),
        }
    }

    #[test]
    fn test_owner_is_initial_member() {
        let store = store();
        let org = store.create(draft("acme")).unwrap();
        assert_eq!(org.members, vec!["ana"]);
    }

    #[test]
    fn test_find_by_slug() {
        let store = store();
        store.create(draft("acme")).unwrap();
        store.create(draft("globex")).unwrap();

        let found = store.find_by_slug("globex").unwrap();
        assert_eq!(found.name, "GLOBEX");
        assert!(store.find_by_slug("initech").is_err());
    }

    #[test]
    fn test_filter_by_id_set() {
        let store = store();
        let a = store.create(draft("acme")).unwrap();
        store.create(draft("globex")).unwrap();
        let c = store.create(draft("initech")).unwrap();

        let hits = store
            .filter(
                &OrganizationFilter {
                    ids: Some(vec![a.id.clone(), c.id.clone()]),
                    ..Default::default()
                },
                None,
                None,
            )
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_membership_helpers() {
        let store = store();
        let org = store.create(draft("acme")).unwrap();
        let grown = store.add_member(&org.id, "bo").unwrap();
        assert_eq!(grown.members, vec!["ana", "bo"]);

        let unchanged = store.add_member(&org.id, "bo").unwrap();
        assert_eq!(unchanged.updated_at, grown.updated_at);

        let shrunk = store.remove_member(&org.id, "bo").unwrap();
        assert_eq!(shrunk.members, vec!["ana"]);
    }

    #[test]
    fn test_create_requires_slug_name_owner() {
        let store = store();
        let mut no_slug = draft("acme");
        no_slug.slug = " ".to_string();
        assert!(store.create(no_slug).is_err());
        let mut no_owner = draft("acme");
        no_owner.owner = String::new();
        assert!(store.create(no_owner).is_err());
    }
}
