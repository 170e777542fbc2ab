//! Canonical in-memory graph.
//!
//! The graph owns every entity in an arena keyed by stable identifier.
//! Relationship edges (author, authored, favorites) are stored as identifier
//! lists on both endpoints, so traversal works in either direction without
//! reference cycles. Entities are never removed; reconciliation only adds edges
//! and corrects scalar fields.
//!
//! Edge mutation goes through [`Graph`] so that both directions of an edge are
//! always written together.

use indexmap::IndexMap;

use crate::ids::{BlueprintId, UserId};
use crate::wire::Timestamp;

/// Image metadata embedded in exactly one blueprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub deletehash: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub id: BlueprintId,
    pub title: Option<String>,
    pub blueprint_string: Option<String>,
    pub description_markdown: Option<String>,
    /// Insertion-ordered; duplicates are tolerated.
    pub tags: Vec<String>,
    pub image: Image,
    pub image_url: Option<String>,
    pub created_date: Option<Timestamp>,
    pub last_updated_date: Option<Timestamp>,
    /// Redundant with `favorites().len()`; corrected by the summary pass.
    pub number_of_favorites: u64,
    pub file_name: Option<String>,
    author: Option<UserId>,
    favorites: Vec<UserId>,
}

impl Blueprint {
    /// A blueprint with no author and no favorites yet.
    pub fn new(id: BlueprintId) -> Self {
        Self {
            id,
            title: None,
            blueprint_string: None,
            description_markdown: None,
            tags: Vec::new(),
            image: Image::default(),
            image_url: None,
            created_date: None,
            last_updated_date: None,
            number_of_favorites: 0,
            file_name: None,
            author: None,
            favorites: Vec::new(),
        }
    }

    pub fn author(&self) -> Option<&UserId> {
        self.author.as_ref()
    }

    /// Favoriting users in discovery order.
    pub fn favorites(&self) -> &[UserId] {
        &self.favorites
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub display_name: Option<String>,
    pub provider_display_name: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub photo_url: Option<String>,
    pub provider_id: Option<String>,
    authored: Vec<BlueprintId>,
    favorites: Vec<BlueprintId>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            display_name: None,
            provider_display_name: None,
            email: None,
            email_verified: None,
            photo_url: None,
            provider_id: None,
            authored: Vec::new(),
            favorites: Vec::new(),
        }
    }

    pub fn authored(&self) -> &[BlueprintId] {
        &self.authored
    }

    pub fn favorites(&self) -> &[BlueprintId] {
        &self.favorites
    }

    /// Best label for log lines.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.provider_display_name.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

/// Listing projection of a blueprint. Always derived, never authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintSummary {
    pub blueprint: BlueprintId,
    pub title: Option<String>,
    pub image_id: Option<String>,
    pub image_type: Option<String>,
    pub number_of_favorites: u64,
    pub last_updated_date: Timestamp,
}

/// Operator-only fields kept out of public listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintPrivates {
    pub file_name: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail: Option<String>,
    pub deletehash: Option<String>,
}

/// Arena of canonical entities.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    blueprints: IndexMap<BlueprintId, Blueprint>,
    users: IndexMap<UserId, User>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_blueprint(&mut self, blueprint: Blueprint) {
        self.blueprints.insert(blueprint.id.clone(), blueprint);
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn blueprint(&self, id: &str) -> Option<&Blueprint> {
        self.blueprints.get(id)
    }

    pub fn blueprint_mut(&mut self, id: &str) -> Option<&mut Blueprint> {
        self.blueprints.get_mut(id)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn contains_blueprint(&self, id: &str) -> bool {
        self.blueprints.contains_key(id)
    }

    pub fn contains_user(&self, id: &str) -> bool {
        self.users.contains_key(id)
    }

    /// Blueprints in insertion order.
    pub fn blueprints(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.values()
    }

    pub fn blueprints_mut(&mut self) -> impl Iterator<Item = &mut Blueprint> {
        self.blueprints.values_mut()
    }

    /// Users in insertion order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn blueprint_count(&self) -> usize {
        self.blueprints.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Bind `user` as the author of `blueprint` and append the blueprint to
    /// the user's authored list.
    ///
    /// Returns false when either endpoint is missing or the blueprint already
    /// has an author; an existing binding is never replaced.
    pub fn bind_author(&mut self, blueprint: &BlueprintId, user: &UserId) -> bool {
        if !self.users.contains_key(user) {
            return false;
        }
        let Some(bp) = self.blueprints.get_mut(blueprint) else {
            return false;
        };
        if bp.author.is_some() {
            return false;
        }
        bp.author = Some(user.clone());

        if let Some(u) = self.users.get_mut(user) {
            u.authored.push(blueprint.clone());
        }
        true
    }

    /// Add the favorite edge in both directions.
    ///
    /// Returns false when either endpoint is missing or the edge already
    /// exists.
    pub fn add_favorite(&mut self, blueprint: &BlueprintId, user: &UserId) -> bool {
        if !self.users.contains_key(user) {
            return false;
        }
        let Some(bp) = self.blueprints.get_mut(blueprint) else {
            return false;
        };
        if bp.favorites.contains(user) {
            return false;
        }
        bp.favorites.push(user.clone());

        if let Some(u) = self.users.get_mut(user) {
            if !u.favorites.contains(blueprint) {
                u.favorites.push(blueprint.clone());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> Graph {
        let mut g = Graph::new();
        g.insert_blueprint(Blueprint::new(BlueprintId::from("bp1")));
        g.insert_user(User::new(UserId::from("u1")));
        g.insert_user(User::new(UserId::from("u2")));
        g
    }

    #[test]
    fn bind_author_is_write_once() {
        let mut g = graph();
        assert!(g.bind_author(&"bp1".into(), &"u1".into()));
        assert!(!g.bind_author(&"bp1".into(), &"u2".into()));
        assert!(!g.bind_author(&"bp1".into(), &"u1".into()));

        assert_eq!(g.blueprint("bp1").unwrap().author().unwrap().as_str(), "u1");
        assert_eq!(g.user("u1").unwrap().authored().len(), 1);
        assert!(g.user("u2").unwrap().authored().is_empty());
    }

    #[test]
    fn add_favorite_links_both_directions_once() {
        let mut g = graph();
        assert!(g.add_favorite(&"bp1".into(), &"u2".into()));
        assert!(!g.add_favorite(&"bp1".into(), &"u2".into()));

        assert_eq!(g.blueprint("bp1").unwrap().favorites(), &[UserId::from("u2")]);
        assert_eq!(g.user("u2").unwrap().favorites(), &[BlueprintId::from("bp1")]);
    }

    #[test]
    fn missing_endpoints_are_rejected() {
        let mut g = graph();
        assert!(!g.add_favorite(&"nope".into(), &"u1".into()));
        assert!(!g.add_favorite(&"bp1".into(), &"ghost".into()));
        assert!(!g.bind_author(&"bp1".into(), &"ghost".into()));
        assert!(g.blueprint("bp1").unwrap().author().is_none());
    }

    #[test]
    fn new_user_has_empty_profile_and_edges() {
        let u = User::new(UserId::from("u1"));
        assert_eq!(u.id.as_str(), "u1");
        assert!(u.display_name.is_none());
        assert!(u.email.is_none());
        assert!(u.email_verified.is_none());
        assert!(u.authored().is_empty());
        assert!(u.favorites().is_empty());
    }

    #[test]
    fn user_label_prefers_display_name() {
        let mut u = User::new(UserId::from("u1"));
        assert_eq!(u.label(), "u1");
        u.provider_display_name = Some("Provider".to_string());
        assert_eq!(u.label(), "Provider");
        u.display_name = Some("Alice".to_string());
        assert_eq!(u.label(), "Alice");
    }
}
