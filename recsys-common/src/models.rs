//! Source platform models
//!
//! Users and learning objects are read-only inputs to a clustering run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source platform user identifier
pub type UserId = i64;

/// Learning object identifier
pub type ContentId = i64;

/// Social cluster identifier, sequential per run
pub type CanopyId = i64;

/// A feature dimension used by the distance measure (a subject name)
pub type Dimension = String;

/// User profile: weighted subject interests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    /// Subject name → interest weight
    #[serde(default)]
    pub subjects: BTreeMap<String, f64>,
}

impl UserProfile {
    /// Create a profile with no subject interests
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: None,
            subjects: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>, weight: f64) -> Self {
        self.subjects.insert(subject.into(), weight);
        self
    }

    /// Interest weight for `subject`, if the user declared it
    pub fn weight(&self, subject: &str) -> Option<f64> {
        self.subjects.get(subject).copied()
    }
}

/// Learning object associated with a user
///
/// Ranking compares learning objects by `visit_count` only; identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub owner_id: UserId,
    #[serde(default)]
    pub title: Option<String>,
    pub visit_count: i64,
}

impl ContentItem {
    pub fn new(id: ContentId, owner_id: UserId, visit_count: i64) -> Self {
        Self {
            id,
            owner_id,
            title: None,
            visit_count,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
