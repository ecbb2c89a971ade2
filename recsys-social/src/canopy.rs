//! Social cluster entity

use recsys_common::{CanopyId, UserId, UserProfile};
use serde::{Deserialize, Serialize};

/// One social cluster produced by canopy clustering
///
/// `members` always starts with the center and keeps insertion order. A user
/// may be a member of several canopies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canopy {
    pub id: CanopyId,
    pub center: UserProfile,
    pub members: Vec<UserProfile>,
}

impl Canopy {
    /// New canopy seeded by `center`, which is its first member
    pub fn new(id: CanopyId, center: UserProfile) -> Self {
        Self {
            id,
            members: vec![center.clone()],
            center,
        }
    }

    /// Rebuild a stored canopy
    pub fn from_parts(id: CanopyId, center: UserProfile, members: Vec<UserProfile>) -> Self {
        Self { id, center, members }
    }

    pub fn add_member(&mut self, profile: UserProfile) {
        self.members.push(profile);
    }

    pub fn member_ids(&self) -> Vec<UserId> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.id == user_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
