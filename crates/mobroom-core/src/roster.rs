//! Ordered roster of session participants.
//!
//! Insertion order is rotation order. Members are addressed by an opaque id
//! so that removing one never shifts another member's identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result, ValidationError};

/// Unique identifier for a roster member.
pub type MemberId = String;

/// A participant in the mob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// Display name, trimmed and never empty.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from a list of names, in order.
    ///
    /// # Errors
    /// Returns a validation error on the first blank name.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::new();
        for name in names {
            roster.add_member(name.as_ref())?;
        }
        Ok(roster)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn get(&self, position: usize) -> Option<&Member> {
        self.members.get(position)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.members.iter().position(|m| m.id == id)
    }

    /// First member whose name matches case-insensitively.
    pub fn find_by_name(&self, name: &str) -> Option<&Member> {
        let name = name.trim();
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a member with a freshly generated id.
    ///
    /// # Errors
    /// `ValidationError::EmptyName` if `name` is blank after trimming; the
    /// roster is left unchanged.
    pub fn add_member(&mut self, name: &str) -> Result<&Member> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let mut id = Uuid::new_v4().to_string();
        while self.position_of(&id).is_some() {
            id = Uuid::new_v4().to_string();
        }

        self.members.push(Member {
            id,
            name: name.to_string(),
        });
        let last = self.members.len() - 1;
        Ok(&self.members[last])
    }

    /// Remove a member by id and return the removed member with the
    /// position it occupied.
    ///
    /// # Errors
    /// `CoreError::NotFound` if no member has `id`.
    pub fn remove_member(&mut self, id: &str) -> Result<(usize, Member)> {
        let position = self
            .position_of(id)
            .ok_or_else(|| CoreError::member_not_found(id))?;
        let member = self.members.remove(position);
        Ok((position, member))
    }
}
