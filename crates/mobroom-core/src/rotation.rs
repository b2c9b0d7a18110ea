//! Driver/Navigator assignment.
//!
//! Roles are a pure function of the roster and a monotonically increasing
//! rotation index taken modulo the roster size.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::roster::{Member, Roster};

/// The pair of members holding roles for one rotation.
///
/// With a single member both roles point at the same person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Roles<'a> {
    pub driver: &'a Member,
    pub navigator: &'a Member,
}

impl Roles<'_> {
    pub fn detach(&self) -> OwnedRoles {
        OwnedRoles {
            driver: self.driver.clone(),
            navigator: self.navigator.clone(),
        }
    }
}

/// Detached copy of [`Roles`] for snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedRoles {
    pub driver: Member,
    pub navigator: Member,
}

/// Assign driver and navigator for `rotation_index`.
///
/// # Errors
/// `CoreError::EmptyRoster` when there is nobody to assign.
pub fn assign_roles(roster: &Roster, rotation_index: usize) -> Result<Roles<'_>> {
    let size = roster.size();
    if size == 0 {
        return Err(CoreError::EmptyRoster);
    }
    let members = roster.members();
    Ok(Roles {
        driver: &members[rotation_index % size],
        navigator: &members[(rotation_index + 1) % size],
    })
}
