mod memory;

pub use memory::MemoryStore;

use crate::model::profile::UserProfile;

/// Result of a version-checked profile save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored; carries the profile with its bumped version.
    Saved(UserProfile),
    /// Another writer saved first; re-read and retry.
    Conflict,
}
