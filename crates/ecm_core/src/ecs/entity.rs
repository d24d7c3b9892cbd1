//! Entity handles
//!
//! Entities are plain 64-bit handles handed out by a monotonically
//! increasing counter. They are never destroyed or reused, so no
//! generation tag is needed.

use std::fmt;

/// Entity handle (opaque ID)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u64);

impl Entity {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u64 {
        self.0
    }

    /// Position of this entity's slot table inside the store.
    #[inline]
    pub(crate) fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
