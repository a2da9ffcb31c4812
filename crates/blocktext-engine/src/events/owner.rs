use std::fmt;

use uuid::Uuid;

/// Identity under which listeners are registered and later released together.
///
/// Each call to [`OwnerId::new`] mints a distinct identity, so two owners are
/// never confused even when the objects holding them look alike.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(Uuid);

impl OwnerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owners_are_distinct() {
        let a = OwnerId::new();
        let b = OwnerId::new();
        assert_ne!(a, b);
    }
}
