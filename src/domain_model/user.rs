use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Stable id for a username, so a seeded directory survives restarts.
    pub fn for_username(username: &str) -> Self {
        UserId(uuid::Uuid::new_v5(
            &uuid::Uuid::NAMESPACE_OID,
            username.as_bytes(),
        ))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// Unordered pair of users. Both argument orders build the same value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct UserPair(UserId, UserId);

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn low(&self) -> UserId {
        self.0
    }

    pub fn high(&self) -> UserId {
        self.1
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.0 == user || self.1 == user
    }

    /// The member of the pair that is not `user`, if `user` is a member.
    pub fn other(&self, user: UserId) -> Option<UserId> {
        if self.0 == user {
            Some(self.1)
        } else if self.1 == user {
            Some(self.0)
        } else {
            None
        }
    }
}

impl fmt::Display for UserPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_order_independent() {
        let a = UserId::for_username("alice");
        let b = UserId::for_username("bob");

        assert_eq!(UserPair::new(a, b), UserPair::new(b, a));
        assert!(UserPair::new(a, b).low() <= UserPair::new(a, b).high());
    }

    #[test]
    fn low_and_high_are_the_ordered_members() {
        let a = UserId::for_username("alice");
        let b = UserId::for_username("bob");
        let pair = UserPair::new(b, a);

        let (low, high) = (pair.low(), pair.high());

        assert_eq!(low, a.min(b));
        assert_eq!(high, a.max(b));
        assert_ne!(low, high);
    }

    #[test]
    fn other_returns_the_opposite_member() {
        let a = UserId::for_username("alice");
        let b = UserId::for_username("bob");
        let c = UserId::for_username("carol");
        let pair = UserPair::new(a, b);

        assert_eq!(pair.other(a), Some(b));
        assert_eq!(pair.other(b), Some(a));
        assert_eq!(pair.other(c), None);
        assert!(!pair.contains(c));
    }

    #[test]
    fn username_ids_are_deterministic() {
        assert_eq!(UserId::for_username("alice"), UserId::for_username("alice"));
        assert_ne!(UserId::for_username("alice"), UserId::for_username("Alice"));
    }
}
