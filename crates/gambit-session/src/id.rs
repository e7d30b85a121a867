//! Session identifiers.

use std::fmt;

use rand::Rng;

/// An opaque, unique identifier for a session.
///
/// Uniqueness is only guaranteed among sessions registered at the same
/// time; the [`MatchMaker`](crate::MatchMaker) retries generation on a
/// collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random identifier: the decimal digits of a random
    /// 64-bit number.
    pub fn random() -> Self {
        let n: u64 = rand::rng().random();
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_decimal_digits() {
        let id = SessionId::random();
        assert!(!id.as_str().is_empty());
        assert!(id.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_display_is_the_raw_id() {
        assert_eq!(SessionId::new("0042").to_string(), "0042");
    }
}
