//! The configured set of key names whose values are hidden.

use std::collections::HashSet;

/// Placeholder written in place of every redacted value.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Case-insensitive set of field and header names to redact.
///
/// Names are lower-cased once, when the set is built, so matching a key costs a
/// single lower-casing of the candidate. The same set drives body and header
/// redaction, which keeps a secret hidden wherever it shows up.
///
/// ```rust
/// use smartlog::RedactKeys;
///
/// let keys = RedactKeys::new(["Authorization", "password"]);
/// assert!(keys.matches("authorization"));
/// assert!(keys.matches("PASSWORD"));
/// assert!(!keys.matches("user"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedactKeys {
    normalized: HashSet<String>,
}

impl RedactKeys {
    /// Builds a key set from configured names.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            normalized: keys
                .into_iter()
                .map(|key| key.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// An empty set. Every redaction with it is the identity transform.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    /// Returns `true` when `key` names a redacted field, ignoring case.
    pub fn matches(&self, key: &str) -> bool {
        !self.normalized.is_empty() && self.normalized.contains(&key.to_lowercase())
    }
}

impl<S: AsRef<str>> FromIterator<S> for RedactKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_configured_names_once() {
        let keys = RedactKeys::new(["Password", "PASSWORD", "password"]);
        assert_eq!(keys.len(), 1);
        assert!(keys.matches("pAsSwOrD"));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let keys = RedactKeys::empty();
        assert!(keys.is_empty());
        assert!(!keys.matches(""));
        assert!(!keys.matches("password"));
    }

    #[test]
    fn matches_whole_names_only() {
        let keys: RedactKeys = ["token"].into_iter().collect();
        assert!(keys.matches("Token"));
        assert!(!keys.matches("access_token"));
        assert!(!keys.matches("tok"));
    }
}
