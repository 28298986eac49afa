//! Multi-valued header maps and their redaction.

use std::borrow::Cow;

use serde::{Serialize, Serializer, ser::SerializeMap};

use super::keys::{REDACTED_PLACEHOLDER, RedactKeys};

/// Ordered, case-preserving, multi-valued header collection.
///
/// Each name appears once; lookups and [`HeaderMap::append`] compare names
/// case-insensitively and keep the casing of the first insertion. Serializes as
/// a JSON object from name to the list of values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Adds a value, keeping any values already stored under `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1.push(value.into()),
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    /// Replaces every value stored under `name` with `value`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1 = vec![value.into()],
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.position(name)
            .map(|index| self.entries[index].1.as_slice())
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl Serialize for HeaderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Redacts matching header names.
///
/// A matching header keeps its name and position but its values collapse to a
/// single placeholder. With an empty key set the input is returned borrowed.
///
/// ```rust
/// use smartlog::{HeaderMap, RedactKeys, redact_headers};
///
/// let headers: HeaderMap = [
///     ("Authorization", "Bearer x"),
///     ("Content-Type", "application/json"),
/// ]
/// .into_iter()
/// .collect();
/// let redacted = redact_headers(&headers, &RedactKeys::new(["authorization"]));
/// assert_eq!(redacted.get("Authorization"), Some("[REDACTED]"));
/// assert_eq!(redacted.get("Content-Type"), Some("application/json"));
/// ```
pub fn redact_headers<'a>(headers: &'a HeaderMap, keys: &RedactKeys) -> Cow<'a, HeaderMap> {
    if keys.is_empty() {
        return Cow::Borrowed(headers);
    }
    let entries = headers
        .entries
        .iter()
        .map(|(name, values)| {
            if keys.matches(name) {
                (name.clone(), vec![REDACTED_PLACEHOLDER.to_string()])
            } else {
                (name.clone(), values.clone())
            }
        })
        .collect();
    Cow::Owned(HeaderMap { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append("Authorization", "Bearer x");
        headers.append("Content-Type", "application/json");
        headers.append("X-Api-Key", "k1");
        headers.append("x-api-key", "k2");
        headers
    }

    #[test]
    fn append_groups_values_case_insensitively() {
        let headers = sample();
        assert_eq!(headers.len(), 3);
        assert_eq!(
            headers.get_all("X-API-KEY"),
            Some(&["k1".to_string(), "k2".to_string()][..])
        );
        assert_eq!(headers.iter().nth(2).map(|(name, _)| name), Some("X-Api-Key"));
    }

    #[test]
    fn insert_replaces_values() {
        let mut headers = sample();
        headers.insert("x-api-key", "k3");
        assert_eq!(headers.get_all("X-Api-Key"), Some(&["k3".to_string()][..]));
    }

    #[test]
    fn matching_header_collapses_to_one_placeholder() {
        let headers = sample();
        let redacted = redact_headers(&headers, &RedactKeys::new(["X-API-KEY"]));
        assert_eq!(
            redacted.get_all("x-api-key"),
            Some(&[REDACTED_PLACEHOLDER.to_string()][..])
        );
        assert_eq!(redacted.get("Authorization"), Some("Bearer x"));
    }

    #[test]
    fn order_and_casing_survive_redaction() {
        let headers = sample();
        let redacted = redact_headers(&headers, &RedactKeys::new(["authorization"]));
        let names: Vec<_> = redacted.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Authorization", "Content-Type", "X-Api-Key"]);
    }

    #[test]
    fn empty_key_set_borrows_input() {
        let headers = sample();
        let redacted = redact_headers(&headers, &RedactKeys::empty());
        assert!(matches!(redacted, Cow::Borrowed(r) if std::ptr::eq(r, &headers)));
    }

    #[test]
    fn serializes_as_object_of_lists() {
        let mut headers = HeaderMap::new();
        headers.append("Accept", "a");
        headers.append("Accept", "b");
        assert_eq!(
            serde_json::to_string(&headers).unwrap(),
            r#"{"Accept":["a","b"]}"#
        );
    }
}
