//! Raw inbound query parameters.
//!
//! # Invariants
//! - The bag is immutable; overrides return a new bag.
//! - Pair order is preserved so echoed links stay stable.

use url::form_urlencoded;

/// Ordered, immutable bag of `key=value` query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Returns the value for `key`; the last occurrence wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns a copy with `key` set to `value`.
    ///
    /// An existing key keeps its position and collapses to the single new
    /// value; a new key is appended.
    pub fn with(&self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut pairs = Vec::with_capacity(self.pairs.len() + 1);
        let mut replaced = false;

        for (name, current) in &self.pairs {
            if name != key {
                pairs.push((name.clone(), current.clone()));
            } else if !replaced {
                pairs.push((name.clone(), value.clone()));
                replaced = true;
            }
        }
        if !replaced {
            pairs.push((key.to_string(), value));
        }

        Self { pairs }
    }

    /// Encodes the bag as a form-urlencoded query string (no leading `?`).
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
