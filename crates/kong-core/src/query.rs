//! Builder for admin API query strings.
//!
//! Collects `(key, value)` pairs so resource clients can hand `reqwest` a ready-made query
//! without repeating presence checks.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a string value unless it is empty.
    ///
    /// Kong treats `offset=` as a malformed cursor, so empty cursors must not be sent.
    pub fn push_non_empty(&mut self, key: &'static str, value: &str) {
        if !value.is_empty() {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;

    #[test]
    fn push_non_empty_skips_empty_value() {
        let mut params = QueryParams::new();
        params.push_non_empty("tags", "");
        assert!(params.into_pairs().is_empty());
    }

    #[test]
    fn push_non_empty_skips_empty_cursor() {
        let mut params = QueryParams::new();
        params.push_non_empty("offset", "");
        params.push("size", 100);
        assert_eq!(params.into_pairs(), vec![("size", "100".to_string())]);
    }

    #[test]
    fn pairs_keep_insertion_order() {
        let mut params = QueryParams::new();
        params.push_non_empty("offset", "WyJhYmMiXQ");
        params.push("size", 250u32);
        assert_eq!(
            params.into_pairs(),
            vec![
                ("offset", "WyJhYmMiXQ".to_string()),
                ("size", "250".to_string())
            ]
        );
    }
}
