//! Convenience builder for HTTP query parameters.
//!
//! This module provides a lightweight helper for constructing URL query pairs,
//! reducing boilerplate in resource clients.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Create a builder holding the API's `fields` selector.
    ///
    /// The API only embeds nested objects named in `fields`, so list and get
    /// calls for composite resources pass the set they need.
    #[must_use]
    pub fn fields(fields: &[&str]) -> Self {
        let mut params = Self::new();
        params.push("fields", fields.join(","));
        params
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Borrow the collected key/value pairs.
    #[must_use]
    pub fn as_pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;

    #[test]
    fn new_is_empty() {
        assert!(QueryParams::new().is_empty());
        assert!(!QueryParams::fields(&["ip"]).is_empty());
    }

    #[test]
    fn fields_joins_with_commas() {
        let params = QueryParams::fields(&["ssh_key", "user"]);
        assert_eq!(
            params.into_pairs(),
            vec![("fields", "ssh_key,user".to_string())]
        );
    }
}
