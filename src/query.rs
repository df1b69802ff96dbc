//! Query-string construction for list endpoints.
//!
//! Filters are an ordered key/value list. Absent and empty values are
//! omitted entirely so they never reach the wire, and booleans serialize
//! as `"true"`/`"false"` (the backend reads query strings as text).

/// Ordered query parameters for a list request.
///
/// Compares by value: two filter sets built from the same inputs are equal,
/// which is what drives reload-on-change in [`crate::fetch::FetchHandle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pairs: Vec<(String, String)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Empty values are dropped.
    pub fn with(mut self, key: &str, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// Append a parameter only when a value is present.
    pub fn with_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value.to_string()),
            None => self,
        }
    }

    /// Append a boolean parameter as `"true"`/`"false"`.
    pub fn with_flag(self, key: &str, value: bool) -> Self {
        self.with(key, if value { "true" } else { "false" })
    }

    /// Append a boolean parameter only when a value is present.
    pub fn with_opt_flag(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(value) => self.with_flag(key, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
