//! Local resource state
//!
//! [`ResourceData`] holds the declared configuration of one resource instance
//! together with its stored identifier. Handlers read declared attributes from
//! it and project remote fields back into it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// No value (null).
    Null,
    /// A boolean value.
    Bool(bool),
    /// A single string value.
    String(String),
    /// An ordered list of strings.
    List(Vec<String>),
    /// An unordered set of strings.
    Set(BTreeSet<String>),
}

impl AttributeValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Get as a string if this is a single string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get every string held by this value.
    pub fn as_strings(&self) -> Vec<&str> {
        match self {
            AttributeValue::String(s) => vec![s.as_str()],
            AttributeValue::List(items) => items.iter().map(String::as_str).collect(),
            AttributeValue::Set(items) => items.iter().map(String::as_str).collect(),
            AttributeValue::Null | AttributeValue::Bool(_) => Vec::new(),
        }
    }

    /// Check whether the value carries nothing (null, empty string or empty collection).
    pub fn is_empty(&self) -> bool {
        match self {
            AttributeValue::Null => true,
            AttributeValue::Bool(_) => false,
            AttributeValue::String(s) => s.is_empty(),
            AttributeValue::List(items) => items.is_empty(),
            AttributeValue::Set(items) => items.is_empty(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(items: Vec<String>) -> Self {
        AttributeValue::List(items)
    }
}

impl From<BTreeSet<String>> for AttributeValue {
    fn from(items: BTreeSet<String>) -> Self {
        AttributeValue::Set(items)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

/// State of one resource instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Stored identifier. `None` means the resource is not in state.
    id: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, AttributeValue>,
}

impl ResourceData {
    /// Create empty state with no identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state for an existing remote object.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// Returns the stored identifier.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the stored identifier or an error if the resource has none.
    pub fn require_id(&self) -> ProviderResult<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| ProviderError::invalid_id("", "resource has no stored identifier"))
    }

    /// Commit the identifier of the remote object.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Clear the identifier, signalling the resource should leave state.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Set an attribute value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Set an attribute using builder pattern.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set an unordered string set attribute.
    pub fn set_set<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        self.set(name, AttributeValue::Set(set));
    }

    /// Set an ordered string list attribute.
    pub fn set_list<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = values.into_iter().map(Into::into).collect();
        self.set(name, AttributeValue::List(list));
    }

    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get a single-valued string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_str)
    }

    /// Get a required, non-empty string attribute.
    pub fn require_str(&self, name: &str) -> ProviderResult<&str> {
        self.get_str(name)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::validation(name, "a value is required"))
    }

    /// Get a string collection as a set. Missing or null yields an empty set.
    pub fn get_set(&self, name: &str) -> BTreeSet<String> {
        self.get(name)
            .map(|v| v.as_strings().into_iter().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Get a string collection as a list. Missing or null yields an empty list.
    pub fn get_list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|v| v.as_strings().into_iter().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Remove an attribute.
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.attributes.remove(name)
    }

    /// Iterate over all attributes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.attributes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_is_order_independent() {
        let mut a = ResourceData::new();
        a.set_set("identifier_uris", ["https://y", "api://x"]);
        let mut b = ResourceData::new();
        b.set_set("identifier_uris", ["api://x", "https://y", "api://x"]);

        assert_eq!(a, b);
        assert_eq!(a.get_set("identifier_uris").len(), 2);
    }

    #[test]
    fn test_missing_collections_are_empty() {
        let data = ResourceData::with_id("abc");
        assert!(data.get_set("identifier_uris").is_empty());
        assert!(data.get_list("audiences").is_empty());
        assert_eq!(data.id(), Some("abc"));
    }

    #[test]
    fn test_require_str() {
        let data = ResourceData::new()
            .with("display_name", "")
            .with("issuer", "https://token.actions.githubusercontent.com");

        assert!(data.require_str("display_name").is_err());
        assert!(data.require_str("subject").is_err());
        assert_eq!(
            data.require_str("issuer").unwrap(),
            "https://token.actions.githubusercontent.com"
        );
    }

    #[test]
    fn test_clear_id() {
        let mut data = ResourceData::with_id("abc");
        assert!(data.require_id().is_ok());
        data.clear_id();
        assert!(data.id().is_none());
        assert!(data.require_id().is_err());
    }

    #[test]
    fn test_state_json_shape() {
        let mut data = ResourceData::with_id("abc");
        data.set_set("identifier_uris", ["api://x"]);
        data.set("description", None::<String>);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["attributes"]["identifier_uris"]["type"], "set");
        assert_eq!(json["attributes"]["identifier_uris"]["value"][0], "api://x");
        assert_eq!(json["attributes"]["description"]["type"], "null");

        let back: ResourceData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }
}
