//! Declared configuration schema
//!
//! Each resource type describes its attributes: type, whether they are
//! required, optional or computed, whether a change forces replacement, and
//! the validator applied to each value.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ProviderError, ProviderResult};
use crate::state::{AttributeValue, ResourceData};
use crate::validate;

/// Attribute data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    /// Ordered list of strings.
    List,
    /// Unordered set of strings.
    Set,
}

/// Validator applied to each string value of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    Uuid,
    AppUri,
    NotEmpty,
    CredentialName,
    /// A JSON document.
    Json,
}

impl Validator {
    /// Apply this validator to a single value.
    pub fn check(&self, attribute: &str, value: &str) -> ProviderResult<()> {
        match self {
            Validator::Uuid => validate::validate_uuid(attribute, value),
            Validator::AppUri => validate::validate_app_uri(attribute, value),
            Validator::NotEmpty => validate::validate_not_empty(attribute, value),
            Validator::CredentialName => validate::validate_credential_name(attribute, value),
            Validator::Json => validate::validate_json(attribute, value),
        }
    }
}

/// Schema of a single attribute.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSchema {
    pub attribute_type: AttributeType,
    pub description: &'static str,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// A change to this attribute replaces the resource.
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl AttributeSchema {
    fn new(attribute_type: AttributeType) -> Self {
        Self {
            attribute_type,
            description: "",
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            validator: None,
            min_items: None,
            max_items: None,
        }
    }

    /// A required string.
    pub fn required_string() -> Self {
        Self {
            required: true,
            ..Self::new(AttributeType::String)
        }
    }

    /// An optional string.
    pub fn optional_string() -> Self {
        Self {
            optional: true,
            ..Self::new(AttributeType::String)
        }
    }

    /// A string set by the remote system.
    pub fn computed_string() -> Self {
        Self {
            computed: true,
            ..Self::new(AttributeType::String)
        }
    }

    /// An optional unordered set of strings.
    pub fn optional_set() -> Self {
        Self {
            optional: true,
            ..Self::new(AttributeType::Set)
        }
    }

    /// A required ordered list of strings.
    pub fn required_list() -> Self {
        Self {
            required: true,
            ..Self::new(AttributeType::List)
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn with_items(mut self, min: usize, max: usize) -> Self {
        self.min_items = Some(min);
        self.max_items = Some(max);
        self
    }

    #[must_use]
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Whether the operator supplies this attribute.
    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }

    fn check(&self, name: &str, value: Option<&AttributeValue>) -> Vec<ProviderError> {
        let mut errors = Vec::new();

        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                if self.required {
                    errors.push(ProviderError::validation(name, "a value is required"));
                }
                return errors;
            }
        };

        if self.computed && !self.is_configurable() {
            errors.push(ProviderError::validation(
                name,
                "attribute is computed and cannot be set",
            ));
            return errors;
        }

        let type_matches = matches!(
            (self.attribute_type, value),
            (AttributeType::String, AttributeValue::String(_))
                | (AttributeType::Bool, AttributeValue::Bool(_))
                | (AttributeType::List, AttributeValue::List(_))
                | (AttributeType::Set, AttributeValue::Set(_) | AttributeValue::List(_))
        );
        if !type_matches {
            errors.push(ProviderError::validation(
                name,
                format!("expected a value of type {:?}", self.attribute_type),
            ));
            return errors;
        }

        let items = value.as_strings();
        if matches!(self.attribute_type, AttributeType::List | AttributeType::Set) {
            if let Some(min) = self.min_items.filter(|min| items.len() < *min) {
                errors.push(ProviderError::validation(
                    name,
                    format!("at least {min} item(s) required, got {}", items.len()),
                ));
            }
            if let Some(max) = self.max_items.filter(|max| items.len() > *max) {
                errors.push(ProviderError::validation(
                    name,
                    format!("at most {max} item(s) allowed, got {}", items.len()),
                ));
            }
        }

        if let Some(validator) = self.validator {
            errors.extend(
                items
                    .into_iter()
                    .filter_map(|item| validator.check(name, item).err()),
            );
        }

        errors
    }
}

/// Schema of a resource type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceSchema {
    attributes: BTreeMap<&'static str, AttributeSchema>,
}

impl ResourceSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute using builder pattern.
    #[must_use]
    pub fn with_attribute(mut self, name: &'static str, attribute: AttributeSchema) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    /// Get an attribute schema by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    /// Iterate over all attributes.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttributeSchema)> {
        self.attributes.iter().map(|(name, attr)| (*name, attr))
    }

    /// Names of the attributes the operator supplies.
    pub fn configurable_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter()
            .filter(|(_, attr)| attr.is_configurable())
            .map(|(name, _)| name)
    }

    /// Validate declared configuration, returning every problem found.
    ///
    /// Attributes not described by the schema are reported as well.
    pub fn validate(&self, data: &ResourceData) -> Vec<ProviderError> {
        let mut errors: Vec<ProviderError> = self
            .iter()
            .flat_map(|(name, attr)| attr.check(name, data.get(name)))
            .collect();

        errors.extend(
            data.iter()
                .filter(|(name, _)| !self.attributes.contains_key(name.as_str()))
                .map(|(name, _)| ProviderError::validation(name.as_str(), "unknown attribute")),
        );

        errors
    }
}
