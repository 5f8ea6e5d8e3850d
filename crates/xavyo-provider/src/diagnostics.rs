//! User-facing diagnostics.

use serde::Serialize;

use crate::error::ProviderError;
use crate::state::ResourceData;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A message reported back to the operator, optionally tied to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(summary)
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn at(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        let diagnostic = match err {
            ProviderError::Api { message, source, .. } => {
                Diagnostic::error(message.clone()).with_detail(source.to_string())
            }
            ProviderError::Integrity {
                operation,
                identifier,
                detail,
            } => Diagnostic::error(format!("API error during {operation} of {identifier:?}"))
                .with_detail(detail.clone()),
            other => Diagnostic::error(other.to_string()),
        };

        match err.attribute() {
            Some(attribute) => diagnostic.at(attribute),
            None => diagnostic,
        }
    }
}

/// Ordered collection of diagnostics returned by a provider operation.
///
/// A failed create whose remote object already exists also carries the
/// state holding its identifier, so the caller can keep tracking it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    #[serde(skip)]
    partial_state: Option<Box<ResourceData>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Attach the state of a remote object created before the failure.
    #[must_use]
    pub fn with_partial_state(mut self, state: ResourceData) -> Self {
        self.partial_state = Some(Box::new(state));
        self
    }

    /// State of a remote object that exists despite the failure.
    pub fn partial_state(&self) -> Option<&ResourceData> {
        self.partial_state.as_deref()
    }

    pub fn into_partial_state(self) -> Option<ResourceData> {
        self.partial_state.map(|state| *state)
    }

    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Find the first diagnostic tied to `attribute`.
    pub fn for_attribute(&self, attribute: &str) -> Option<&Diagnostic> {
        self.items
            .iter()
            .find(|d| d.attribute.as_deref() == Some(attribute))
    }
}

impl From<ProviderError> for Diagnostics {
    fn from(err: ProviderError) -> Self {
        Diagnostics {
            items: vec![Diagnostic::from(&err)],
            partial_state: None,
        }
    }
}

impl From<Vec<ProviderError>> for Diagnostics {
    fn from(errors: Vec<ProviderError>) -> Self {
        Diagnostics {
            items: errors.iter().map(Diagnostic::from).collect(),
            partial_state: None,
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match &d.attribute {
                Some(attribute) => write!(f, "{attribute}: {}", d.summary)?,
                None => write!(f, "{}", d.summary)?,
            }
            if let Some(detail) = &d.detail {
                write!(f, ": {detail}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
