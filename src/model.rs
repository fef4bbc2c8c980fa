//! Data model for discovered references and extracted documentation
//!
//! The serialized shape of [`ResultTree`] is the output file format:
//!
//! ```json
//! { "services": { "s3": { "url": "...", "methods": { "list_buckets": { ... } } } } }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Error text recorded for a method whose page could not be fetched
pub const FETCH_FAILED: &str = "Failed to fetch page";

/// Error text recorded for a method whose worker died without reporting
pub const WORKER_LOST: &str = "Worker terminated before producing a result";

/// A service discovered on the index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef {
    /// Display name of the service (link text)
    pub name: String,
    /// Absolute URL of the service page
    pub url: String,
}

/// A method discovered on a service page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    /// Display name of the method (link text)
    pub name: String,
    /// Absolute URL of the method page
    pub url: String,
}

/// A single documented parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
}

/// Structured documentation pulled from a method page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDocumentation {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub syntax: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub returns: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub full_text: String,
}

impl MethodDocumentation {
    /// Creates a record holding only the page URL
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Names the fields that extraction left empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_empty() {
            missing.push("title");
        }
        if self.description.is_empty() {
            missing.push("description");
        }
        if self.syntax.is_empty() {
            missing.push("syntax");
        }
        if self.parameters.is_empty() {
            missing.push("parameters");
        }
        if self.returns.is_empty() {
            missing.push("returns");
        }
        if self.full_text.is_empty() {
            missing.push("full_text");
        }
        missing
    }
}

/// Outcome recorded for a method: either documentation or an error marker
///
/// Serialized untagged so a failure is `{"error": "..."}` and a success is
/// the plain documentation object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodDoc {
    Failed { error: String },
    Extracted(MethodDocumentation),
}

impl MethodDoc {
    /// Creates a failure record with the given reason
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            error: reason.into(),
        }
    }

    /// Returns true if this record carries an error instead of documentation
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns the documentation if extraction succeeded
    pub fn documentation(&self) -> Option<&MethodDocumentation> {
        match self {
            Self::Extracted(doc) => Some(doc),
            Self::Failed { .. } => None,
        }
    }
}

/// All methods collected for one service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub url: String,
    #[serde(default)]
    pub methods: IndexMap<String, MethodDoc>,
}

impl ServiceEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            methods: IndexMap::new(),
        }
    }
}

/// The aggregate written to the output file
///
/// Grows monotonically during a run: services and methods are added, never
/// removed. A method name seen twice within one service keeps the last
/// record written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTree {
    #[serde(default)]
    pub services: IndexMap<String, ServiceEntry>,
}

impl ResultTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty entry for a service, returning true if the name was new
    pub fn register_service(&mut self, service: &ServiceRef) -> bool {
        self.services
            .insert(service.name.clone(), ServiceEntry::new(service.url.clone()))
            .is_none()
    }

    /// Records a method result under a service
    ///
    /// Returns true if an earlier record for the same method was replaced.
    /// Results for unregistered services are dropped and reported as not replaced.
    pub fn insert_method(&mut self, service: &str, method: String, doc: MethodDoc) -> bool {
        match self.services.get_mut(service) {
            Some(entry) => entry.methods.insert(method, doc).is_some(),
            None => {
                tracing::warn!("Dropping result for unknown service {}", service);
                false
            }
        }
    }

    /// Total number of method records across all services
    pub fn method_count(&self) -> usize {
        self.services.values().map(|s| s.methods.len()).sum()
    }
}
