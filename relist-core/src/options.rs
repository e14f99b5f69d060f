//! Read options for list and get calls
//!
//! The resource version token decides which layer answers a read. A list
//! carrying a token may be served by the read-through cache; a list with
//! the token cleared must be answered by the authoritative source.

use serde::{Deserialize, Serialize};

/// Options for a namespaced list call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    /// Consistency token. `None` requests an authoritative read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource version token.
    pub fn with_resource_version(mut self, resource_version: impl Into<String>) -> Self {
        self.resource_version = Some(resource_version.into());
        self
    }

    /// Set the label selector.
    pub fn with_label_selector(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = Some(selector.into());
        self
    }

    /// Set the field selector.
    pub fn with_field_selector(mut self, selector: impl Into<String>) -> Self {
        self.field_selector = Some(selector.into());
        self
    }

    /// Set the page size limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Copy of these options with the resource version cleared.
    ///
    /// Selectors and limit are preserved; only the consistency token is
    /// dropped, so the next list skips the cache.
    pub fn bypass_cache(&self) -> Self {
        Self {
            resource_version: None,
            ..self.clone()
        }
    }

    /// True when these options request an authoritative read.
    pub fn is_cache_bypassed(&self) -> bool {
        self.resource_version.is_none()
    }
}

/// Options for a single-object get call.
///
/// The default value is a direct read from the authoritative source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }
}
