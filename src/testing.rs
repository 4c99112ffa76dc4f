//! Testing utilities for bridged providers.
//!
//! This module provides a small fixture for building a [`ProviderInfo`] with
//! an in-memory metadata document, plus assertion helpers for checking what
//! auto-aliasing did to it.
//!
//! # Example
//!
//! ```
//! use hemmer_bridge::schema::Schema;
//! use hemmer_bridge::testing::{assert_alias, assert_legacy_entry, ProviderFixture};
//! use serde_json::json;
//!
//! let mut provider = ProviderFixture::new("pkg")
//!     .resource("pkg_mod1_r1", Schema::v0(), "pkg:mod1/r1:R1")
//!     .history(json!({"resources": {"pkg_mod1_r1": {"current": "pkg:index/mod1R1:Mod1R1"}}}))
//!     .build();
//!
//! provider.apply_auto_aliases().unwrap();
//!
//! assert_alias(&provider, "pkg_mod1_r1", "pkg:index/mod1R1:Mod1R1");
//! assert_legacy_entry(&provider, "pkg_mod1_r1_legacy", "pkg:index/mod1R1:Mod1R1");
//! ```

use std::io;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

use crate::history::AliasHistory;
use crate::info::{DataSourceInfo, ProviderInfo, ResourceInfo};
use crate::metadata::{MetadataInfo, ProviderMetadata, AUTO_ALIASING_KEY, METADATA_FILE_NAME};
use crate::schema::{ProviderSchema, Schema};
use crate::tokens::Token;

/// An in-memory log destination for [`crate::logging::with_log_sink`].
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A builder for test providers.
///
/// Every resource and data source gets both a live schema and a published
/// token; the metadata document is kept in memory and never saved.
#[derive(Debug, Clone, Default)]
pub struct ProviderFixture {
    name: String,
    version: Option<String>,
    schema: ProviderSchema,
    resources: Vec<(String, ResourceInfo)>,
    data_sources: Vec<(String, DataSourceInfo)>,
    metadata: ProviderMetadata,
}

impl ProviderFixture {
    /// Start a provider named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the provider version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a resource with a live schema, published under `tok`.
    pub fn resource(self, name: &str, schema: Schema, tok: &str) -> Self {
        self.resource_info(name, schema, ResourceInfo::new(tok))
    }

    /// Add a resource with a live schema and a full info entry.
    pub fn resource_info(mut self, name: &str, schema: Schema, info: ResourceInfo) -> Self {
        self.schema.resources.insert(name.to_string(), schema);
        self.resources.push((name.to_string(), info));
        self
    }

    /// Add a resource that is published but missing from the live schema.
    pub fn resource_without_schema(mut self, name: &str, tok: &str) -> Self {
        self.resources.push((name.to_string(), ResourceInfo::new(tok)));
        self
    }

    /// Add a data source with a live schema, published under `tok`.
    pub fn data_source(mut self, name: &str, schema: Schema, tok: &str) -> Self {
        self.schema.data_sources.insert(name.to_string(), schema);
        self.data_sources.push((name.to_string(), DataSourceInfo::new(tok)));
        self
    }

    /// Seed the alias history.
    pub fn history(self, history: Value) -> Self {
        self.metadata_entry(AUTO_ALIASING_KEY, history)
    }

    /// Seed an arbitrary metadata namespace.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be stored.
    pub fn metadata_entry(mut self, key: &str, value: Value) -> Self {
        if let Err(err) = self.metadata.set(key, &value) {
            panic!("Failed to seed metadata key '{}': {}", key, err);
        }
        self
    }

    /// Seed the metadata document from its serialized form.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is not a valid metadata document.
    pub fn metadata_bytes(mut self, bytes: &[u8]) -> Self {
        self.metadata = ProviderMetadata::from_bytes(bytes)
            .unwrap_or_else(|err| panic!("Invalid metadata document: {}", err));
        self
    }

    /// Build the provider.
    pub fn build(self) -> ProviderInfo {
        let mut provider = ProviderInfo::new(self.name, self.schema)
            .with_metadata(MetadataInfo::new(METADATA_FILE_NAME, self.metadata));
        provider.version = self.version;
        for (name, info) in self.resources {
            provider = provider.with_resource(name, info);
        }
        for (name, info) in self.data_sources {
            provider = provider.with_data_source(name, info);
        }
        provider
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Read the alias history currently stored in `provider`'s metadata.
///
/// # Panics
///
/// Panics if the provider has no metadata or the history is malformed.
pub fn alias_history(provider: &ProviderInfo) -> AliasHistory {
    let metadata = provider
        .metadata
        .as_ref()
        .unwrap_or_else(|| panic!("Provider '{}' has no metadata", provider.name));
    match metadata.data.get(AUTO_ALIASING_KEY) {
        Ok(history) => history.unwrap_or_default(),
        Err(err) => panic!("Malformed alias history: {}", err),
    }
}

/// Assert that resource `name` is aliased to `alias`.
///
/// # Panics
///
/// Panics if the resource is missing or does not list the alias.
pub fn assert_alias(provider: &ProviderInfo, name: &str, alias: &str) {
    let info = provider
        .resources
        .get(name)
        .unwrap_or_else(|| panic!("Expected resource '{}' to exist", name));
    assert!(
        info.aliases.iter().any(|a| a.as_str() == alias),
        "Expected resource '{}' to be aliased to '{}', but its aliases are {:?}",
        name,
        alias,
        info.aliases
    );
}

/// Assert that resource `name` has no aliases.
///
/// # Panics
///
/// Panics if the resource is missing or lists any alias.
pub fn assert_no_alias(provider: &ProviderInfo, name: &str) {
    let info = provider
        .resources
        .get(name)
        .unwrap_or_else(|| panic!("Expected resource '{}' to exist", name));
    assert!(
        info.aliases.is_empty(),
        "Expected resource '{}' to have no aliases, but got {:?}",
        name,
        info.aliases
    );
}

/// Assert that a deprecated legacy resource `name` exists under `tok`.
///
/// # Panics
///
/// Panics if the entry is missing, has another token or is not deprecated.
pub fn assert_legacy_entry(provider: &ProviderInfo, name: &str, tok: &str) {
    let info = provider
        .resources
        .get(name)
        .unwrap_or_else(|| panic!("Expected legacy resource '{}' to exist", name));
    assert_eq!(
        info.tok.as_str(),
        tok,
        "Expected legacy resource '{}' to keep token '{}'",
        name,
        tok
    );
    assert!(
        info.deprecation_message.is_some(),
        "Expected legacy resource '{}' to be deprecated",
        name
    );
    assert!(
        provider.schema.resources.contains_key(name),
        "Expected legacy resource '{}' to have a schema",
        name
    );
}

/// Assert that the history records `tok` as the current token of resource `name`.
///
/// # Panics
///
/// Panics if there is no history for the resource or it records another token.
pub fn assert_history_current(provider: &ProviderInfo, name: &str, tok: &str) {
    let history = alias_history(provider);
    let entry = history
        .resources
        .get(name)
        .unwrap_or_else(|| panic!("Expected alias history for resource '{}'", name));
    assert_eq!(
        entry.current.as_str(),
        tok,
        "Expected history of '{}' to record current token '{}'",
        name,
        tok
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_buffer_shares_contents() {
        let logs = LogBuffer::new();
        let mut writer = logs.make_writer();
        writer.write_all(b"hello").unwrap();
        assert_eq!(logs.contents(), "hello");
    }

    #[test]
    fn test_fixture_builds_provider() {
        let provider = ProviderFixture::new("pkg")
            .version("1.2.3")
            .resource("pkg_r1", Schema::v0(), "pkg:index:R1")
            .resource_without_schema("pkg_r2", "pkg:index:R2")
            .data_source("pkg_d1", Schema::v0(), "pkg:index:getD1")
            .build();

        assert_eq!(provider.version.as_deref(), Some("1.2.3"));
        assert_eq!(
            provider.resources.keys().collect::<Vec<_>>(),
            vec!["pkg_r1", "pkg_r2"]
        );
        assert!(!provider.schema.resources.contains_key("pkg_r2"));
        assert!(provider.data_sources.contains_key("pkg_d1"));
        assert_eq!(alias_history(&provider), AliasHistory::default());
    }

    #[test]
    #[should_panic(expected = "to be aliased")]
    fn test_assert_alias_fails() {
        let provider = ProviderFixture::new("pkg")
            .resource("pkg_r1", Schema::v0(), "pkg:index:R1")
            .build();
        assert_alias(&provider, "pkg_r1", "pkg:index:R0");
    }
}
