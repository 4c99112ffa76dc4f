//! Hemmer Bridge
//!
//! This crate keeps a bridged Terraform-style provider backward compatible
//! across releases. Upstream providers rename resources, move them between
//! modules, and loosen or tighten field bounds; each of those would break
//! programs written against the previously published types. The bridge
//! records what it published in a small metadata document and, on every run,
//! rewrites the provider description so the old shapes keep working.
//!
//! # Overview
//!
//! - **Tokens**: Stable `<package>:<module>:<name>` identifiers ([`tokens`])
//! - **Schema**: The live upstream schema ([`schema`]) and walking views over it ([`walk`])
//! - **Provider info**: Published tokens and per-field overrides ([`info`])
//! - **Metadata**: The persisted document and its namespaces ([`metadata`])
//! - **Alias history**: What was published before ([`history`])
//! - **Auto-aliasing**: The reconciliation itself ([`aliasing`], [`max_items_one`])
//! - **Logging**: Integration with `tracing` for structured logging ([`logging`])
//!
//! # Quick Start
//!
//! ```no_run
//! use hemmer_bridge::{
//!     metadata::MetadataInfo,
//!     schema::{Attribute, ProviderSchema, Schema},
//!     ProviderInfo, ResourceInfo,
//! };
//!
//! fn main() -> hemmer_bridge::Result<()> {
//!     hemmer_bridge::init_logging();
//!
//!     let schema = ProviderSchema::new().with_resource(
//!         "example_widget",
//!         Schema::v0().with_attribute("name", Attribute::optional_string()),
//!     );
//!
//!     let mut provider = ProviderInfo::new("example", schema)
//!         .with_version("2.1.0")
//!         .with_resource("example_widget", ResourceInfo::new("example:widgets/widget:Widget"))
//!         .with_metadata(MetadataInfo::load("bridge-metadata.json")?);
//!
//!     provider.apply_auto_aliases()?;
//!     provider.set_autonaming(255, "-");
//!
//!     if let Some(metadata) = &provider.metadata {
//!         metadata.save()?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Major versions
//!
//! Compatibility is only promised within a major version. A renamed resource
//! keeps a full deprecated duplicate under its old token until the next major
//! release, and only a type alias after that. Collapsed single-item fields
//! stay collapsed until the next major release, then follow the schema again.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aliasing;
pub mod error;
pub mod history;
pub mod info;
pub mod logging;
pub mod max_items_one;
pub mod metadata;
pub mod schema;
pub mod testing;
pub mod tokens;
pub mod version;
pub mod walk;

// Re-export main types at crate root
pub use error::{BridgeError, Result};
pub use history::{AliasHistory, AliasRecord, FieldHistory, TokenHistory};
pub use info::{DataSourceInfo, ProviderInfo, ResourceInfo, SchemaInfo, LEGACY_SUFFIX};
pub use logging::{init_logging, init_logging_with_default, try_init_logging, with_log_sink};
pub use metadata::{MetadataInfo, ProviderMetadata, AUTO_ALIASING_KEY};
pub use schema::ProviderSchema;
pub use tokens::{DataSourceToken, ResourceToken, Token};

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
