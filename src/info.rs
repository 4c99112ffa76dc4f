//! The bridged provider's description and per-field overrides.
//!
//! [`ProviderInfo`] is what a provider author hands the bridge: the live
//! upstream schema plus, for every resource and data source, the token it is
//! published under and a tree of [`SchemaInfo`] overrides. Auto-aliasing
//! reads and rewrites these structures in place; whatever it leaves behind is
//! what code generation and the runtime act on.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::metadata::MetadataInfo;
use crate::schema::{AttributeType, ProviderSchema};
use crate::tokens::{DataSourceToken, ResourceToken, Token};

/// Suffix appended to the upstream name of a synthesized legacy entry.
pub const LEGACY_SUFFIX: &str = "_legacy";

/// Random suffix length used by auto-naming.
const AUTO_NAME_RANDOM_LEN: usize = 7;

/// Override information for a single field.
///
/// A `None` value means "not decided here": downstream code falls back to
/// whatever the upstream schema implies. A node that exists at all is taken
/// as a deliberate customization of its field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaInfo {
    /// The published property name, if not the default.
    pub name: Option<String>,
    /// Force the field to be (or not be) projected as a single value.
    pub max_items_one: Option<bool>,
    /// Overrides for the fields of a nested resource element.
    pub fields: BTreeMap<String, SchemaInfo>,
    /// Overrides for a nested field element.
    pub elem: Option<Box<SchemaInfo>>,
    /// Default value behavior.
    pub default: Option<DefaultInfo>,
}

/// Default value behavior for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultInfo {
    /// The value is generated from the resource name.
    pub auto_named: bool,
    /// How generated names are formed.
    pub auto_name: Option<AutoNameOptions>,
}

/// Parameters for generated names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoNameOptions {
    /// Separator between the base name and the random suffix.
    pub separator: String,
    /// Maximum total length.
    pub max_len: usize,
    /// Length of the random suffix.
    pub rand_len: usize,
}

/// Documentation source for a generated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocInfo {
    /// Upstream documentation file name.
    pub source: String,
}

/// How a single upstream resource is published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceInfo {
    /// The published token.
    pub tok: ResourceToken,
    /// Per-field overrides.
    pub fields: BTreeMap<String, SchemaInfo>,
    /// Previous tokens this resource also answers to.
    pub aliases: Vec<ResourceToken>,
    /// Documentation source override.
    pub docs: Option<DocInfo>,
    /// Set when the resource is deprecated.
    pub deprecation_message: Option<String>,
}

/// How a single upstream data source is published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSourceInfo {
    /// The published token.
    pub tok: DataSourceToken,
    /// Per-field overrides.
    pub fields: BTreeMap<String, SchemaInfo>,
    /// Previous tokens this data source also answers to.
    pub aliases: Vec<DataSourceToken>,
    /// Documentation source override.
    pub docs: Option<DocInfo>,
    /// Set when the data source is deprecated.
    pub deprecation_message: Option<String>,
}

impl ResourceInfo {
    /// Publish a resource under `tok`.
    pub fn new(tok: impl Into<ResourceToken>) -> Self {
        Self {
            tok: tok.into(),
            ..Default::default()
        }
    }

    /// Add a field override.
    pub fn with_field(mut self, name: impl Into<String>, info: SchemaInfo) -> Self {
        self.fields.insert(name.into(), info);
        self
    }
}

impl DataSourceInfo {
    /// Publish a data source under `tok`.
    pub fn new(tok: impl Into<DataSourceToken>) -> Self {
        Self {
            tok: tok.into(),
            ..Default::default()
        }
    }

    /// Add a field override.
    pub fn with_field(mut self, name: impl Into<String>, info: SchemaInfo) -> Self {
        self.fields.insert(name.into(), info);
        self
    }
}

impl SchemaInfo {
    /// An override that only pins `max_items_one`.
    pub fn max_items_one(value: bool) -> Self {
        Self {
            max_items_one: Some(value),
            ..Default::default()
        }
    }
}

/// Access shared by resource and data source entries.
pub trait EntryInfo {
    /// The token type this entry is published under.
    type Token: crate::tokens::Token;

    /// The published token.
    fn token(&self) -> &Self::Token;

    /// The field override tree.
    fn fields_mut(&mut self) -> &mut BTreeMap<String, SchemaInfo>;
}

impl EntryInfo for ResourceInfo {
    type Token = ResourceToken;

    fn token(&self) -> &ResourceToken {
        &self.tok
    }

    fn fields_mut(&mut self) -> &mut BTreeMap<String, SchemaInfo> {
        &mut self.fields
    }
}

impl EntryInfo for DataSourceInfo {
    type Token = DataSourceToken;

    fn token(&self) -> &DataSourceToken {
        &self.tok
    }

    fn fields_mut(&mut self) -> &mut BTreeMap<String, SchemaInfo> {
        &mut self.fields
    }
}

/// Everything the bridge knows about a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderInfo {
    /// Provider name; upstream names are prefixed with `<name>_`.
    pub name: String,
    /// The provider's release version. `None` means "latest recorded".
    pub version: Option<String>,
    /// The live upstream schema.
    pub schema: ProviderSchema,
    /// Published resources, keyed by upstream name, in declaration order.
    pub resources: IndexMap<String, ResourceInfo>,
    /// Published data sources, keyed by upstream name, in declaration order.
    pub data_sources: IndexMap<String, DataSourceInfo>,
    /// The persisted metadata document.
    pub metadata: Option<MetadataInfo>,
    pub(crate) legacy_resources: BTreeSet<String>,
    pub(crate) legacy_data_sources: BTreeSet<String>,
}

impl ProviderInfo {
    /// Describe a provider named `name` over `schema`.
    pub fn new(name: impl Into<String>, schema: ProviderSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            ..Default::default()
        }
    }

    /// Set the release version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Publish a resource.
    pub fn with_resource(mut self, name: impl Into<String>, info: ResourceInfo) -> Self {
        self.resources.insert(name.into(), info);
        self
    }

    /// Publish a data source.
    pub fn with_data_source(mut self, name: impl Into<String>, info: DataSourceInfo) -> Self {
        self.data_sources.insert(name.into(), info);
        self
    }

    /// Attach the metadata document.
    pub fn with_metadata(mut self, metadata: MetadataInfo) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether `name` is a legacy resource synthesized by a rename.
    pub fn is_legacy_resource(&self, name: &str) -> bool {
        self.legacy_resources.contains(name)
    }

    /// Whether `name` is a legacy data source synthesized by a rename.
    pub fn is_legacy_data_source(&self, name: &str) -> bool {
        self.legacy_data_sources.contains(name)
    }

    /// Publish `resource_name` under `new_tok` while keeping `legacy_tok`
    /// alive as a deprecated duplicate named `<resource_name>_legacy`.
    ///
    /// The current entry also lists `legacy_tok` as an alias, so state
    /// created under the old type migrates to the new one.
    pub fn rename_resource_with_alias(
        &mut self,
        resource_name: &str,
        legacy_tok: ResourceToken,
        new_tok: ResourceToken,
    ) {
        let legacy_name = format!("{}{}", resource_name, LEGACY_SUFFIX);
        let mut current = self.resources.get(resource_name).cloned().unwrap_or_default();

        let mut legacy = current.clone();
        legacy.aliases.clear();
        legacy.deprecation_message = Some(deprecation_message(&legacy_tok, &new_tok));
        if legacy.docs.is_none() {
            legacy.docs = Some(self.doc_stub(resource_name));
        }
        legacy.tok = legacy_tok.clone();

        current.tok = new_tok;
        push_unique(&mut current.aliases, legacy_tok);

        self.resources.insert(resource_name.to_string(), current);
        self.resources.insert(legacy_name.clone(), legacy);
        if let Some(schema) = self.schema.resources.get(resource_name).cloned() {
            self.schema.resources.insert(legacy_name.clone(), schema);
        }
        self.legacy_resources.insert(legacy_name);
    }

    /// Publish `ds_name` under `new_tok` while keeping `legacy_tok` alive as
    /// a deprecated duplicate named `<ds_name>_legacy`. The current entry
    /// also lists `legacy_tok` as an alias.
    pub fn rename_data_source(
        &mut self,
        ds_name: &str,
        legacy_tok: DataSourceToken,
        new_tok: DataSourceToken,
    ) {
        let legacy_name = format!("{}{}", ds_name, LEGACY_SUFFIX);
        let mut current = self.data_sources.get(ds_name).cloned().unwrap_or_default();

        let mut legacy = current.clone();
        legacy.aliases.clear();
        legacy.deprecation_message = Some(deprecation_message(&legacy_tok, &new_tok));
        if legacy.docs.is_none() {
            legacy.docs = Some(self.doc_stub(ds_name));
        }
        legacy.tok = legacy_tok.clone();

        current.tok = new_tok;
        push_unique(&mut current.aliases, legacy_tok);

        self.data_sources.insert(ds_name.to_string(), current);
        self.data_sources.insert(legacy_name.clone(), legacy);
        if let Some(schema) = self.schema.data_sources.get(ds_name).cloned() {
            self.schema.data_sources.insert(legacy_name.clone(), schema);
        }
        self.legacy_data_sources.insert(legacy_name);
    }

    /// Auto-name every input string attribute literally called `name`.
    ///
    /// Fields that already have an override entry are left alone: an entry
    /// means someone already decided how that field behaves.
    pub fn set_autonaming(&mut self, max_len: usize, separator: &str) {
        const NAME_PROPERTY: &str = "name";

        for (resource_name, info) in self.resources.iter_mut() {
            let Some(schema) = self.schema.resources.get(resource_name) else {
                continue;
            };
            let Some(attr) = schema.block.attributes.get(NAME_PROPERTY) else {
                continue;
            };
            if !attr.flags.is_input() || attr.attr_type != AttributeType::String {
                continue;
            }
            if !info.fields.contains_key(NAME_PROPERTY) {
                info.fields.insert(
                    NAME_PROPERTY.to_string(),
                    auto_name(NAME_PROPERTY, max_len, separator),
                );
            }
        }
    }

    fn doc_stub(&self, upstream_name: &str) -> DocInfo {
        let prefix = format!("{}_", self.name);
        let short = upstream_name.strip_prefix(&prefix).unwrap_or(upstream_name);
        DocInfo {
            source: format!("{}.html.markdown", short),
        }
    }
}

/// An override that generates `name` from the resource name plus a random suffix.
pub fn auto_name(name: &str, max_len: usize, separator: &str) -> SchemaInfo {
    SchemaInfo {
        name: Some(name.to_string()),
        default: Some(DefaultInfo {
            auto_named: true,
            auto_name: Some(AutoNameOptions {
                separator: separator.to_string(),
                max_len,
                rand_len: AUTO_NAME_RANDOM_LEN,
            }),
        }),
        ..Default::default()
    }
}

fn deprecation_message<T: Token>(legacy: &T, current: &T) -> String {
    format!(
        "{} has been deprecated in favor of {}",
        legacy.readable(),
        current.readable()
    )
}

pub(crate) fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Schema};
    use pretty_assertions::assert_eq;

    fn provider() -> ProviderInfo {
        let schema = ProviderSchema::new()
            .with_resource(
                "pkg_mod1_r1",
                Schema::v0().with_attribute("name", Attribute::optional_string()),
            )
            .with_data_source("pkg_mod1_d1", Schema::v0());
        ProviderInfo::new("pkg", schema)
            .with_resource("pkg_mod1_r1", ResourceInfo::new("pkg:mod1/r1:R1"))
            .with_data_source("pkg_mod1_d1", DataSourceInfo::new("pkg:mod1/getD1:getD1"))
    }

    #[test]
    fn test_rename_resource_with_alias() {
        let mut p = provider();
        p.rename_resource_with_alias(
            "pkg_mod1_r1",
            ResourceToken::new("pkg:index/mod1R1:Mod1R1"),
            ResourceToken::new("pkg:mod1/r1:R1"),
        );

        assert_eq!(
            p.resources["pkg_mod1_r1"],
            ResourceInfo {
                tok: ResourceToken::new("pkg:mod1/r1:R1"),
                aliases: vec![ResourceToken::new("pkg:index/mod1R1:Mod1R1")],
                ..Default::default()
            }
        );
        assert_eq!(
            p.resources["pkg_mod1_r1_legacy"],
            ResourceInfo {
                tok: ResourceToken::new("pkg:index/mod1R1:Mod1R1"),
                deprecation_message: Some(
                    "pkg.index/mod1r1.Mod1R1 has been deprecated in favor of pkg.mod1/r1.R1"
                        .to_string()
                ),
                docs: Some(DocInfo {
                    source: "mod1_r1.html.markdown".to_string()
                }),
                ..Default::default()
            }
        );
        assert!(p.schema.resources.contains_key("pkg_mod1_r1_legacy"));
        assert!(p.is_legacy_resource("pkg_mod1_r1_legacy"));
        assert!(!p.is_legacy_resource("pkg_mod1_r1"));
    }

    #[test]
    fn test_rename_resource_twice_is_stable() {
        let mut p = provider();
        for _ in 0..2 {
            p.rename_resource_with_alias(
                "pkg_mod1_r1",
                ResourceToken::new("pkg:index:Old"),
                ResourceToken::new("pkg:mod1/r1:R1"),
            );
        }
        assert_eq!(p.resources["pkg_mod1_r1"].aliases.len(), 1);
        assert_eq!(p.resources.len(), 2);
    }

    #[test]
    fn test_rename_keeps_existing_docs() {
        let mut p = provider();
        p.resources["pkg_mod1_r1"].docs = Some(DocInfo {
            source: "custom.md".to_string(),
        });
        p.rename_resource_with_alias(
            "pkg_mod1_r1",
            ResourceToken::new("pkg:index:Old"),
            ResourceToken::new("pkg:mod1/r1:R1"),
        );
        assert_eq!(
            p.resources["pkg_mod1_r1_legacy"].docs.as_ref().map(|d| d.source.as_str()),
            Some("custom.md")
        );
    }

    #[test]
    fn test_rename_data_source() {
        let mut p = provider();
        p.rename_data_source(
            "pkg_mod1_d1",
            DataSourceToken::new("pkg:index/getMod1D1:getMod1D1"),
            DataSourceToken::new("pkg:mod1/getD1:getD1"),
        );

        assert_eq!(
            p.data_sources["pkg_mod1_d1"].aliases,
            vec![DataSourceToken::new("pkg:index/getMod1D1:getMod1D1")]
        );
        let legacy = &p.data_sources["pkg_mod1_d1_legacy"];
        assert_eq!(legacy.tok, DataSourceToken::new("pkg:index/getMod1D1:getMod1D1"));
        assert_eq!(
            legacy.deprecation_message.as_deref(),
            Some("pkg.index/getmod1d1.getMod1D1 has been deprecated in favor of pkg.mod1/getd1.getD1")
        );
        assert!(p.is_legacy_data_source("pkg_mod1_d1_legacy"));
    }

    #[test]
    fn test_set_autonaming() {
        let mut p = provider();
        p.set_autonaming(24, "-");

        let name = &p.resources["pkg_mod1_r1"].fields["name"];
        assert_eq!(name.name.as_deref(), Some("name"));
        let default = name.default.as_ref().unwrap();
        assert!(default.auto_named);
        assert_eq!(
            default.auto_name,
            Some(AutoNameOptions {
                separator: "-".to_string(),
                max_len: 24,
                rand_len: 7
            })
        );
    }

    #[test]
    fn test_set_autonaming_skips_existing_override() {
        let mut p = provider();
        p.resources["pkg_mod1_r1"]
            .fields
            .insert("name".to_string(), SchemaInfo::default());
        p.set_autonaming(24, "-");

        assert_eq!(p.resources["pkg_mod1_r1"].fields["name"], SchemaInfo::default());
    }

    #[test]
    fn test_set_autonaming_skips_computed_name() {
        let schema = ProviderSchema::new().with_resource(
            "pkg_r1",
            Schema::v0().with_attribute("name", Attribute::computed_string()),
        );
        let mut p = ProviderInfo::new("pkg", schema).with_resource("pkg_r1", ResourceInfo::new("pkg:index:R1"));
        p.set_autonaming(24, "-");
        assert!(p.resources["pkg_r1"].fields.is_empty());
    }
}
