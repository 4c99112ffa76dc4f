//! Automatic aliasing of renamed tokens and pinned collapse decisions.
//!
//! Each run compares the tokens and schema a provider publishes now against
//! the history stored in its metadata, and rewrites the [`ProviderInfo`] so
//! that nothing published before breaks within a major version:
//!
//! - A resource whose token changed keeps its old token alive. Within the
//!   major version the rename happened in, the old token is generated as a
//!   full deprecated duplicate (a hard alias). From the next major version on
//!   it is only listed as a type alias (a soft alias).
//! - Data sources follow the same rule, except that a changed data source
//!   token is recorded as a soft alias from the start; only a rename in the
//!   current major version produces a deprecated duplicate.
//! - List and set fields keep their single-value projection, see
//!   [`crate::max_items_one`].
//!
//! The run is split in two. The planning pass walks every entry in
//! declaration order, bootstraps history for new entries and reconciles
//! fields. The commit pass then applies renames, which may add legacy
//! entries to the very tables the planning pass walked.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::history::{AliasHistory, AliasRecord, TokenHistory};
use crate::info::{push_unique, EntryInfo, ProviderInfo};
use crate::max_items_one::reconcile_fields;
use crate::metadata::AUTO_ALIASING_KEY;
use crate::schema::Schema;
use crate::tokens::{DataSourceToken, ResourceToken, Token};
use crate::version::resolve_major_version;
use crate::walk::ResourceSchema;

impl ProviderInfo {
    /// Reconcile the published tokens and fields with the stored alias
    /// history, then write the updated history back into the metadata.
    ///
    /// The metadata is only changed in memory; persist it with
    /// [`crate::metadata::MetadataInfo::save`].
    ///
    /// # Errors
    ///
    /// Fails without touching anything if the provider has no metadata, the
    /// stored history is malformed or the version is not a semantic version.
    ///
    /// # Panics
    ///
    /// Panics if the updated history cannot be encoded, which would mean the
    /// history types themselves are broken.
    pub fn apply_auto_aliases(&mut self) -> Result<()> {
        let mut history: AliasHistory = match &self.metadata {
            Some(metadata) => metadata.data.get(AUTO_ALIASING_KEY)?.unwrap_or_default(),
            None => {
                return Err(BridgeError::MissingMetadata(format!(
                    "provider '{}' has nowhere to record alias history",
                    self.name
                )))
            },
        };
        let major = resolve_major_version(self.version.as_deref(), &history)?;

        let span = tracing::info_span!("auto_aliasing", provider = %self.name, major_version = major);
        let _enter = span.enter();
        debug!(version = ?self.version, "resolved major version");

        let renamed_resources = plan_entries(
            &mut self.resources,
            &self.schema.resources,
            &self.legacy_resources,
            &mut history.resources,
            major,
        );
        let renamed_data_sources = plan_entries(
            &mut self.data_sources,
            &self.schema.data_sources,
            &self.legacy_data_sources,
            &mut history.data_sources,
            major,
        );

        for name in &renamed_resources {
            if let Some(hist) = history.resources.get_mut(name) {
                self.alias_resource(name, hist, major);
            }
        }
        for name in &renamed_data_sources {
            if let Some(hist) = history.data_sources.get_mut(name) {
                self.alias_data_source(name, hist, major);
            }
        }

        if let Some(metadata) = self.metadata.as_mut() {
            // AliasHistory only holds strings, integers and string-keyed maps.
            metadata
                .data
                .set(AUTO_ALIASING_KEY, &history)
                .unwrap_or_else(|err| panic!("Failed to encode alias history: {}", err));
        }
        Ok(())
    }

    /// Like [`ProviderInfo::apply_auto_aliases`], for build-time callers
    /// where a failure should stop the build.
    ///
    /// # Panics
    ///
    /// Panics if auto-aliasing fails.
    pub fn must_apply_auto_aliases(&mut self) {
        if let Err(err) = self.apply_auto_aliases() {
            panic!("auto-aliasing failed for provider '{}': {}", self.name, err);
        }
    }

    fn alias_resource(&mut self, name: &str, hist: &mut TokenHistory<ResourceToken>, major: u64) {
        let Some(computed) = self.resources.get(name).map(|info| info.tok.clone()) else {
            return;
        };
        record_rename(name, hist, &computed, true, major);

        for alias in &hist.past {
            if alias.name == computed {
                continue;
            }
            if alias.in_codegen && alias.major_version == major {
                debug!(resource = name, legacy = %alias.name, "keeping deprecated legacy resource");
                self.rename_resource_with_alias(name, alias.name.clone(), computed.clone());
            } else if let Some(info) = self.resources.get_mut(name) {
                debug!(resource = name, alias = %alias.name, "aliasing resource");
                push_unique(&mut info.aliases, alias.name.clone());
            }
        }
    }

    fn alias_data_source(
        &mut self,
        name: &str,
        hist: &mut TokenHistory<DataSourceToken>,
        major: u64,
    ) {
        let Some(computed) = self.data_sources.get(name).map(|info| info.tok.clone()) else {
            return;
        };
        record_rename(name, hist, &computed, false, major);

        for alias in &hist.past {
            if alias.name == computed {
                continue;
            }
            if alias.major_version == major {
                debug!(data_source = name, legacy = %alias.name, "keeping deprecated legacy data source");
                self.rename_data_source(name, alias.name.clone(), computed.clone());
            } else if let Some(info) = self.data_sources.get_mut(name) {
                debug!(data_source = name, alias = %alias.name, "aliasing data source");
                push_unique(&mut info.aliases, alias.name.clone());
            }
        }
    }
}

/// Bootstrap or reconcile the history of every entry and return the names
/// of entries that already had history, in declaration order.
fn plan_entries<I: EntryInfo>(
    entries: &mut IndexMap<String, I>,
    schemas: &IndexMap<String, Schema>,
    legacy: &BTreeSet<String>,
    history: &mut BTreeMap<String, TokenHistory<I::Token>>,
    major: u64,
) -> Vec<String> {
    let mut known = Vec::new();

    for (name, entry) in entries.iter_mut() {
        if legacy.contains(name) {
            continue;
        }

        let hist = match history.entry(name.clone()) {
            Entry::Vacant(slot) => {
                debug!(entry = %name, token = %entry.token(), "recording new entry");
                slot.insert(TokenHistory::new(entry.token().clone()))
            },
            Entry::Occupied(slot) => {
                known.push(name.clone());
                slot.into_mut()
            },
        };

        let Some(schema) = schemas.get(name) else {
            debug!(entry = %name, "not in the live schema, leaving recorded fields alone");
            continue;
        };

        if hist.major_version < major {
            if !hist.fields.is_empty() {
                info!(
                    entry = %name,
                    from = hist.major_version,
                    to = major,
                    "new major version, releasing recorded collapse decisions"
                );
            }
            hist.major_version = major;
            hist.fields.clear();
        }

        reconcile_fields(ResourceSchema::from(schema), &mut hist.fields, entry.fields_mut());
    }

    known
}

/// Move `hist` to `computed`, retiring the previous token if it was not
/// retired already.
fn record_rename<T: Token>(
    name: &str,
    hist: &mut TokenHistory<T>,
    computed: &T,
    in_codegen: bool,
    major: u64,
) {
    if *computed == hist.current {
        return;
    }

    let previous = std::mem::replace(&mut hist.current, computed.clone());
    if hist.has_past(&previous) {
        debug!(entry = name, from = %previous, to = %computed, "token changed back, previous token already retired");
        return;
    }
    info!(entry = name, from = %previous, to = %computed, "token changed, recording alias");
    hist.past.push(AliasRecord {
        name: previous,
        in_codegen,
        major_version: major,
    });
}
