//! The major-version gate.
//!
//! Hard aliases and collapse decisions are deferred breaking changes: they
//! hold for the rest of the major version they were recorded in and are
//! released at the next one. The gate is the major version the current run
//! belongs to.

use std::borrow::Cow;

use crate::error::{BridgeError, Result};
use crate::history::AliasHistory;

/// Resolve the major version for this run.
///
/// An explicit version decides on its own and must parse as a semantic
/// version (a leading `v` and missing minor/patch parts are accepted). A
/// provider without a version is assumed to be at the most recent major
/// version recorded in `history`, so it never drops an alias.
pub fn resolve_major_version(version: Option<&str>, history: &AliasHistory) -> Result<u64> {
    match version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(version) => parse_major(version),
        None => Ok(history.max_major_version()),
    }
}

fn parse_major(version: &str) -> Result<u64> {
    let bare = version.strip_prefix('v').unwrap_or(version);
    semver::Version::parse(&pad_core(bare))
        .map(|parsed| parsed.major)
        .map_err(|source| BridgeError::InvalidVersion {
            version: version.to_string(),
            source,
        })
}

/// Fill in missing minor and patch components: `1` and `1.2` become `1.0.0` and `1.2.0`.
fn pad_core(version: &str) -> Cow<'_, str> {
    let core_end = version
        .find(|c| c == '-' || c == '+')
        .unwrap_or(version.len());
    let (core, rest) = version.split_at(core_end);
    match core.split('.').count() {
        1 => Cow::Owned(format!("{}.0.0{}", core, rest)),
        2 => Cow::Owned(format!("{}.0{}", core, rest)),
        _ => Cow::Borrowed(version),
    }
}
