//! Pinning of single-item collapse decisions.
//!
//! A list or set field bounded to one element is published as a single value.
//! If upstream later lifts that bound, republishing the field as a list would
//! break every program written against the scalar form. So the decision made
//! for each field is recorded in the alias history and replayed into the
//! override tree until the next major version.
//!
//! For every list or set field, exactly one of these applies:
//!
//! 1. An explicit override already decides it: the history is updated to
//!    match, so the next run remembers the author's choice.
//! 2. The history decided it: the decision is written into the override tree.
//! 3. Neither: the current schema decides it, and that is recorded.
//!
//! Nodes created while walking are dropped again unless something below them
//! was recorded. An empty override node is not harmless: it tells downstream
//! passes such as [`crate::info::ProviderInfo::set_autonaming`] that the field
//! was customized.

use std::collections::BTreeMap;

use crate::history::FieldHistory;
use crate::info::SchemaInfo;
use crate::walk::{ElemSchema, FieldSchema, ResourceSchema};

/// Whether `field` is projected as a single value.
///
/// An explicit `max_items_one` in `info` wins; otherwise list and set fields
/// with a `max_items` bound of exactly 1 collapse.
pub fn is_max_items_one(field: Option<FieldSchema<'_>>, info: Option<&SchemaInfo>) -> bool {
    if let Some(forced) = info.and_then(|info| info.max_items_one) {
        return forced;
    }
    match field {
        Some(field) => field.kind().is_collection() && field.max_items() == 1,
        None => false,
    }
}

/// Reconcile the collapse decisions for every field of `resource`.
///
/// `history` and `overrides` are the field maps at the same level of the
/// tree; both are updated in place. Entries for fields no longer in the
/// schema are left untouched.
pub fn reconcile_fields(
    resource: ResourceSchema<'_>,
    history: &mut BTreeMap<String, FieldHistory>,
    overrides: &mut BTreeMap<String, SchemaInfo>,
) {
    for (name, field) in resource.fields() {
        let (hist, info) = reconcile_field(field, history.remove(name), overrides.remove(name));
        if let Some(hist) = hist {
            history.insert(name.to_string(), hist);
        }
        if let Some(info) = info {
            overrides.insert(name.to_string(), info);
        }
    }
}

/// Reconcile one field. A node comes back if it was passed in or if
/// anything was recorded in it.
fn reconcile_field(
    field: FieldSchema<'_>,
    history: Option<FieldHistory>,
    overrides: Option<SchemaInfo>,
) -> (Option<FieldHistory>, Option<SchemaInfo>) {
    let mut keep_hist = history.is_some();
    let mut keep_info = overrides.is_some();
    let mut hist = history.unwrap_or_default();
    let mut info = overrides.unwrap_or_default();

    if field.kind().is_collection() {
        match (info.max_items_one, hist.max_items_one) {
            (Some(forced), _) => {
                hist.max_items_one = Some(forced);
                keep_hist = true;
            },
            (None, Some(recorded)) => {
                info.max_items_one = Some(recorded);
                keep_info = true;
            },
            (None, None) => {
                hist.max_items_one = Some(is_max_items_one(Some(field), Some(&info)));
                keep_hist = true;
            },
        }
    }

    match field.elem() {
        Some(ElemSchema::Resource(resource)) => {
            let had_hist = hist.elem.is_some();
            let had_info = info.elem.is_some();
            let mut elem_hist = hist.elem.take().unwrap_or_default();
            let mut elem_info = info.elem.take().unwrap_or_default();

            reconcile_fields(resource, &mut elem_hist.fields, &mut elem_info.fields);

            if had_hist || !elem_hist.fields.is_empty() {
                hist.elem = Some(elem_hist);
                keep_hist = true;
            }
            if had_info || !elem_info.fields.is_empty() {
                info.elem = Some(elem_info);
                keep_info = true;
            }
        },
        Some(ElemSchema::Field(elem)) => {
            let (elem_hist, elem_info) =
                reconcile_field(elem, hist.elem.take().map(|h| *h), info.elem.take().map(|i| *i));
            if let Some(elem_hist) = elem_hist {
                hist.elem = Some(Box::new(elem_hist));
                keep_hist = true;
            }
            if let Some(elem_info) = elem_info {
                info.elem = Some(Box::new(elem_info));
                keep_info = true;
            }
        },
        None => {},
    }

    (keep_hist.then_some(hist), keep_info.then_some(info))
}
