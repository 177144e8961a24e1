//! Pooling map construction
//!
//! Groups candidate variables into pooled biomarkers using nothing but their
//! labels. Variables pool together when their analyte names normalize to the
//! same key and their units fall in the same compatibility class; each member
//! receives the factor that converts its values into the pooled unit.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::algorithm::labels::{SplitLabel, normalize_base_name, split_label};
use crate::algorithm::units::{conversion_factor, normalize_unit, parse_unit_signature};
use crate::models::manifest::{ManifestRow, RawVariable};
use crate::models::pooling::{ConversionStatus, PoolingEntry, PoolingMap};

/// A variable with a code and a human-written label
pub trait LabeledVariable {
    fn variable_name(&self) -> &str;
    fn variable_desc(&self) -> &str;
    fn is_blood_candidate(&self) -> bool;
}

impl LabeledVariable for ManifestRow {
    fn variable_name(&self) -> &str {
        &self.variable_name
    }
    fn variable_desc(&self) -> &str {
        &self.variable_desc
    }
    fn is_blood_candidate(&self) -> bool {
        self.is_blood_candidate
    }
}

impl LabeledVariable for RawVariable {
    fn variable_name(&self) -> &str {
        &self.variable_name
    }
    fn variable_desc(&self) -> &str {
        &self.variable_desc
    }
    fn is_blood_candidate(&self) -> bool {
        self.is_blood_candidate
    }
}

/// The description chosen to stand for a variable, with its parsed parts
#[derive(Debug, Clone)]
struct Representative {
    variable_name: String,
    variable_desc: String,
    support: usize,
    label: SplitLabel,
    base_key: String,
    compat_key: String,
}

impl Representative {
    fn new(variable_name: String, variable_desc: String, support: usize) -> Self {
        let label = split_label(&variable_desc);
        let base_key = normalize_base_name(&label.base);
        let compat_key = compat_key_for(&label.unit);
        Self {
            variable_name,
            variable_desc,
            support,
            label,
            base_key,
            compat_key,
        }
    }
}

/// Compatibility class of a raw unit
///
/// `{base}/vol` for units inside the grammar, otherwise `raw:{normalized}`.
/// Empty units land in their own `raw:` bucket.
#[must_use]
pub fn compat_key_for(unit: &str) -> String {
    parse_unit_signature(unit)
        .map(|sig| sig.compat_key())
        .unwrap_or_else(|| format!("raw:{}", normalize_unit(unit)))
}

/// Pick one description per variable: the most frequent, first seen on ties
fn representatives<'a, V>(variables: impl IntoIterator<Item = &'a V>) -> Vec<Representative>
where
    V: LabeledVariable + 'a,
{
    // (name, desc) -> (count, first position)
    let mut counts: FxHashMap<(&str, &str), (usize, usize)> = FxHashMap::default();
    for (position, var) in variables
        .into_iter()
        .filter(|v| v.is_blood_candidate())
        .enumerate()
    {
        counts
            .entry((var.variable_name(), var.variable_desc()))
            .or_insert((0, position))
            .0 += 1;
    }

    counts
        .into_iter()
        .map(|((name, desc), (count, first))| (name, desc, count, first))
        .sorted_by_key(|&(name, _, count, first)| (name, Reverse(count), first))
        .unique_by(|&(name, ..)| name)
        .map(|(name, desc, count, _)| {
            Representative::new(name.to_string(), desc.to_string(), count)
        })
        .collect()
}

/// Build the pooling map from candidate variables
///
/// Only blood candidates are considered. Output entries are ordered by
/// `base_key`, then `compat_key`, then variable name.
pub fn build_pooling_map<'a, V>(variables: impl IntoIterator<Item = &'a V>) -> PoolingMap
where
    V: LabeledVariable + 'a,
{
    let reps = representatives(variables);

    let mut by_base: BTreeMap<&str, BTreeMap<&str, Vec<&Representative>>> = BTreeMap::new();
    for rep in &reps {
        by_base
            .entry(rep.base_key.as_str())
            .or_default()
            .entry(rep.compat_key.as_str())
            .or_default()
            .push(rep);
    }

    let mut entries = Vec::with_capacity(reps.len());
    for (base_key, by_compat) in by_base {
        let multi_compat = by_compat.len() > 1;
        for (compat_key, group) in by_compat {
            // `group` is in variable-name order, so the first maximum is stable
            let Some(reference) = group.iter().copied().min_by_key(|r| Reverse(r.support)) else {
                continue;
            };
            let ref_unit = reference.label.unit.trim();
            let ref_base = reference.label.base.trim();

            let pooled_id = if multi_compat {
                let unit_suffix = normalize_unit(ref_unit);
                let suffix = if unit_suffix.is_empty() {
                    compat_key.replace(':', "_")
                } else {
                    unit_suffix
                };
                format!("{base_key}__{suffix}")
            } else {
                base_key.to_string()
            };

            let pooled_name = if ref_unit.is_empty() {
                ref_base.to_string()
            } else {
                format!("{ref_base} ({ref_unit})")
            };

            for member in group {
                let (factor, status) = member_conversion(member.label.unit.trim(), ref_unit);
                if status == ConversionStatus::Unreconciled {
                    warn!(
                        "Unit '{}' of {} could not be reconciled with pooled unit '{}' of {}; \
                         using factor 1.0",
                        member.label.unit,
                        member.variable_name,
                        ref_unit,
                        pooled_id
                    );
                }
                entries.push(PoolingEntry {
                    variable_name: member.variable_name.clone(),
                    variable_desc: member.variable_desc.clone(),
                    base_key: base_key.to_string(),
                    compat_key: compat_key.to_string(),
                    pooled_id: pooled_id.clone(),
                    pooled_name: pooled_name.clone(),
                    pooled_unit: ref_unit.to_string(),
                    conversion_factor_to_pooled_unit: factor,
                    conversion_status: status,
                });
            }
        }
    }

    debug!(
        "Pooled {} variables into {} biomarkers",
        entries.len(),
        entries.iter().map(|e| e.pooled_id.as_str()).unique().count()
    );
    PoolingMap::new(entries)
}

fn member_conversion(src_unit: &str, ref_unit: &str) -> (f64, ConversionStatus) {
    if src_unit.is_empty()
        || ref_unit.is_empty()
        || normalize_unit(src_unit) == normalize_unit(ref_unit)
    {
        return (1.0, ConversionStatus::Identity);
    }
    match conversion_factor(src_unit, ref_unit) {
        Some(factor) => (factor, ConversionStatus::Converted),
        None => (1.0, ConversionStatus::Unreconciled),
    }
}
