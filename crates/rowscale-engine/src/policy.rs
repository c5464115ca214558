//! Column policy resolution and validation.
//!
//! Every input column is assigned exactly one [`ColumnPolicy`]:
//!
//! - **Excluded**: passes through unscaled
//! - **Custom range**: scaled with caller-supplied fixed bounds
//! - **Grouped**: shares one min/max with the other members of its group
//! - **Default**: scaled with its own observed statistics
//!
//! [`resolve_policies`] checks the options against the input columns and
//! rejects any configuration where a column would fall under more than one
//! policy. It reads nothing but the column names, so a misconfiguration is
//! reported before any row is visited.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::ScaleError,
    group::GroupResolver,
    options::{MinMax, ScalingOptions},
};

/// The single policy governing how a column is scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ColumnPolicy {
    Default,
    Excluded,
    CustomRange { min: f64, max: f64 },
    Grouped { group: String },
}

impl ColumnPolicy {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ColumnPolicy::Default => "default",
            ColumnPolicy::Excluded => "excluded",
            ColumnPolicy::CustomRange { .. } => "custom-ranged",
            ColumnPolicy::Grouped { .. } => "grouped",
        }
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        match self {
            ColumnPolicy::Grouped { group } => Some(group),
            _ => None,
        }
    }
}

/// Validates `options` against `columns` and returns one policy per column, in column order.
///
/// # Errors
///
/// - [`ScaleError::InvalidRange`] if the output range is empty or inverted,
///   or a custom range has `min > max`
/// - [`ScaleError::UnknownColumn`] if any option names a column not in `columns`
/// - [`ScaleError::DuplicateGroupMembership`] if a column is in two groups
/// - [`ScaleError::ConflictingPolicy`] if a column is in more than one of
///   excluded, custom-ranged and grouped
pub fn resolve_policies(
    columns: &[String],
    options: &ScalingOptions,
) -> Result<Vec<ColumnPolicy>, ScaleError> {
    check_output_range(options.minmax_range)?;

    let known = columns.iter().map(String::as_str).collect::<BTreeSet<_>>();
    check_known("excludes", options.excludes.iter(), &known)?;
    check_known(
        "customMinMaxRanges",
        options.custom_min_max_ranges.keys(),
        &known,
    )?;
    check_known("groups", options.groups.values().flatten(), &known)?;
    check_known("repeat", options.repeat.keys(), &known)?;

    let groups = GroupResolver::new(&options.groups)?;

    columns
        .iter()
        .map(|column| resolve_column(column, options, &groups))
        .collect()
}

pub(crate) fn check_output_range([min, max]: [f64; 2]) -> Result<(), ScaleError> {
    // written so that NaN bounds are rejected too
    if min < max && min.is_finite() && max.is_finite() {
        Ok(())
    } else {
        Err(ScaleError::InvalidRange {
            subject: "output range".to_owned(),
            min,
            max,
        })
    }
}

fn check_known<'a, I>(
    option: &'static str,
    names: I,
    known: &BTreeSet<&str>,
) -> Result<(), ScaleError>
where
    I: IntoIterator<Item = &'a String>,
{
    match names.into_iter().find(|name| !known.contains(name.as_str())) {
        Some(column) => Err(ScaleError::UnknownColumn {
            option,
            column: column.clone(),
        }),
        None => Ok(()),
    }
}

fn resolve_column(
    column: &str,
    options: &ScalingOptions,
    groups: &GroupResolver,
) -> Result<ColumnPolicy, ScaleError> {
    let excluded = options.excludes.contains(column);
    let custom = options.custom_min_max_ranges.get(column);
    let group = groups.group_of(column);

    let conflict = |first, second| ScaleError::ConflictingPolicy {
        column: column.to_owned(),
        first,
        second,
    };

    match (excluded, custom, group) {
        (true, _, Some(_)) => Err(conflict("excluded", "grouped")),
        (true, Some(_), None) => Err(conflict("excluded", "custom-ranged")),
        (false, Some(_), Some(_)) => Err(conflict("custom-ranged", "grouped")),
        (true, None, None) => Ok(ColumnPolicy::Excluded),
        (false, Some(range), None) => custom_range_policy(column, *range),
        (false, None, Some(group)) => Ok(ColumnPolicy::Grouped {
            group: group.to_owned(),
        }),
        (false, None, None) => Ok(ColumnPolicy::Default),
    }
}

fn custom_range_policy(
    column: &str,
    MinMax { min, max }: MinMax,
) -> Result<ColumnPolicy, ScaleError> {
    if min <= max && min.is_finite() && max.is_finite() {
        Ok(ColumnPolicy::CustomRange { min, max })
    } else {
        Err(ScaleError::InvalidRange {
            subject: format!("custom range of '{column}'"),
            min,
            max,
        })
    }
}

/// Group membership implied by a list of policies, keyed by group name.
pub(crate) fn group_map<'a, I>(policies: I) -> BTreeMap<String, BTreeSet<String>>
where
    I: IntoIterator<Item = (&'a str, &'a ColumnPolicy)>,
{
    let mut groups = BTreeMap::<String, BTreeSet<String>>::new();
    for (column, policy) in policies {
        if let Some(group) = policy.group() {
            groups
                .entry(group.to_owned())
                .or_default()
                .insert(column.to_owned());
        }
    }
    groups
}
