//! User-facing configuration surface of a scaling run.

use std::{
    collections::{BTreeMap, BTreeSet},
    num::NonZeroUsize,
};

use serde::{Deserialize, Serialize};

use crate::{config::ScalingConfig, policy::ColumnPolicy};

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Scaling law applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum ScalingLaw {
    /// Min-max rescaling into the output range.
    #[display("normalization")]
    Normalization,
    /// Z-score, `(value - mean) / std`.
    #[display("standardization")]
    Standardization,
}

/// Options recognized by [`scale_rows`](crate::scale_rows).
///
/// Deserializes from camelCase JSON where every field is optional:
///
/// ```
/// use rowscale_engine::ScalingOptions;
///
/// let options: ScalingOptions = serde_json::from_str(
///     r#"{ "minmaxRange": [-1, 1], "groups": { "band": ["high", "low"] }, "excludes": ["date"] }"#,
/// )
/// .unwrap();
/// assert_eq!(options.minmax_range, [-1.0, 1.0]);
/// assert!(options.excludes.contains("date"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScalingOptions {
    /// Output interval `[rangeMin, rangeMax]` for normalization.
    pub minmax_range: [f64; 2],
    /// Number of output copies per column; columns not listed get one.
    pub repeat: BTreeMap<String, NonZeroUsize>,
    /// Named column sets sharing one min/max.
    pub groups: BTreeMap<String, BTreeSet<String>>,
    /// Columns passed through unscaled.
    pub excludes: BTreeSet<String>,
    /// Fixed external bounds per column, never updated from data.
    pub custom_min_max_ranges: BTreeMap<String, MinMax>,
    /// Scaling law for every non-grouped column, instead of the automatic choice.
    pub force_scaling: Option<ScalingLaw>,
    /// Previously produced configuration to scale consistently with.
    pub prev_config: Option<ScalingConfig>,
}

impl Default for ScalingOptions {
    fn default() -> Self {
        Self {
            minmax_range: [0.0, 1.0],
            repeat: BTreeMap::new(),
            groups: BTreeMap::new(),
            excludes: BTreeSet::new(),
            custom_min_max_ranges: BTreeMap::new(),
            force_scaling: None,
            prev_config: None,
        }
    }
}

impl ScalingOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_minmax_range(mut self, min: f64, max: f64) -> Self {
        self.minmax_range = [min, max];
        self
    }

    #[must_use]
    pub fn with_repeat(mut self, column: impl Into<String>, count: NonZeroUsize) -> Self {
        self.repeat.insert(column.into(), count);
        self
    }

    #[must_use]
    pub fn with_group<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(name.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_exclude(mut self, column: impl Into<String>) -> Self {
        self.excludes.insert(column.into());
        self
    }

    #[must_use]
    pub fn with_custom_range(mut self, column: impl Into<String>, min: f64, max: f64) -> Self {
        self.custom_min_max_ranges
            .insert(column.into(), MinMax::new(min, max));
        self
    }

    #[must_use]
    pub fn with_force_scaling(mut self, law: ScalingLaw) -> Self {
        self.force_scaling = Some(law);
        self
    }

    #[must_use]
    pub fn with_prev_config(mut self, config: ScalingConfig) -> Self {
        self.prev_config = Some(config);
        self
    }

    /// Options that describe exactly the run recorded in `config`, with
    /// `config` as `prev_config`.
    ///
    /// Reuse rejects options that contradict the config, so this is the
    /// usual way to scale new rows like an earlier dataset.
    #[must_use]
    pub fn reusing(config: ScalingConfig) -> Self {
        let mut options = Self::new().with_minmax_range(config.range_min, config.range_max);
        options.groups = config.group_map();
        for column in &config.columns {
            if column.repeat != NonZeroUsize::MIN {
                options.repeat.insert(column.name.clone(), column.repeat);
            }
            match column.policy {
                ColumnPolicy::Excluded => {
                    options.excludes.insert(column.name.clone());
                }
                ColumnPolicy::CustomRange { min, max } => {
                    options
                        .custom_min_max_ranges
                        .insert(column.name.clone(), MinMax::new(min, max));
                }
                ColumnPolicy::Default | ColumnPolicy::Grouped { .. } => {}
            }
        }
        options.with_prev_config(config)
    }

    /// Repeat count of `column`, defaulting to one.
    #[must_use]
    pub fn repeat_of(&self, column: &str) -> NonZeroUsize {
        self.repeat.get(column).copied().unwrap_or(NonZeroUsize::MIN)
    }
}
