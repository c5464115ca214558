//! Serializable record of a scaling run.
//!
//! A [`ScalingConfig`] holds everything needed to repeat a scaling run on new
//! data or to invert it: the output range, each column's type, policy,
//! repetition count and resolved scaling law, the shared group bounds and the
//! categorical encoding tables.
//!
//! The config is produced once by [`scale_rows`](crate::scale_rows)
//! and is read-only afterwards. Reusing it (through
//! [`ScalingOptions::prev_config`](crate::ScalingOptions::prev_config) or
//! [`ScalingConfig::transform`]) never alters it, so one config can be shared
//! by any number of independent transforms.

use std::{
    collections::{BTreeMap, BTreeSet},
    num::NonZeroUsize,
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    encoder::CategoricalEncoder,
    error::{ConfigError, InputTypeError, ScaleError, SchemaMismatch},
    options::{MinMax, ScalingLaw, ScalingOptions},
    policy::{self, ColumnPolicy},
    schema::Schema,
    value::{Row, ValueType},
};

/// Scaling state of a whole dataset.
///
/// Deserializing checks the config with [`Self::check_consistency`], so a
/// hand-edited file whose parts disagree is rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingConfig {
    pub range_min: f64,
    pub range_max: f64,
    /// One entry per input column, in input order.
    pub columns: Vec<ColumnConfig>,
    /// Shared bounds of each group.
    pub groups: BTreeMap<String, MinMax>,
    /// Input column name of every output position, after repetition.
    pub output_key_names: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScalingConfigFields {
    range_min: f64,
    range_max: f64,
    columns: Vec<ColumnConfig>,
    groups: BTreeMap<String, MinMax>,
    output_key_names: Vec<String>,
}

impl<'de> Deserialize<'de> for ScalingConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ScalingConfigFields {
            range_min,
            range_max,
            columns,
            groups,
            output_key_names,
        } = ScalingConfigFields::deserialize(deserializer)?;
        let config = Self {
            range_min,
            range_max,
            columns,
            groups,
            output_key_names,
        };
        config.check_consistency().map_err(serde::de::Error::custom)?;
        Ok(config)
    }
}

/// Scaling state of one input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub name: String,
    pub input_type: ValueType,
    pub policy: ColumnPolicy,
    pub repeat: NonZeroUsize,
    pub scaling: ColumnScaling,
    /// Encoding table, present for string columns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoder: Option<CategoricalEncoder>,
}

/// Resolved transform of a column: which law, with which parameters.
///
/// Resolving this once per column lets the per-cell transform dispatch on a
/// single tag instead of re-checking policy membership.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "approach", rename_all = "camelCase")]
pub enum ColumnScaling {
    PassThrough,
    Normalization { min: f64, max: f64 },
    Standardization { mean: f64, std: f64 },
}

impl ColumnScaling {
    #[must_use]
    pub fn law(&self) -> Option<ScalingLaw> {
        match self {
            ColumnScaling::PassThrough => None,
            ColumnScaling::Normalization { .. } => Some(ScalingLaw::Normalization),
            ColumnScaling::Standardization { .. } => Some(ScalingLaw::Standardization),
        }
    }

    /// Scales `value` into the output space.
    ///
    /// - normalization: `range_min + (value - min) / (max - min) * (range_max - range_min)`,
    ///   or `range_min` when `max == min`
    /// - standardization: `(value - mean) / std`, or `0` when `std == 0`
    #[must_use]
    pub fn apply(&self, value: f64, [range_min, range_max]: [f64; 2]) -> f64 {
        match *self {
            ColumnScaling::PassThrough => value,
            ColumnScaling::Normalization { min, max } => {
                if max == min {
                    range_min
                } else {
                    range_min + (value - min) / (max - min) * (range_max - range_min)
                }
            }
            ColumnScaling::Standardization { mean, std } => {
                if std == 0.0 {
                    0.0
                } else {
                    (value - mean) / std
                }
            }
        }
    }

    /// Inverse of [`Self::apply`].
    ///
    /// Degenerate columns invert to their only observed value (`min` or `mean`).
    #[must_use]
    pub fn invert(&self, scaled: f64, [range_min, range_max]: [f64; 2]) -> f64 {
        match *self {
            ColumnScaling::PassThrough => scaled,
            ColumnScaling::Normalization { min, max } => {
                min + (scaled - range_min) / (range_max - range_min) * (max - min)
            }
            ColumnScaling::Standardization { mean, std } => scaled * std + mean,
        }
    }
}

impl ScalingConfig {
    /// Config of an empty dataset: no columns, no outputs.
    #[must_use]
    pub fn empty([range_min, range_max]: [f64; 2]) -> Self {
        Self {
            range_min,
            range_max,
            columns: vec![],
            groups: BTreeMap::new(),
            output_key_names: vec![],
        }
    }

    #[must_use]
    pub fn range(&self) -> [f64; 2] {
        [self.range_min, self.range_max]
    }

    /// Width of a scaled row, the sum of all repeat counts.
    #[must_use]
    pub fn output_width(&self) -> usize {
        self.output_key_names.len()
    }

    /// Input column names in input order.
    pub fn input_key_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnConfig> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Group membership recorded in this config.
    #[must_use]
    pub fn group_map(&self) -> BTreeMap<String, BTreeSet<String>> {
        policy::group_map(self.columns.iter().map(|c| (c.name.as_str(), &c.policy)))
    }

    /// Checks that the parts of this config agree with each other.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Range`] if the output range is empty, inverted or not finite
    /// - [`ConfigError::DuplicateColumn`] if two columns share a name
    /// - [`ConfigError::UnknownGroup`] if a grouped column's group has no bounds
    /// - [`ConfigError::MissingEncoder`] if a string column has no encoding table
    /// - [`ConfigError::OutputKeys`] if the output key names are not each
    ///   column's name repeated `repeat` times, in column order
    pub fn check_consistency(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.range_min, self.range_max);
        if !(min < max && min.is_finite() && max.is_finite()) {
            return Err(ConfigError::Range { min, max });
        }

        let mut names = BTreeSet::new();
        for column in &self.columns {
            if !names.insert(column.name.as_str()) {
                return Err(ConfigError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
            if let Some(group) = column.policy.group() {
                if !self.groups.contains_key(group) {
                    return Err(ConfigError::UnknownGroup {
                        column: column.name.clone(),
                        group: group.to_owned(),
                    });
                }
            }
            if column.input_type == ValueType::String && column.encoder.is_none() {
                return Err(ConfigError::MissingEncoder {
                    column: column.name.clone(),
                });
            }
        }

        let expected = self
            .columns
            .iter()
            .flat_map(|c| std::iter::repeat_n(c.name.as_str(), c.repeat.get()));
        if !expected.clone().eq(self.output_key_names.iter().map(String::as_str)) {
            return Err(ConfigError::OutputKeys {
                expected: expected.map(str::to_owned).collect(),
                found: self.output_key_names.clone(),
            });
        }
        Ok(())
    }

    /// Scales new rows with this config's statistics and encoders, leaving it untouched.
    ///
    /// # Errors
    ///
    /// - [`ScaleError::InvalidConfig`] if this config fails [`Self::check_consistency`]
    /// - [`ScaleError::SchemaMismatch`] if the rows' columns differ from the config's
    /// - [`ScaleError::InvalidInputType`] if a value's type differs from the config's
    /// - [`ScaleError::UnknownCategory`] if a string was never seen when the config was built
    pub fn transform(&self, rows: &[Row]) -> Result<Vec<Vec<f64>>, ScaleError> {
        let Some(first) = rows.first() else {
            return Ok(vec![]);
        };
        let schema = Schema::infer(first);
        self.check_schema(&schema, None)?;
        let numeric = self.encode_rows(&schema, rows)?;
        Ok(self.scale_numeric(&numeric))
    }

    /// Checks that a new dataset (and, if given, the options it is scaled with)
    /// agrees with this config.
    ///
    /// The rows must have the configured column order and types. The options
    /// must describe the same run: output range, repeat map, group map, every
    /// column's policy and, when set, the forced law of default columns.
    /// [`ScalingOptions::reusing`] builds options that always agree.
    pub(crate) fn check_schema(
        &self,
        schema: &Schema,
        options: Option<&ScalingOptions>,
    ) -> Result<(), ScaleError> {
        let mismatch = |m| Err(ScaleError::SchemaMismatch(m));

        self.check_consistency().map_err(ScaleError::InvalidConfig)?;
        if !self.input_key_names().eq(schema.names()) {
            return mismatch(SchemaMismatch::ColumnOrder {
                expected: self.input_key_names().map(str::to_owned).collect(),
                found: schema.names().map(str::to_owned).collect(),
            });
        }
        for (column, field) in self.columns.iter().zip(schema.fields()) {
            if column.input_type != field.value_type {
                return mismatch(SchemaMismatch::ColumnType {
                    column: column.name.clone(),
                    expected: column.input_type,
                    found: field.value_type,
                });
            }
        }

        let Some(options) = options else {
            return Ok(());
        };
        let names = self.input_key_names().map(str::to_owned).collect::<Vec<_>>();
        let policies = policy::resolve_policies(&names, options)?;

        if options.minmax_range != self.range() {
            return mismatch(SchemaMismatch::Range {
                expected: self.range(),
                found: options.minmax_range,
            });
        }
        for column in &self.columns {
            let found = options.repeat_of(&column.name);
            if found != column.repeat {
                return mismatch(SchemaMismatch::Repeat {
                    column: column.name.clone(),
                    expected: column.repeat.get(),
                    found: found.get(),
                });
            }
        }
        if options.groups != self.group_map() {
            return mismatch(SchemaMismatch::Groups);
        }
        for (column, found) in self.columns.iter().zip(policies) {
            if column.policy != found {
                return mismatch(SchemaMismatch::Policy {
                    column: column.name.clone(),
                    expected: column.policy.clone(),
                    found,
                });
            }
        }
        if let Some(forced) = options.force_scaling {
            for column in self.columns.iter().filter(|c| c.policy.is_default()) {
                match column.scaling.law() {
                    Some(configured) if configured != forced => {
                        return mismatch(SchemaMismatch::ForcedLaw {
                            column: column.name.clone(),
                            configured,
                            forced,
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Converts rows to numbers using the recorded encoders, without extending them.
    pub(crate) fn encode_rows(
        &self,
        schema: &Schema,
        rows: &[Row],
    ) -> Result<Vec<Vec<f64>>, ScaleError> {
        rows.iter()
            .enumerate()
            .map(|(row_index, row)| {
                schema.numeric_row(row_index, row, |column, text| {
                    self.columns[column]
                        .encoder
                        .as_ref()
                        .and_then(|encoder| encoder.code_of(text))
                        .ok_or_else(|| ScaleError::UnknownCategory {
                            row: row_index,
                            column: self.columns[column].name.clone(),
                            value: text.to_owned(),
                        })
                })
            })
            .collect()
    }

    /// Applies each column's scaling and repetition to already-numeric rows.
    pub(crate) fn scale_numeric(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let range = self.range();
        let width = self.output_width();
        rows.iter()
            .map(|values| {
                let mut scaled = Vec::with_capacity(width);
                for (column, &value) in self.columns.iter().zip(values) {
                    let value = column.scaling.apply(value, range);
                    scaled.extend(std::iter::repeat_n(value, column.repeat.get()));
                }
                scaled
            })
            .collect()
    }
}

impl ColumnConfig {
    /// Rejects a custom numeric range on a string column.
    pub(crate) fn check_policy_type(&self) -> Result<(), ScaleError> {
        if self.policy.is_custom_range() && self.input_type == ValueType::String {
            return Err(ScaleError::InvalidInputType(
                InputTypeError::NonNumericCustomRange {
                    column: self.name.clone(),
                    found: self.input_type,
                },
            ));
        }
        Ok(())
    }
}
