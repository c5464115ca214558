//! Forward transform: rows to a fixed-width scaled matrix plus its config.
//!
//! # Pipeline
//!
//! 1. Infer the schema (column order and types) from the first row
//! 2. Decide between a fresh run and reuse of `prev_config` ([`ScalePlan`])
//! 3. Fresh runs: validate policies, accumulate statistics in one pass and
//!    resolve each column's scaling law into a [`ScalingConfig`]
//! 4. Scale every row and repeat each column's value `repeat` times
//!
//! # Scaling law selection
//!
//! - excluded columns pass through
//! - custom-range and grouped columns always use min-max normalization
//! - other columns use `force_scaling` when given; otherwise normalization
//!   when their sample standard deviation is below `1` and standardization
//!   otherwise
//!
//! The automatic rule compares a unit-dependent quantity against a fixed
//! constant, so rescaling the raw data can flip the chosen law. It is kept
//! for compatibility with existing configs; pass `force_scaling` for a
//! scale-invariant choice.

use std::collections::BTreeMap;

use rowscale_stats::running::RunningStats;

use crate::{
    accumulator::{AccumulatedStatistics, StatisticsAccumulator},
    config::{ColumnConfig, ColumnScaling, ScalingConfig},
    error::ScaleError,
    options::{MinMax, ScalingLaw, ScalingOptions},
    policy::{ColumnPolicy, check_output_range, resolve_policies},
    schema::Schema,
    value::Row,
};

/// Scaled matrix and the config that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledOutput {
    /// One row per input row, `config.output_width()` values each.
    pub scaled: Vec<Vec<f64>>,
    pub config: ScalingConfig,
}

/// How a scaling run obtains its statistics.
#[derive(Debug)]
enum ScalePlan<'a> {
    /// Compute everything from the rows, under these validated policies.
    Fresh(Vec<ColumnPolicy>),
    /// Apply an existing config whose schema has been checked against the rows.
    Reused(&'a ScalingConfig),
}

impl<'a> ScalePlan<'a> {
    fn resolve(schema: &Schema, options: &'a ScalingOptions) -> Result<Self, ScaleError> {
        match &options.prev_config {
            Some(config) => {
                config.check_schema(schema, Some(options))?;
                Ok(ScalePlan::Reused(config))
            }
            None => {
                let columns = schema.names().map(str::to_owned).collect::<Vec<_>>();
                Ok(ScalePlan::Fresh(resolve_policies(&columns, options)?))
            }
        }
    }
}

/// Scales `rows` according to `options`.
///
/// Row order and count are preserved. When `options.prev_config` is set the
/// rows are scaled with that config's statistics and encoders, and the
/// returned config is a copy of it. The other options must then describe the
/// same run as the config; see [`ScalingOptions::reusing`].
///
/// # Errors
///
/// Any [`ScaleError`]; validation failures are reported before any row is read.
///
/// # Example
///
/// ```
/// use rowscale_engine::{Row, ScalingLaw, ScalingOptions, scale_rows};
///
/// let rows = vec![
///     Row::from_iter([("open", 100.0), ("high", 110.0), ("low", 95.0)]),
///     Row::from_iter([("open", 102.0), ("high", 108.0), ("low", 96.0)]),
/// ];
/// let options = ScalingOptions::new()
///     .with_force_scaling(ScalingLaw::Normalization)
///     .with_group("band", ["high", "low"]);
/// let output = scale_rows(&rows, &options)?;
///
/// assert_eq!(output.scaled[0][0], 0.0); // open: (100 - 100) / (102 - 100)
/// assert_eq!(output.scaled[1][0], 1.0);
/// assert_eq!(output.scaled[0][2], 0.0); // low: (95 - 95) / 15
/// assert_eq!(output.scaled[0][1], 1.0); // high: (110 - 95) / 15
/// # Ok::<(), rowscale_engine::ScaleError>(())
/// ```
pub fn scale_rows(rows: &[Row], options: &ScalingOptions) -> Result<ScaledOutput, ScaleError> {
    let Some(first) = rows.first() else {
        let config = match &options.prev_config {
            Some(config) => {
                config
                    .check_consistency()
                    .map_err(ScaleError::InvalidConfig)?;
                config.clone()
            }
            None => {
                check_output_range(options.minmax_range)?;
                ScalingConfig::empty(options.minmax_range)
            }
        };
        return Ok(ScaledOutput {
            scaled: vec![],
            config,
        });
    };

    let schema = Schema::infer(first);
    match ScalePlan::resolve(&schema, options)? {
        ScalePlan::Fresh(policies) => scale_fresh(rows, &schema, policies, options),
        ScalePlan::Reused(config) => {
            log::debug!(
                "scaling {} rows with a reused config of {} columns",
                rows.len(),
                config.columns.len()
            );
            let numeric = config.encode_rows(&schema, rows)?;
            Ok(ScaledOutput {
                scaled: config.scale_numeric(&numeric),
                config: config.clone(),
            })
        }
    }
}

fn scale_fresh(
    rows: &[Row],
    schema: &Schema,
    policies: Vec<ColumnPolicy>,
    options: &ScalingOptions,
) -> Result<ScaledOutput, ScaleError> {
    let mut accumulator = StatisticsAccumulator::new(schema, &policies);
    let numeric = rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| accumulator.observe(row_index, row))
        .collect::<Result<Vec<_>, _>>()?;
    let stats = accumulator.finish();

    let config = build_config(schema, policies, stats, options)?;
    log::debug!(
        "scaled {} rows: {} input columns, {} output columns",
        rows.len(),
        config.columns.len(),
        config.output_width()
    );
    Ok(ScaledOutput {
        scaled: config.scale_numeric(&numeric),
        config,
    })
}

fn build_config(
    schema: &Schema,
    policies: Vec<ColumnPolicy>,
    stats: AccumulatedStatistics,
    options: &ScalingOptions,
) -> Result<ScalingConfig, ScaleError> {
    let groups = stats
        .groups
        .iter()
        .map(|(name, group)| (name.clone(), observed_bounds(group)))
        .collect::<BTreeMap<_, _>>();

    let mut columns = Vec::with_capacity(schema.len());
    let mut output_key_names = vec![];
    let column_parts = schema
        .fields()
        .zip(policies)
        .zip(stats.columns.iter().zip(stats.encoders));
    for ((field, policy), (column_stats, encoder)) in column_parts {
        let scaling = match &policy {
            ColumnPolicy::Excluded => ColumnScaling::PassThrough,
            ColumnPolicy::CustomRange { min, max } => ColumnScaling::Normalization {
                min: *min,
                max: *max,
            },
            ColumnPolicy::Grouped { group } => {
                let MinMax { min, max } = groups[group];
                ColumnScaling::Normalization { min, max }
            }
            ColumnPolicy::Default => default_scaling(column_stats, options.force_scaling),
        };
        log::debug!(
            "column '{}' ({}, {}): {scaling:?}",
            field.name,
            field.value_type,
            policy.name(),
        );

        let repeat = options.repeat_of(&field.name);
        output_key_names.extend(std::iter::repeat_n(field.name.clone(), repeat.get()));

        let column = ColumnConfig {
            name: field.name.clone(),
            input_type: field.value_type,
            policy,
            repeat,
            scaling,
            encoder,
        };
        column.check_policy_type()?;
        columns.push(column);
    }

    let [range_min, range_max] = options.minmax_range;
    Ok(ScalingConfig {
        range_min,
        range_max,
        columns,
        groups,
        output_key_names,
    })
}

fn default_scaling(stats: &RunningStats, force: Option<ScalingLaw>) -> ColumnScaling {
    let std = stats.sample_std_dev();
    let law = force.unwrap_or(if std < 1.0 {
        ScalingLaw::Normalization
    } else {
        ScalingLaw::Standardization
    });
    match law {
        ScalingLaw::Normalization => {
            let MinMax { min, max } = observed_bounds(stats);
            ColumnScaling::Normalization { min, max }
        }
        ScalingLaw::Standardization => ColumnScaling::Standardization {
            mean: stats.mean(),
            std,
        },
    }
}

fn observed_bounds(stats: &RunningStats) -> MinMax {
    // accumulators always see at least one row here
    MinMax::new(
        stats.min().unwrap_or_default(),
        stats.max().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        error::{InputTypeError, SchemaMismatch},
        value::Value,
    };

    fn ohlc() -> Vec<Row> {
        vec![
            Row::from_iter([("open", 100.0), ("high", 110.0), ("low", 95.0)]),
            Row::from_iter([("open", 102.0), ("high", 108.0), ("low", 96.0)]),
        ]
    }

    fn column(output: &ScaledOutput, index: usize) -> Vec<f64> {
        output.scaled.iter().map(|row| row[index]).collect()
    }

    #[test]
    fn test_independent_min_max() {
        let options = ScalingOptions::new().with_force_scaling(ScalingLaw::Normalization);
        let output = scale_rows(&ohlc(), &options).unwrap();
        assert_eq!(column(&output, 0), [0.0, 1.0]);
        assert_eq!(column(&output, 1), [1.0, 0.0]);
        assert_eq!(column(&output, 2), [0.0, 1.0]);
        assert_eq!(output.config.output_key_names, ["open", "high", "low"]);
    }

    #[test]
    fn test_automatic_law_uses_standard_deviation() {
        // open: std = sqrt(2) >= 1 -> standardization; flag: std < 1 -> normalization
        let rows = vec![
            Row::from_iter([("open", Value::from(100.0)), ("flag", Value::from(true))]),
            Row::from_iter([("open", Value::from(102.0)), ("flag", Value::from(false))]),
        ];
        let output = scale_rows(&rows, &ScalingOptions::default()).unwrap();
        let open = &output.config.columns[0].scaling;
        assert_eq!(open.law(), Some(ScalingLaw::Standardization));
        assert_abs_diff_eq!(output.scaled[0][0], -std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_eq!(
            output.config.columns[1].scaling,
            ColumnScaling::Normalization { min: 0.0, max: 1.0 }
        );
        assert_eq!(column(&output, 1), [1.0, 0.0]);
    }

    #[test]
    fn test_forced_standardization_skips_grouped_columns() {
        let options = ScalingOptions::new()
            .with_force_scaling(ScalingLaw::Standardization)
            .with_group("band", ["high", "low"]);
        let output = scale_rows(&ohlc(), &options).unwrap();
        let laws = output
            .config
            .columns
            .iter()
            .map(|c| c.scaling.law())
            .collect::<Vec<_>>();
        assert_eq!(
            laws,
            [
                Some(ScalingLaw::Standardization),
                Some(ScalingLaw::Normalization),
                Some(ScalingLaw::Normalization),
            ]
        );
    }

    #[test]
    fn test_custom_output_range() {
        let options = ScalingOptions::new()
            .with_force_scaling(ScalingLaw::Normalization)
            .with_minmax_range(-1.0, 1.0);
        let output = scale_rows(&ohlc(), &options).unwrap();
        assert_eq!(column(&output, 0), [-1.0, 1.0]);
    }

    #[test]
    fn test_custom_range_is_not_recomputed() {
        let options = ScalingOptions::new().with_custom_range("open", 0.0, 200.0);
        let output = scale_rows(&ohlc(), &options).unwrap();
        assert_eq!(column(&output, 0), [0.5, 0.51]);
        assert_eq!(
            output.config.columns[0].scaling,
            ColumnScaling::Normalization {
                min: 0.0,
                max: 200.0
            }
        );
    }

    #[test]
    fn test_degenerate_column_maps_to_range_min() {
        let rows = vec![
            Row::from_iter([("c", 5.0)]),
            Row::from_iter([("c", 5.0)]),
        ];
        let options = ScalingOptions::new().with_minmax_range(-1.0, 1.0);
        let output = scale_rows(&rows, &options).unwrap();
        assert_eq!(output.scaled, [[-1.0], [-1.0]]);
    }

    #[test]
    fn test_repetition_is_contiguous() {
        let options = ScalingOptions::new()
            .with_force_scaling(ScalingLaw::Normalization)
            .with_repeat("open", NonZeroUsize::new(3).unwrap())
            .with_repeat("low", NonZeroUsize::new(2).unwrap());
        let output = scale_rows(&ohlc(), &options).unwrap();
        assert_eq!(
            output.config.output_key_names,
            ["open", "open", "open", "high", "low", "low"]
        );
        assert_eq!(output.scaled[1], [1.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_empty_input() {
        let output = scale_rows(&[], &ScalingOptions::default()).unwrap();
        assert!(output.scaled.is_empty());
        assert!(output.config.columns.is_empty());
        assert_eq!(output.config.output_width(), 0);

        let options = ScalingOptions::new().with_minmax_range(1.0, 0.0);
        assert!(matches!(
            scale_rows(&[], &options),
            Err(ScaleError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_validation_precedes_data() {
        // the second row is malformed, but the policy conflict is reported first
        let rows = vec![
            Row::from_iter([("open", 100.0), ("high", 110.0), ("low", 95.0)]),
            Row::from_iter([("open", 102.0)]),
        ];
        let options = ScalingOptions::new()
            .with_exclude("high")
            .with_group("band", ["high", "low"]);
        let err = scale_rows(&rows, &options).unwrap_err();
        assert!(matches!(err, ScaleError::ConflictingPolicy { .. }));
    }

    #[test]
    fn test_missing_key_in_later_row() {
        let rows = vec![
            Row::from_iter([("open", 100.0), ("high", 110.0)]),
            Row::from_iter([("open", 102.0)]),
        ];
        let err = scale_rows(&rows, &ScalingOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ScaleError::SchemaMismatch(SchemaMismatch::MissingColumn {
                row: 1,
                column: "high".into()
            })
        );
    }

    #[test]
    fn test_custom_range_on_string_column() {
        let rows = vec![Row::from_iter([("side", "buy")])];
        let options = ScalingOptions::new().with_custom_range("side", 0.0, 1.0);
        let err = scale_rows(&rows, &options).unwrap_err();
        assert!(matches!(
            err,
            ScaleError::InvalidInputType(InputTypeError::NonNumericCustomRange { .. })
        ));
    }

    #[test]
    fn test_reused_config_keeps_statistics() {
        let options = ScalingOptions::new().with_force_scaling(ScalingLaw::Normalization);
        let first = scale_rows(&ohlc(), &options).unwrap();
        let new_rows = vec![Row::from_iter([("open", 101.0), ("high", 109.0), ("low", 97.0)])];
        let options = ScalingOptions::new().with_prev_config(first.config.clone());
        let second = scale_rows(&new_rows, &options).unwrap();
        assert_eq!(second.config, first.config);
        assert_eq!(second.scaled, [[0.5, 0.5, 2.0]]);
        assert_eq!(first.config.transform(&new_rows).unwrap(), second.scaled);
    }

    #[test]
    fn test_reused_config_rejects_schema_changes() {
        let first = scale_rows(&ohlc(), &ScalingOptions::default()).unwrap();

        let reordered = vec![Row::from_iter([("high", 1.0), ("open", 1.0), ("low", 1.0)])];
        let options = ScalingOptions::new().with_prev_config(first.config.clone());
        assert!(matches!(
            scale_rows(&reordered, &options),
            Err(ScaleError::SchemaMismatch(SchemaMismatch::ColumnOrder { .. }))
        ));

        let options = ScalingOptions::new()
            .with_prev_config(first.config.clone())
            .with_repeat("open", NonZeroUsize::new(2).unwrap());
        assert!(matches!(
            scale_rows(&ohlc(), &options),
            Err(ScaleError::SchemaMismatch(SchemaMismatch::Repeat { .. }))
        ));

        let options = ScalingOptions::new()
            .with_prev_config(first.config)
            .with_group("band", ["high", "low"]);
        assert_eq!(
            scale_rows(&ohlc(), &options).unwrap_err(),
            ScaleError::SchemaMismatch(SchemaMismatch::Groups)
        );
    }

    #[test]
    fn test_reused_config_rejects_unseen_category() {
        let rows = vec![Row::from_iter([("side", "buy")]), Row::from_iter([("side", "sell")])];
        let first = scale_rows(&rows, &ScalingOptions::default()).unwrap();
        let options = ScalingOptions::new().with_prev_config(first.config);
        let err = scale_rows(&[Row::from_iter([("side", "hold")])], &options).unwrap_err();
        assert_eq!(
            err,
            ScaleError::UnknownCategory {
                row: 0,
                column: "side".into(),
                value: "hold".into()
            }
        );
    }

    #[test]
    fn test_reused_config_rejects_contradicting_options() {
        let options = ScalingOptions::new()
            .with_force_scaling(ScalingLaw::Normalization)
            .with_repeat("open", NonZeroUsize::new(3).unwrap())
            .with_custom_range("low", 90.0, 120.0);
        let first = scale_rows(&ohlc(), &options).unwrap();
        let reusing = || ScalingOptions::reusing(first.config.clone());

        assert_eq!(scale_rows(&ohlc(), &reusing()).unwrap(), first);
        let forced = reusing().with_force_scaling(ScalingLaw::Normalization);
        assert_eq!(scale_rows(&ohlc(), &forced).unwrap(), first);

        let mut without_custom = reusing();
        without_custom.custom_min_max_ranges.clear();
        let cases = [
            (
                ScalingOptions::new().with_prev_config(first.config.clone()),
                SchemaMismatch::Repeat {
                    column: "open".into(),
                    expected: 3,
                    found: 1,
                },
            ),
            (
                reusing().with_minmax_range(-5.0, 5.0),
                SchemaMismatch::Range {
                    expected: [0.0, 1.0],
                    found: [-5.0, 5.0],
                },
            ),
            (
                reusing().with_exclude("open"),
                SchemaMismatch::Policy {
                    column: "open".into(),
                    expected: ColumnPolicy::Default,
                    found: ColumnPolicy::Excluded,
                },
            ),
            (
                reusing().with_custom_range("low", 0.0, 200.0),
                SchemaMismatch::Policy {
                    column: "low".into(),
                    expected: ColumnPolicy::CustomRange {
                        min: 90.0,
                        max: 120.0,
                    },
                    found: ColumnPolicy::CustomRange {
                        min: 0.0,
                        max: 200.0,
                    },
                },
            ),
            (
                without_custom,
                SchemaMismatch::Policy {
                    column: "low".into(),
                    expected: ColumnPolicy::CustomRange {
                        min: 90.0,
                        max: 120.0,
                    },
                    found: ColumnPolicy::Default,
                },
            ),
            (
                reusing().with_force_scaling(ScalingLaw::Standardization),
                SchemaMismatch::ForcedLaw {
                    column: "open".into(),
                    configured: ScalingLaw::Normalization,
                    forced: ScalingLaw::Standardization,
                },
            ),
        ];
        for (options, expected) in cases {
            assert_eq!(
                scale_rows(&ohlc(), &options).unwrap_err(),
                ScaleError::SchemaMismatch(expected)
            );
        }
    }
}
