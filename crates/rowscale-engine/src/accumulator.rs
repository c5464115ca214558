//! Single-pass statistics over a dataset.
//!
//! [`StatisticsAccumulator`] visits each row once. For every cell it:
//!
//! 1. converts the value to a number (booleans to `0`/`1`, strings to their
//!    first-seen code, assigning new codes as strings appear)
//! 2. feeds the number to the statistics its column's policy asks for:
//!    - **Default**: the column's own min/max/mean/variance
//!    - **Grouped**: the shared min/max of the column's group
//!    - **Excluded**, **Custom range**: nothing
//!
//! The numeric rows are returned as they are produced so that the scaling
//! pass does not need to consult the encoders again.
//!
//! Encoders live inside the accumulator and are handed over when it is
//! finished; nothing outside the accumulation pass can extend them.

use std::collections::BTreeMap;

use rowscale_stats::running::RunningStats;

use crate::{
    encoder::CategoricalEncoder,
    error::ScaleError,
    policy::ColumnPolicy,
    schema::Schema,
    value::{Row, ValueType},
};

#[derive(Debug, Clone, Copy)]
enum StatsTarget {
    None,
    Own,
    Group(usize),
}

#[derive(Debug)]
pub struct StatisticsAccumulator<'a> {
    schema: &'a Schema,
    targets: Vec<StatsTarget>,
    column_stats: Vec<RunningStats>,
    group_names: Vec<String>,
    group_stats: Vec<RunningStats>,
    encoders: Vec<Option<CategoricalEncoder>>,
}

/// Output of [`StatisticsAccumulator::finish`].
#[derive(Debug, Clone)]
pub struct AccumulatedStatistics {
    /// Per-column statistics; only meaningful for default-policy columns.
    pub columns: Vec<RunningStats>,
    /// Shared statistics of each group.
    pub groups: BTreeMap<String, RunningStats>,
    /// Encoding table of each string column, `None` for other columns.
    pub encoders: Vec<Option<CategoricalEncoder>>,
}

impl<'a> StatisticsAccumulator<'a> {
    /// Prepares accumulation for `schema`, with `policies` aligned to its columns.
    #[must_use]
    pub fn new(schema: &'a Schema, policies: &[ColumnPolicy]) -> Self {
        debug_assert_eq!(schema.len(), policies.len());

        let mut group_names: Vec<String> = vec![];
        let targets = policies
            .iter()
            .map(|policy| match policy {
                ColumnPolicy::Default => StatsTarget::Own,
                ColumnPolicy::Grouped { group } => {
                    let index = group_names
                        .iter()
                        .position(|g| g == group)
                        .unwrap_or_else(|| {
                            group_names.push(group.clone());
                            group_names.len() - 1
                        });
                    StatsTarget::Group(index)
                }
                ColumnPolicy::Excluded | ColumnPolicy::CustomRange { .. } => StatsTarget::None,
            })
            .collect::<Vec<_>>();

        let encoders = schema
            .fields()
            .map(|f| (f.value_type == ValueType::String).then(CategoricalEncoder::new))
            .collect();

        Self {
            schema,
            column_stats: vec![RunningStats::new(); targets.len()],
            group_stats: vec![RunningStats::new(); group_names.len()],
            targets,
            group_names,
            encoders,
        }
    }

    /// Encodes one row and feeds it to the statistics; returns the numeric row.
    pub fn observe(&mut self, row_index: usize, row: &Row) -> Result<Vec<f64>, ScaleError> {
        let encoders = &mut self.encoders;
        let values = self.schema.numeric_row(row_index, row, |column, text| {
            Ok(encoders[column]
                .get_or_insert_with(CategoricalEncoder::new)
                .encode(text))
        })?;

        for (column, &value) in values.iter().enumerate() {
            match self.targets[column] {
                StatsTarget::None => {}
                StatsTarget::Own => self.column_stats[column].push(value),
                StatsTarget::Group(group) => self.group_stats[group].push(value),
            }
        }
        Ok(values)
    }

    #[must_use]
    pub fn finish(self) -> AccumulatedStatistics {
        AccumulatedStatistics {
            columns: self.column_stats,
            groups: self.group_names.into_iter().zip(self.group_stats).collect(),
            encoders: self.encoders,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::value::Value;

    fn rows() -> Vec<Row> {
        vec![
            Row::from_iter([
                ("open", Value::from(100.0)),
                ("high", Value::from(110.0)),
                ("low", Value::from(95.0)),
                ("side", Value::from("buy")),
            ]),
            Row::from_iter([
                ("open", Value::from(102.0)),
                ("high", Value::from(108.0)),
                ("low", Value::from(96.0)),
                ("side", Value::from("sell")),
            ]),
            Row::from_iter([
                ("open", Value::from(101.0)),
                ("high", Value::from(109.0)),
                ("low", Value::from(97.0)),
                ("side", Value::from("buy")),
            ]),
        ]
    }

    #[test]
    fn test_default_and_grouped_statistics() {
        let rows = rows();
        let schema = Schema::infer(&rows[0]);
        let policies = vec![
            ColumnPolicy::Default,
            ColumnPolicy::Grouped {
                group: "band".into(),
            },
            ColumnPolicy::Grouped {
                group: "band".into(),
            },
            ColumnPolicy::Default,
        ];
        let mut acc = StatisticsAccumulator::new(&schema, &policies);
        let numeric = rows
            .iter()
            .enumerate()
            .map(|(i, row)| acc.observe(i, row))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(numeric[1], [102.0, 108.0, 96.0, 1.0]);
        assert_eq!(numeric[2][3], 0.0);

        let stats = acc.finish();
        assert_eq!(stats.columns[0].min(), Some(100.0));
        assert_eq!(stats.columns[0].max(), Some(102.0));
        assert_abs_diff_eq!(stats.columns[0].mean(), 101.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.columns[0].sample_std_dev(), 1.0, epsilon = 1e-12);

        // grouped columns feed only the group
        assert_eq!(stats.columns[1].count(), 0);
        let band = &stats.groups["band"];
        assert_eq!(band.count(), 6);
        assert_eq!(band.min(), Some(95.0));
        assert_eq!(band.max(), Some(110.0));

        let side = stats.encoders[3].as_ref().unwrap();
        assert_eq!(side.code_of("buy"), Some(0));
        assert_eq!(side.code_of("sell"), Some(1));
        assert!(stats.encoders[0].is_none());
    }

    #[test]
    fn test_excluded_and_custom_collect_nothing() {
        let rows = rows();
        let schema = Schema::infer(&rows[0]);
        let policies = vec![
            ColumnPolicy::Excluded,
            ColumnPolicy::CustomRange {
                min: 0.0,
                max: 1000.0,
            },
            ColumnPolicy::Default,
            ColumnPolicy::Excluded,
        ];
        let mut acc = StatisticsAccumulator::new(&schema, &policies);
        for (i, row) in rows.iter().enumerate() {
            acc.observe(i, row).unwrap();
        }
        let stats = acc.finish();
        assert_eq!(stats.columns[0].count(), 0);
        assert_eq!(stats.columns[1].count(), 0);
        assert_eq!(stats.columns[2].count(), 3);
        assert!(stats.groups.is_empty());
        // excluded string columns are still encoded
        assert_eq!(stats.encoders[3].as_ref().unwrap().len(), 2);
    }
}
