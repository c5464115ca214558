//! Pairwise correlation report over raw rows.

use std::{collections::BTreeSet, fmt};

use rowscale_engine::{Row, ScaleError, Schema, ValueType};
use rowscale_stats::correlation::CorrelationMatrix;
use serde::Serialize;

use crate::{error::DatasetError, split::split_at_ratio};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnPair {
    pub first: String,
    pub second: String,
    pub coefficient: f64,
}

/// Column pairs partitioned by a correlation threshold.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CorrelationReport {
    pub threshold: f64,
    pub rows: usize,
    /// Pairs with `r < threshold`.
    pub low: Vec<ColumnPair>,
    /// Pairs with `r >= threshold`.
    pub high: Vec<ColumnPair>,
}

impl CorrelationReport {
    /// Correlates every pair of numeric, non-excluded columns over the first
    /// `floor(rows.len() * split)` rows.
    ///
    /// Columns are taken from the first row. Fewer than two rows give an
    /// empty report. Pairs involving a constant column are left out.
    pub fn analyze(
        rows: &[Row],
        split: f64,
        excludes: &BTreeSet<String>,
        threshold: f64,
    ) -> Result<Self, DatasetError> {
        let (rows, _) = split_at_ratio(rows, split)?;
        let mut report = Self {
            threshold,
            rows: rows.len(),
            ..Self::default()
        };
        let Some(first) = rows.first().filter(|_| rows.len() >= 2) else {
            return Ok(report);
        };

        let numeric = first
            .iter()
            .filter(|(name, value)| {
                value.value_type() == ValueType::Number && !excludes.contains(*name)
            })
            .map(|(name, value)| (name, value.clone()))
            .collect::<Row>();
        let schema = Schema::infer(&numeric);
        let names = schema.names().collect::<Vec<_>>();

        let matrix_rows = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                // the schema has no string columns, so nothing is ever encoded
                schema.numeric_row(index, row, |_, text| {
                    Err(ScaleError::UnknownCategory {
                        row: index,
                        column: String::new(),
                        value: text.to_owned(),
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let matrix =
            CorrelationMatrix::from_rows(names.len(), matrix_rows.iter().map(Vec::as_slice));

        for pair in matrix.pairs() {
            let entry = ColumnPair {
                first: names[pair.first].to_owned(),
                second: names[pair.second].to_owned(),
                coefficient: pair.coefficient,
            };
            if entry.coefficient < threshold {
                report.low.push(entry);
            } else {
                report.high.push(entry);
            }
        }
        log::debug!(
            "correlated {} columns over {} rows: {} low, {} high",
            names.len(),
            report.rows,
            report.low.len(),
            report.high.len()
        );
        Ok(report)
    }
}

impl fmt::Display for CorrelationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Low Correlation Pairs (< {}):", self.threshold)?;
        for pair in &self.low {
            write!(f, "\n{} - {}: {}", pair.first, pair.second, pair.coefficient)?;
        }
        write!(f, "\n---\nHigh Correlation Pairs (>= {}):", self.threshold)?;
        for pair in &self.high {
            write!(f, "\n{} - {}: {}", pair.first, pair.second, pair.coefficient)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rowscale_engine::Value;

    use super::*;

    fn rows() -> Vec<Row> {
        (0..10)
            .map(|i| {
                let t = f64::from(i);
                Row::from_iter([
                    ("t", Value::from(t)),
                    ("up", Value::from(2.0 * t + 1.0)),
                    ("down", Value::from(-t)),
                    ("label", Value::from(if i % 2 == 0 { "even" } else { "odd" })),
                ])
            })
            .collect()
    }

    #[test]
    fn test_partition_by_threshold() {
        let report = CorrelationReport::analyze(&rows(), 1.0, &BTreeSet::new(), 0.5).unwrap();
        assert_eq!(report.rows, 10);
        let high = report
            .high
            .iter()
            .map(|p| (p.first.as_str(), p.second.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(high, [("t", "up")]);
        assert_eq!(report.low.len(), 2);
        assert_abs_diff_eq!(report.low[0].coefficient, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_excludes_and_split() {
        let excludes = BTreeSet::from(["down".to_owned()]);
        let report = CorrelationReport::analyze(&rows(), 0.5, &excludes, 0.5).unwrap();
        assert_eq!(report.rows, 5);
        assert!(report.low.is_empty());
        assert_eq!(report.high.len(), 1);
    }

    #[test]
    fn test_too_few_rows() {
        let report = CorrelationReport::analyze(&rows(), 0.1, &BTreeSet::new(), 0.5).unwrap();
        assert_eq!(report.rows, 1);
        assert!(report.low.is_empty() && report.high.is_empty());
    }

    #[test]
    fn test_display() {
        let report = CorrelationReport::analyze(&rows(), 1.0, &BTreeSet::new(), 0.5).unwrap();
        let text = report.to_string();
        assert!(text.starts_with("Low Correlation Pairs (< 0.5):\nt - down: "));
        assert!(text.contains("\n---\nHigh Correlation Pairs (>= 0.5):\nt - up: "));
    }
}
