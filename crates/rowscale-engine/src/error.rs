use crate::{
    options::ScalingLaw,
    policy::ColumnPolicy,
    value::ValueType,
};

/// Failure of a scaling, reuse or descaling operation.
///
/// Every variant is raised before any output is produced; the engine never
/// returns partial results.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ScaleError {
    #[display("schema mismatch: {_0}")]
    SchemaMismatch(SchemaMismatch),
    #[display("'{column}' in {option} is not a column of the input")]
    UnknownColumn {
        option: &'static str,
        column: String,
    },
    #[display("column '{column}' belongs to both group '{first_group}' and group '{second_group}'")]
    DuplicateGroupMembership {
        column: String,
        first_group: String,
        second_group: String,
    },
    #[display("column '{column}' cannot be both {first} and {second}")]
    ConflictingPolicy {
        column: String,
        first: &'static str,
        second: &'static str,
    },
    #[display("invalid {subject} [{min}, {max}]")]
    InvalidRange { subject: String, min: f64, max: f64 },
    #[display("invalid input type: {_0}")]
    InvalidInputType(InputTypeError),
    #[display("row {row}: value '{value}' of column '{column}' is not in the reused encoding table")]
    UnknownCategory {
        row: usize,
        column: String,
        value: String,
    },
    #[display("invalid config: {_0}")]
    InvalidConfig(ConfigError),
}

/// Disagreement between a dataset and the schema it is expected to follow.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SchemaMismatch {
    #[display("row {row} lacks column '{column}' present in the first row")]
    MissingColumn { row: usize, column: String },
    #[display("column order {found:?} differs from configured order {expected:?}")]
    ColumnOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[display("column '{column}' is {found} but the configuration expects {expected}")]
    ColumnType {
        column: String,
        expected: ValueType,
        found: ValueType,
    },
    #[display("repeat count of '{column}' is {found} but the configuration uses {expected}")]
    Repeat {
        column: String,
        expected: usize,
        found: usize,
    },
    #[display("group map differs from the configuration")]
    Groups,
    #[display("output range {found:?} differs from the configured {expected:?}")]
    Range {
        expected: [f64; 2],
        found: [f64; 2],
    },
    #[display("column '{column}' is {found:?} but the configuration has {expected:?}")]
    Policy {
        column: String,
        expected: ColumnPolicy,
        found: ColumnPolicy,
    },
    #[display("column '{column}' is forced to {forced} but the configuration uses {configured}")]
    ForcedLaw {
        column: String,
        configured: ScalingLaw,
        forced: ScalingLaw,
    },
    #[display("scaled row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("window {window} has {found} steps, expected {expected}")]
    WindowLength {
        window: usize,
        expected: usize,
        found: usize,
    },
}

/// A [`ScalingConfig`](crate::ScalingConfig) whose parts contradict each other.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("output range [{min}, {max}] is empty or not finite")]
    Range { min: f64, max: f64 },
    #[display("column '{column}' appears more than once")]
    DuplicateColumn { column: String },
    #[display("column '{column}' refers to group '{group}', which has no bounds")]
    UnknownGroup { column: String, group: String },
    #[display("string column '{column}' has no encoding table")]
    MissingEncoder { column: String },
    #[display("output key names {found:?} disagree with the column repeat counts {expected:?}")]
    OutputKeys {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// A value whose type cannot be used where it appears.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InputTypeError {
    #[display("row {row}: column '{column}' holds a {found}, but the first row holds a {expected}")]
    TypeChanged {
        row: usize,
        column: String,
        expected: ValueType,
        found: ValueType,
    },
    #[display("row {row}: column '{column}' holds a non-finite number")]
    NonFinite { row: usize, column: String },
    #[display("column '{column}' is a {found} column and cannot take a custom numeric range")]
    NonNumericCustomRange { column: String, found: ValueType },
}

/// A string-typed column whose reconstructed code has no entry in the encoding table.
///
/// Reported alongside descaled rows rather than raised: the affected cell
/// keeps the raw numeric value.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("row {row}: code {code} of column '{column}' matches no encoded string")]
pub struct UnknownStringOnDescale {
    pub row: usize,
    pub column: String,
    pub code: f64,
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ScaleError::ConflictingPolicy {
            column: "open".into(),
            first: "excluded",
            second: "grouped",
        };
        assert_eq!(
            err.to_string(),
            "column 'open' cannot be both excluded and grouped"
        );

        let err = ScaleError::SchemaMismatch(SchemaMismatch::MissingColumn {
            row: 3,
            column: "low".into(),
        });
        assert_eq!(
            err.to_string(),
            "schema mismatch: row 3 lacks column 'low' present in the first row"
        );
    }

    #[test]
    fn test_nested_errors_are_sources() {
        let err = ScaleError::InvalidInputType(InputTypeError::NonFinite {
            row: 0,
            column: "x".into(),
        });
        assert!(err.source().is_some());

        let err = ScaleError::InvalidRange {
            subject: "output range".into(),
            min: 1.0,
            max: 0.0,
        };
        assert!(err.source().is_none());
    }
}
