//! Inverse transform: scaled rows back to named, typed rows.
//!
//! For each input column recorded in the config, the repeated output
//! positions are averaged, the column's scaling law is inverted and the
//! result is mapped back to the column's input type. String columns are
//! reverse-looked-up in their encoding table; codes with no entry keep the
//! numeric value and are reported in [`Descaled::unmatched`].

use std::num::NonZeroUsize;

use crate::{
    config::{ColumnConfig, ScalingConfig},
    error::{ScaleError, SchemaMismatch, UnknownStringOnDescale},
    value::{Row, Value, ValueType},
    window::collapse_time_steps,
};

/// Distance from an integer within which a reconstructed value still
/// counts as that integer's category code.
const CODE_TOLERANCE: f64 = 1e-6;

/// Reconstructed rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Descaled {
    /// One row per scaled row, columns in the config's input order.
    pub rows: Vec<Row>,
    /// String cells whose code matched no encoded value.
    pub unmatched: Vec<UnknownStringOnDescale>,
}

/// Inverts [`scale_rows`](crate::scale_rows) using the config it returned.
///
/// # Errors
///
/// - [`ScaleError::InvalidConfig`] if the config fails [`ScalingConfig::check_consistency`]
/// - [`SchemaMismatch::RowWidth`] if a row's length differs from the config's output width
///
/// # Example
///
/// ```
/// use rowscale_engine::{Row, ScalingOptions, Value, descale, scale_rows};
///
/// let rows = vec![
///     Row::from_iter([("price", Value::from(1.5)), ("side", Value::from("buy"))]),
///     Row::from_iter([("price", Value::from(1.2)), ("side", Value::from("sell"))]),
/// ];
/// let output = scale_rows(&rows, &ScalingOptions::default())?;
/// let descaled = descale(&output.scaled, &output.config)?;
///
/// assert_eq!(descaled.rows[1].get("side"), Some(&Value::from("sell")));
/// assert!(descaled.unmatched.is_empty());
/// # Ok::<(), rowscale_engine::ScaleError>(())
/// ```
pub fn descale(scaled: &[Vec<f64>], config: &ScalingConfig) -> Result<Descaled, ScaleError> {
    config
        .check_consistency()
        .map_err(ScaleError::InvalidConfig)?;
    let width = config.output_width();
    let range = config.range();
    let mut descaled = Descaled {
        rows: Vec::with_capacity(scaled.len()),
        unmatched: vec![],
    };

    for (row_index, values) in scaled.iter().enumerate() {
        if values.len() != width {
            return Err(ScaleError::SchemaMismatch(SchemaMismatch::RowWidth {
                row: row_index,
                expected: width,
                found: values.len(),
            }));
        }

        let mut row = Row::with_capacity(config.columns.len());
        let mut offset = 0;
        for column in &config.columns {
            let repeat = column.repeat.get();
            let run = &values[offset..offset + repeat];
            offset += repeat;

            #[expect(clippy::cast_precision_loss)]
            let average = run.iter().sum::<f64>() / repeat as f64;
            let value = column.scaling.invert(average, range);
            let value = restore_type(column, value).unwrap_or_else(|| {
                let miss = UnknownStringOnDescale {
                    row: row_index,
                    column: column.name.clone(),
                    code: value,
                };
                log::warn!("{miss}");
                descaled.unmatched.push(miss);
                Value::Number(value)
            });
            row.insert(column.name.clone(), value);
        }
        descaled.rows.push(row);
    }

    log::debug!(
        "descaled {} rows ({} unmatched string cells)",
        descaled.rows.len(),
        descaled.unmatched.len()
    );
    Ok(descaled)
}

/// Collapses windows made with `time_steps` back to one row per step, then descales.
///
/// # Errors
///
/// [`SchemaMismatch::WindowLength`] for a malformed window, otherwise as [`descale`].
pub fn descale_time_steps(
    windows: &[Vec<Vec<f64>>],
    config: &ScalingConfig,
    time_steps: NonZeroUsize,
) -> Result<Descaled, ScaleError> {
    let rows = collapse_time_steps(windows, time_steps)?;
    descale(&rows, config)
}

/// Maps a reconstructed number back to the column's input type.
///
/// Returns `None` only for a string column whose code has no entry.
fn restore_type(column: &ColumnConfig, value: f64) -> Option<Value> {
    match column.input_type {
        ValueType::Number => Some(Value::Number(value)),
        ValueType::Boolean => Some(match value.round() {
            r if r == 0.0 => Value::Bool(false),
            r if r == 1.0 => Value::Bool(true),
            _ => Value::Number(value),
        }),
        ValueType::String => column
            .encoder
            .as_ref()
            .and_then(|encoder| encoder.decode_numeric(value, CODE_TOLERANCE))
            .map(Value::from),
    }
}
