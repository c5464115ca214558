//! Reversible feature scaling for tabular rows.
//!
//! This crate turns rows of named scalar values into a fixed-width numeric
//! matrix suitable for model training, and records every decision it makes
//! in a serializable [`ScalingConfig`] so the transform can be repeated on new
//! data or inverted.
//!
//! # Pipeline
//!
//! ```text
//! rows + ScalingOptions
//!     ↓ resolve_policies       (column names only, fails before any row is read)
//! one ColumnPolicy per column
//!     ↓ StatisticsAccumulator  (single pass: min/max/mean/std, string codes)
//! ScalingConfig
//!     ↓ scale_rows             (normalize / standardize, repeat columns)
//! scaled matrix  ──descale──→  rows
//! ```
//!
//! # Column policies
//!
//! Each column is governed by exactly one [`ColumnPolicy`]:
//!
//! - **Default**: scaled with its own statistics
//! - **Excluded**: passes through unscaled
//! - **Custom range**: normalized with caller-supplied bounds
//! - **Grouped**: normalized with bounds shared across the group
//!
//! Strings are encoded as integers in first-seen order and booleans as `0`/`1`
//! before any statistic is taken; [`descale`] maps both back.
//!
//! # Example
//!
//! ```
//! use rowscale_engine::{Row, ScalingOptions, descale, scale_rows};
//!
//! let rows = vec![
//!     Row::from_iter([("open", 100.0), ("high", 110.0), ("low", 95.0)]),
//!     Row::from_iter([("open", 102.0), ("high", 108.0), ("low", 96.0)]),
//! ];
//! let options = ScalingOptions::new().with_exclude("open");
//! let output = scale_rows(&rows, &options)?;
//! assert_eq!(output.scaled[1][0], 102.0);
//!
//! let restored = descale(&output.scaled, &output.config)?;
//! assert_eq!(restored.rows[0].get("open"), rows[0].get("open"));
//! # Ok::<(), rowscale_engine::ScaleError>(())
//! ```

pub use self::{
    accumulator::{AccumulatedStatistics, StatisticsAccumulator},
    config::{ColumnConfig, ColumnScaling, ScalingConfig},
    descale::{Descaled, descale, descale_time_steps},
    encoder::{CategoricalEncoder, DuplicateCategoryError},
    error::{ConfigError, InputTypeError, ScaleError, SchemaMismatch, UnknownStringOnDescale},
    group::GroupResolver,
    options::{MinMax, ScalingLaw, ScalingOptions},
    policy::{ColumnPolicy, resolve_policies},
    scale::{ScaledOutput, scale_rows},
    schema::{Field, Schema},
    value::{Row, Value, ValueType},
};

mod accumulator;
mod config;
mod descale;
mod encoder;
mod error;
mod group;
mod options;
mod policy;
mod scale;
mod schema;
mod value;
pub mod window;
