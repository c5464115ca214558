//! Streaming numeric statistics for the rowscale workspace.
//!
//! This crate provides the small, dependency-free statistical building blocks
//! used by the scaling engine and its collaborators:
//!
//! - **Running statistics**: single-pass min, max, mean and variance using
//!   Welford's online update, with a merge step for combining partial results
//! - **Correlation**: single-pass Pearson correlation over a set of columns
//!
//! # Modules
//!
//! - [`running`]: [`running::RunningStats`] accumulator
//! - [`correlation`]: [`correlation::CorrelationMatrix`] for pairwise Pearson coefficients
//!
//! # Examples
//!
//! ## Accumulating statistics in one pass
//!
//! ```
//! use rowscale_stats::running::RunningStats;
//!
//! let stats: RunningStats = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
//! assert_eq!(stats.min(), Some(2.0));
//! assert_eq!(stats.max(), Some(9.0));
//! assert!((stats.mean() - 5.0).abs() < 1e-12);
//! assert!((stats.sample_std_dev() - 2.138_089_935_299_395).abs() < 1e-12);
//! ```
//!
//! ## Computing pairwise correlation
//!
//! ```
//! use rowscale_stats::correlation::CorrelationMatrix;
//!
//! let rows = [[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
//! let matrix = CorrelationMatrix::from_rows(2, rows.iter().map(|r| r.as_slice()));
//! assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
//! ```

pub mod correlation;
pub mod running;
