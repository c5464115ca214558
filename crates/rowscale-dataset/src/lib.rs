//! Dataset assembly around the rowscale scaling engine.
//!
//! The engine scales and descales rows; this crate supplies the steps that
//! surround it when preparing model inputs:
//!
//! - [`training`]: extract X/Y rows from arbitrary records, scale them,
//!   shuffle, split, balance and window them
//! - [`split`]: order-preserving train/test split by ratio
//! - [`shuffle`]: Fisher-Yates shuffles, including paired X/Y shuffles
//! - [`balance`]: label-based over- and undersampling
//! - [`correlation`]: pairwise Pearson report over raw rows
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use rowscale_dataset::training::{Samples, TrainingSetBuilder};
//! use rowscale_engine::Row;
//!
//! let prices = [10.0, 11.0, 10.5, 12.0, 12.5, 11.5];
//! let set = TrainingSetBuilder::new(
//!     &prices,
//!     |p: &[f64], i| Some(Row::from_iter([("price", p[i])])),
//!     |p: &[f64], i| p.get(i + 1).map(|next| Row::from_iter([("next", *next)])),
//! )
//! .with_split(0.6)
//! .build(&mut Pcg32::seed_from_u64(0))?;
//!
//! assert_eq!(set.train_x.len(), 3);
//! assert_eq!(set.test_x.len(), 2);
//! assert!(matches!(set.train_x, Samples::Flat(_)));
//! # Ok::<(), rowscale_dataset::DatasetError>(())
//! ```

pub use self::error::DatasetError;

pub mod balance;
pub mod correlation;
mod error;
pub mod shuffle;
pub mod split;
pub mod training;
