//! Assembly of scaled training and production sets from source records.
//!
//! # Training pipeline
//!
//! 1. **Extract**: for every source index, the X and Y extractors each build
//!    a [`Row`]; indices where either returns `None`, or the validator
//!    rejects the pair, are dropped
//! 2. **Scale**: X and Y are scaled independently; Y uses only the output
//!    range and forced law of the options, since the column options name X
//!    columns
//! 3. **Shuffle** (optional): X/Y pairs are permuted jointly
//! 4. **Split**: the first `floor(n * split)` pairs train, the rest test
//! 5. **Balance** (optional): the training partition is over- or undersampled
//! 6. **Window**: with `time_steps > 0` each partition becomes overlapping windows

use std::num::NonZeroUsize;

use rand::Rng;
use rowscale_engine::{Row, ScalingConfig, ScalingOptions, scale_rows, window::to_time_steps};
use serde::Serialize;

use crate::{balance::Balancing, error::DatasetError, shuffle::shuffle_pairs, split::split_at_ratio};

/// Builds one row from the whole source slice and an index into it.
pub type Extractor<'a, T> = Box<dyn Fn(&[T], usize) -> Option<Row> + 'a>;

/// Decides whether an extracted X/Y pair is kept.
pub type Validator<'a> = Box<dyn Fn(&Row, &Row) -> bool + 'a>;

/// Scaled samples, flat or grouped into time-step windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Samples {
    Flat(Vec<Vec<f64>>),
    Windowed(Vec<Vec<Vec<f64>>>),
}

impl Samples {
    /// Windows `rows` when `time_steps > 0`, otherwise keeps them flat.
    #[must_use]
    pub fn new(rows: Vec<Vec<f64>>, time_steps: usize) -> Self {
        match NonZeroUsize::new(time_steps) {
            Some(steps) => Samples::Windowed(to_time_steps(&rows, steps)),
            None => Samples::Flat(rows),
        }
    }

    /// Number of samples (rows or windows).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Samples::Flat(rows) => rows.len(),
            Samples::Windowed(windows) => windows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSet {
    pub train_x: Samples,
    pub train_y: Samples,
    pub test_x: Samples,
    pub test_y: Samples,
    pub x_config: ScalingConfig,
    pub y_config: ScalingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSet {
    pub x: Samples,
    pub x_config: ScalingConfig,
}

pub struct TrainingSetBuilder<'a, T> {
    source: &'a [T],
    x_extractor: Extractor<'a, T>,
    y_extractor: Extractor<'a, T>,
    validator: Option<Validator<'a>>,
    options: ScalingOptions,
    split: f64,
    time_steps: usize,
    shuffle: bool,
    balancing: Option<Balancing>,
}

impl<'a, T> TrainingSetBuilder<'a, T> {
    /// Starts a training set over `source` with a split ratio of `0.8`.
    pub fn new<FX, FY>(source: &'a [T], x_extractor: FX, y_extractor: FY) -> Self
    where
        FX: Fn(&[T], usize) -> Option<Row> + 'a,
        FY: Fn(&[T], usize) -> Option<Row> + 'a,
    {
        Self {
            source,
            x_extractor: Box::new(x_extractor),
            y_extractor: Box::new(y_extractor),
            validator: None,
            options: ScalingOptions::default(),
            split: 0.8,
            time_steps: 0,
            shuffle: false,
            balancing: None,
        }
    }

    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Row, &Row) -> bool + 'a,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Scaling options for X; Y inherits only the range and forced law.
    #[must_use]
    pub fn with_options(mut self, options: ScalingOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_split(mut self, split: f64) -> Self {
        self.split = split;
        self
    }

    /// Window length; `0` keeps samples flat.
    #[must_use]
    pub fn with_time_steps(mut self, time_steps: usize) -> Self {
        self.time_steps = time_steps;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_balancing(mut self, balancing: Option<Balancing>) -> Self {
        self.balancing = balancing;
        self
    }

    /// Runs the pipeline; `rng` is only drawn from when shuffling.
    pub fn build<R>(self, rng: &mut R) -> Result<TrainingSet, DatasetError>
    where
        R: Rng + ?Sized,
    {
        if !(0.0..=1.0).contains(&self.split) {
            return Err(DatasetError::InvalidSplit { ratio: self.split });
        }

        let (x_rows, y_rows) = self.extract();
        let x = scale_rows(&x_rows, &self.options)?;
        let y = scale_rows(&y_rows, &target_options(&self.options))?;
        log::debug!(
            "extracted {} of {} source records ({} X columns, {} Y columns)",
            x_rows.len(),
            self.source.len(),
            x.config.output_width(),
            y.config.output_width()
        );

        let (x_scaled, y_scaled) = if self.shuffle {
            shuffle_pairs(x.scaled, y.scaled, rng)?
        } else {
            (x.scaled, y.scaled)
        };

        let (train_x, test_x) = split_at_ratio(&x_scaled, self.split)?;
        let (train_y, test_y) = split_at_ratio(&y_scaled, self.split)?;
        let (train_x, train_y) = match self.balancing {
            Some(balancing) => {
                if self.time_steps > 0 {
                    log::warn!("{balancing} reorders training rows before windowing");
                }
                balancing.apply(train_x, train_y)?
            }
            None => (train_x.to_vec(), train_y.to_vec()),
        };

        if self.time_steps > train_x.len() && !train_x.is_empty() {
            return Err(DatasetError::InvalidTimeSteps {
                time_steps: self.time_steps,
                rows: train_x.len(),
            });
        }

        Ok(TrainingSet {
            train_x: Samples::new(train_x, self.time_steps),
            train_y: Samples::new(train_y, self.time_steps),
            test_x: Samples::new(test_x.to_vec(), self.time_steps),
            test_y: Samples::new(test_y.to_vec(), self.time_steps),
            x_config: x.config,
            y_config: y.config,
        })
    }

    fn extract(&self) -> (Vec<Row>, Vec<Row>) {
        let mut x_rows = vec![];
        let mut y_rows = vec![];
        for index in 0..self.source.len() {
            let (Some(x), Some(y)) = (
                (self.x_extractor)(self.source, index),
                (self.y_extractor)(self.source, index),
            ) else {
                continue;
            };
            if self.validator.as_ref().is_some_and(|valid| !valid(&x, &y)) {
                continue;
            }
            x_rows.push(x);
            y_rows.push(y);
        }
        (x_rows, y_rows)
    }
}

pub struct ProductionSetBuilder<'a, T> {
    source: &'a [T],
    x_extractor: Extractor<'a, T>,
    options: ScalingOptions,
    time_steps: usize,
}

impl<'a, T> ProductionSetBuilder<'a, T> {
    pub fn new<FX>(source: &'a [T], x_extractor: FX) -> Self
    where
        FX: Fn(&[T], usize) -> Option<Row> + 'a,
    {
        Self {
            source,
            x_extractor: Box::new(x_extractor),
            options: ScalingOptions::default(),
            time_steps: 0,
        }
    }

    /// Scaling options; [`ScalingOptions::reusing`] scales like a training set.
    #[must_use]
    pub fn with_options(mut self, options: ScalingOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_time_steps(mut self, time_steps: usize) -> Self {
        self.time_steps = time_steps;
        self
    }

    pub fn build(self) -> Result<ProductionSet, DatasetError> {
        let rows = (0..self.source.len())
            .filter_map(|index| (self.x_extractor)(self.source, index))
            .collect::<Vec<_>>();
        let x = scale_rows(&rows, &self.options)?;
        Ok(ProductionSet {
            x: Samples::new(x.scaled, self.time_steps),
            x_config: x.config,
        })
    }
}

/// Options for the Y side: output range and forced law only.
fn target_options(options: &ScalingOptions) -> ScalingOptions {
    let [min, max] = options.minmax_range;
    let target = ScalingOptions::new().with_minmax_range(min, max);
    match options.force_scaling {
        Some(law) => target.with_force_scaling(law),
        None => target,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use rowscale_engine::{ScalingLaw, Value, descale};

    use super::*;

    struct Candle {
        open: f64,
        close: f64,
    }

    fn candles() -> Vec<Candle> {
        (0..10)
            .map(|i| {
                let open = 100.0 + f64::from(i);
                Candle {
                    open,
                    close: open + if i % 3 == 0 { -1.0 } else { 1.0 },
                }
            })
            .collect()
    }

    fn x_row(source: &[Candle], index: usize) -> Option<Row> {
        let candle = &source[index];
        Some(Row::from_iter([("open", candle.open), ("close", candle.close)]))
    }

    /// Next candle's direction; the last candle has no label.
    fn y_row(source: &[Candle], index: usize) -> Option<Row> {
        let next = source.get(index + 1)?;
        Some(Row::from_iter([("up", next.close > next.open)]))
    }

    #[test]
    fn test_extract_scale_split() {
        let source = candles();
        let options = ScalingOptions::new().with_force_scaling(ScalingLaw::Normalization);
        let set = TrainingSetBuilder::new(&source, x_row, y_row)
            .with_options(options)
            .build(&mut Pcg32::seed_from_u64(1))
            .unwrap();

        // 9 labelled records, floor(9 * 0.8) = 7 train
        assert_eq!(set.train_x.len(), 7);
        assert_eq!(set.test_x.len(), 2);
        assert_eq!(set.x_config.output_key_names, ["open", "close"]);
        assert_eq!(set.y_config.output_key_names, ["up"]);

        let Samples::Flat(train_x) = &set.train_x else {
            panic!("expected flat samples");
        };
        assert_eq!(train_x[0][0], 0.0);
        let Samples::Flat(test_y) = &set.test_y else {
            panic!("expected flat samples");
        };
        let labels = descale(test_y, &set.y_config).unwrap();
        assert_eq!(labels.rows[1].get("up"), Some(&Value::from(false)));
    }

    #[test]
    fn test_validator_and_windows() {
        let source = candles();
        let set = TrainingSetBuilder::new(&source, x_row, y_row)
            .with_validator(|x, _| x.get("open").and_then(Value::as_number) != Some(100.0))
            .with_split(1.0)
            .with_time_steps(3)
            .build(&mut Pcg32::seed_from_u64(1))
            .unwrap();
        // 8 kept records -> 6 windows of 3
        let Samples::Windowed(windows) = &set.train_x else {
            panic!("expected windows");
        };
        assert_eq!(windows.len(), 6);
        assert!(windows.iter().all(|w| w.len() == 3));
        assert!(set.test_x.is_empty());
    }

    #[test]
    fn test_shuffle_keeps_pairs() {
        let source = candles();
        let options = ScalingOptions::new().with_force_scaling(ScalingLaw::Normalization);
        let build = |shuffle| {
            TrainingSetBuilder::new(&source, x_row, |s: &[Candle], i| {
                // Y mirrors X's open so pairing can be checked after shuffling
                Some(Row::from_iter([("open", s[i].open)]))
            })
            .with_options(options.clone())
            .with_split(1.0)
            .with_shuffle(shuffle)
            .build(&mut Pcg32::seed_from_u64(9))
            .unwrap()
        };
        let plain = build(false);
        let shuffled = build(true);
        assert_ne!(plain.train_x, shuffled.train_x);

        let (Samples::Flat(x), Samples::Flat(y)) = (&shuffled.train_x, &shuffled.train_y) else {
            panic!("expected flat samples");
        };
        for (x, y) in x.iter().zip(y) {
            assert_eq!(x[0], y[0]);
        }
    }

    #[test]
    fn test_balancing_applies_to_training_rows() {
        let source = candles();
        let set = TrainingSetBuilder::new(&source, x_row, y_row)
            .with_split(1.0)
            .with_balancing(Some(Balancing::Undersample))
            .build(&mut Pcg32::seed_from_u64(1))
            .unwrap();
        // labels of indices 1..10: 3 down, 6 up
        assert_eq!(set.train_y.len(), 6);
    }

    #[test]
    fn test_invalid_settings() {
        let source = candles();
        let err = TrainingSetBuilder::new(&source, x_row, y_row)
            .with_split(1.2)
            .build(&mut Pcg32::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err, DatasetError::InvalidSplit { ratio: 1.2 });

        let err = TrainingSetBuilder::new(&source, x_row, y_row)
            .with_time_steps(20)
            .build(&mut Pcg32::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(
            err,
            DatasetError::InvalidTimeSteps {
                time_steps: 20,
                rows: 7
            }
        );
    }

    #[test]
    fn test_production_reuses_config() {
        let source = candles();
        let options = ScalingOptions::new().with_force_scaling(ScalingLaw::Normalization);
        let training = TrainingSetBuilder::new(&source, x_row, y_row)
            .with_options(options)
            .build(&mut Pcg32::seed_from_u64(1))
            .unwrap();

        let production = ProductionSetBuilder::new(&source[..4], x_row)
            .with_options(ScalingOptions::reusing(training.x_config.clone()))
            .with_time_steps(2)
            .build()
            .unwrap();
        assert_eq!(production.x_config, training.x_config);
        assert_eq!(production.x.len(), 3);
    }
}
