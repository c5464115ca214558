use std::path::PathBuf;

use anyhow::Context;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use rowscale_dataset::{balance::Balancing, training::TrainingSetBuilder};
use rowscale_engine::Row;

use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum BalancingArg {
    Oversample,
    Undersample,
}

impl From<BalancingArg> for Balancing {
    fn from(arg: BalancingArg) -> Self {
        match arg {
            BalancingArg::Oversample => Balancing::Oversample,
            BalancingArg::Undersample => Balancing::Undersample,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PrepareArg {
    /// JSON array of row objects
    #[arg(long)]
    input: PathBuf,
    /// Columns forming each X sample
    #[arg(long, value_delimiter = ',', required = true)]
    x_columns: Vec<String>,
    /// Columns forming each Y sample
    #[arg(long, value_delimiter = ',', required = true)]
    y_columns: Vec<String>,
    /// Take Y from the row this many positions after X's row
    #[arg(long, default_value_t = 0)]
    y_offset: usize,
    /// Fraction of samples used for training
    #[arg(long, default_value_t = 0.8)]
    split: f64,
    /// Window length; 0 keeps samples flat
    #[arg(long, default_value_t = 0)]
    time_steps: usize,
    /// Shuffle X/Y pairs before splitting
    #[arg(long)]
    shuffle: bool,
    /// Rebalance training labels
    #[arg(long, value_enum)]
    balancing: Option<BalancingArg>,
    /// Random seed for shuffling
    #[arg(long)]
    seed: Option<u64>,
    /// JSON scaling options applied to X
    #[arg(long)]
    options: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Copies `columns` out of `row`, or `None` if any is missing.
fn project(row: &Row, columns: &[String]) -> Option<Row> {
    columns
        .iter()
        .map(|column| row.get(column).map(|value| (column.as_str(), value.clone())))
        .collect()
}

pub(crate) fn run(arg: &PrepareArg) -> anyhow::Result<()> {
    let PrepareArg {
        input,
        x_columns,
        y_columns,
        y_offset,
        split,
        time_steps,
        shuffle,
        balancing,
        seed,
        options,
        output,
    } = arg;

    let rows = util::read_rows_file(input)?;
    let options = util::read_options_file(options.as_deref())?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);
    if *shuffle {
        eprintln!("Shuffling with seed {seed}");
    }

    let set = TrainingSetBuilder::new(
        &rows,
        |rows: &[Row], index| project(&rows[index], x_columns),
        |rows: &[Row], index| project(rows.get(index + y_offset)?, y_columns),
    )
    .with_options(options)
    .with_split(*split)
    .with_time_steps(*time_steps)
    .with_shuffle(*shuffle)
    .with_balancing(balancing.map(Into::into))
    .build(&mut rng)
    .context("Failed to prepare training set")?;

    eprintln!(
        "Prepared {} training and {} test samples",
        set.train_x.len(),
        set.test_x.len()
    );
    util::save_json("training set", &set, output.as_deref())
}
