use std::{collections::BTreeSet, path::PathBuf};

use anyhow::Context;
use rowscale_dataset::correlation::CorrelationReport;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CorrelateArg {
    /// JSON array of row objects
    #[arg(long)]
    input: PathBuf,
    /// Fraction of leading rows to analyze
    #[arg(long, default_value_t = 1.0)]
    split: f64,
    /// Pairs at or above this coefficient are reported as high
    #[arg(long, default_value_t = 0.5)]
    threshold: f64,
    /// Column left out of the analysis
    #[arg(long)]
    exclude: Vec<String>,
    /// Write the report as JSON instead of printing it
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CorrelateArg) -> anyhow::Result<()> {
    let rows = util::read_rows_file(&arg.input)?;
    let excludes = arg.exclude.iter().cloned().collect::<BTreeSet<_>>();
    let report = CorrelationReport::analyze(&rows, arg.split, &excludes, arg.threshold)
        .context("Failed to analyze correlation")?;

    match &arg.output {
        Some(path) => util::save_json("correlation report", &report, Some(path.as_path()))?,
        None => println!("{report}"),
    }
    Ok(())
}
