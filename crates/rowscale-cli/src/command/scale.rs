use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use rowscale_engine::{ScalingOptions, scale_rows};

use crate::{
    schema::{ConfigFile, ScaledDocument},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ScaleArg {
    /// JSON array of row objects
    #[arg(long)]
    input: PathBuf,
    /// JSON scaling options
    #[arg(long)]
    options: Option<PathBuf>,
    /// Config (or `scale` output) to scale consistently with; overrides `prevConfig` in options.
    /// Without --options, the options are taken from the config
    #[arg(long)]
    prev_config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ScaleArg) -> anyhow::Result<()> {
    let ScaleArg {
        input,
        options,
        prev_config,
        output,
    } = arg;

    let rows = util::read_rows_file(input)?;
    let options = match (options, prev_config) {
        (None, Some(path)) => {
            let config = util::read_json_file::<ConfigFile, _>("config", path)?.into_config();
            ScalingOptions::reusing(config)
        }
        (options, prev_config) => {
            let mut options = util::read_options_file(options.as_deref())?;
            if let Some(path) = prev_config {
                let config = util::read_json_file::<ConfigFile, _>("config", path)?;
                options.prev_config = Some(config.into_config());
            }
            options
        }
    };

    eprintln!("Scaling {} rows...", rows.len());
    let scaled = scale_rows(&rows, &options).context("Failed to scale rows")?;
    eprintln!(
        "Scaled to {} columns ({} input columns)",
        scaled.config.output_width(),
        scaled.config.columns.len()
    );

    let document = ScaledDocument {
        scaled_at: Utc::now(),
        output_key_names: scaled.config.output_key_names.clone(),
        scaled: scaled.scaled,
        config: scaled.config,
    };
    util::save_json("scaled rows", &document, output.as_deref())
}
