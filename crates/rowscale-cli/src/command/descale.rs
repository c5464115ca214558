use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, bail};
use rowscale_engine::{descale, descale_time_steps};

use crate::{
    schema::{ConfigFile, DescaledDocument, ScaledInput},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DescaleArg {
    /// Scaled matrix, windows, or `scale` output
    #[arg(long)]
    input: PathBuf,
    /// Config (or `scale` output) the input was scaled with; defaults to the one embedded in the input
    #[arg(long)]
    config: Option<PathBuf>,
    /// Window length used to build the input; 0 when not windowed
    #[arg(long, default_value_t = 0)]
    time_steps: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DescaleArg) -> anyhow::Result<()> {
    let DescaleArg {
        input,
        config,
        time_steps,
        output,
    } = arg;

    let input = util::read_json_file::<ScaledInput, _>("scaled", input)?;
    let config = match (config, &input) {
        (Some(path), _) => util::read_json_file::<ConfigFile, _>("config", path)?.into_config(),
        (None, ScaledInput::Scaled(document)) => document.config.clone(),
        (None, _) => bail!("--config is required unless the input is a `scale` output"),
    };

    let descaled = match (input, NonZeroUsize::new(*time_steps)) {
        (ScaledInput::Scaled(document), None) => descale(&document.scaled, &config),
        (ScaledInput::Matrix(rows), None) => descale(&rows, &config),
        (ScaledInput::Windows(windows), Some(steps)) => {
            descale_time_steps(&windows, &config, steps)
        }
        (ScaledInput::Windows(_), None) => bail!("windowed input needs --time-steps"),
        // an empty window list parses as an empty matrix
        (ScaledInput::Matrix(rows), Some(_)) if rows.is_empty() => descale(&[], &config),
        (_, Some(_)) => bail!("--time-steps was given but the input is not windowed"),
    }
    .context("Failed to descale")?;

    eprintln!(
        "Descaled {} rows ({} string codes left numeric)",
        descaled.rows.len(),
        descaled.unmatched.len()
    );

    let document = DescaledDocument {
        rows: descaled.rows,
        unmatched: descaled.unmatched.into_iter().map(Into::into).collect(),
    };
    util::save_json("descaled rows", &document, output.as_deref())
}
