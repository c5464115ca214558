use clap::{Parser, Subcommand};

use self::{
    correlate::CorrelateArg, descale::DescaleArg, prepare::PrepareArg, scale::ScaleArg,
};

mod correlate;
mod descale;
mod prepare;
mod scale;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Scale rows and write the scaled matrix with its config
    Scale(#[clap(flatten)] ScaleArg),
    /// Reconstruct rows from a scaled matrix and its config
    Descale(#[clap(flatten)] DescaleArg),
    /// Build a scaled train/test set from rows
    Prepare(#[clap(flatten)] PrepareArg),
    /// Report pairwise correlation between numeric columns
    Correlate(#[clap(flatten)] CorrelateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Scale(arg) => scale::run(&arg)?,
        Mode::Descale(arg) => descale::run(&arg)?,
        Mode::Prepare(arg) => prepare::run(&arg)?,
        Mode::Correlate(arg) => correlate::run(&arg)?,
    }
    Ok(())
}
