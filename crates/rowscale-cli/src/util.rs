use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use rowscale_engine::{Row, ScalingOptions};

/// Writes `document` as pretty JSON to `path`, or to stdout when no path is given.
///
/// `kind` names the document in messages, as in [`read_json_file`].
pub fn save_json<T>(kind: &str, document: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let target = path.map_or_else(|| "stdout".to_owned(), |path| path.display().to_string());
    let mut writer: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {kind} file: {target}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    serde_json::to_writer_pretty(&mut writer, document)
        .with_context(|| format!("Failed to write {kind} JSON to {target}"))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to finish writing {kind} to {target}"))?;

    if path.is_some() {
        eprintln!("Saved {kind} to {target}");
    }
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    let reader = io::BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

pub fn read_rows_file(path: &Path) -> anyhow::Result<Vec<Row>> {
    let rows: Vec<Row> = read_json_file("rows", path)?;
    eprintln!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Reads scaling options, or returns the defaults when no path is given.
pub fn read_options_file(path: Option<&Path>) -> anyhow::Result<ScalingOptions> {
    match path {
        Some(path) => read_json_file("options", path),
        None => Ok(ScalingOptions::default()),
    }
}
