//! JSON documents read and written by the subcommands.

use chrono::{DateTime, Utc};
use rowscale_engine::{Row, ScalingConfig, UnknownStringOnDescale};
use serde::{Deserialize, Serialize};

/// Output of `scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledDocument {
    pub scaled_at: DateTime<Utc>,
    pub output_key_names: Vec<String>,
    pub scaled: Vec<Vec<f64>>,
    pub config: ScalingConfig,
}

/// A config file: either a bare config or a `scale` output that embeds one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfigFile {
    Scaled(ScaledDocument),
    Bare(ScalingConfig),
}

impl ConfigFile {
    pub fn into_config(self) -> ScalingConfig {
        match self {
            ConfigFile::Scaled(document) => document.config,
            ConfigFile::Bare(config) => config,
        }
    }
}

/// Input of `descale`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScaledInput {
    Scaled(ScaledDocument),
    Matrix(Vec<Vec<f64>>),
    Windows(Vec<Vec<Vec<f64>>>),
}

/// Output of `descale`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescaledDocument {
    pub rows: Vec<Row>,
    pub unmatched: Vec<UnmatchedCode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedCode {
    pub row: usize,
    pub column: String,
    pub code: f64,
}

impl From<UnknownStringOnDescale> for UnmatchedCode {
    fn from(miss: UnknownStringOnDescale) -> Self {
        Self {
            row: miss.row,
            column: miss.column,
            code: miss.code,
        }
    }
}

#[cfg(test)]
mod tests {
    use rowscale_engine::{ScalingOptions, scale_rows};

    use super::*;

    fn document() -> ScaledDocument {
        let rows = vec![Row::from_iter([("x", 1.0)]), Row::from_iter([("x", 3.0)])];
        let output = scale_rows(&rows, &ScalingOptions::default()).unwrap();
        ScaledDocument {
            scaled_at: Utc::now(),
            output_key_names: output.config.output_key_names.clone(),
            scaled: output.scaled,
            config: output.config,
        }
    }

    #[test]
    fn test_config_file_variants() {
        let document = document();
        let embedded = serde_json::to_string(&document).unwrap();
        let bare = serde_json::to_string(&document.config).unwrap();
        for json in [embedded, bare] {
            let config = serde_json::from_str::<ConfigFile>(&json).unwrap().into_config();
            assert_eq!(config, document.config);
        }
    }

    #[test]
    fn test_scaled_input_variants() {
        let json = serde_json::to_string(&document()).unwrap();
        assert!(matches!(
            serde_json::from_str::<ScaledInput>(&json).unwrap(),
            ScaledInput::Scaled(_)
        ));
        assert!(matches!(
            serde_json::from_str::<ScaledInput>("[[0.5, 1.0]]").unwrap(),
            ScaledInput::Matrix(_)
        ));
        assert!(matches!(
            serde_json::from_str::<ScaledInput>("[[[0.5], [1.0]]]").unwrap(),
            ScaledInput::Windows(_)
        ));
    }
}
