use anyhow::{Context, Result};
use clap::ValueEnum;
use lpp_lang::ParseOptions;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Prepended to the input file name to form the default output name
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Problem text, readable by `lpp parse`
    #[default]
    Text,
    /// JSON, readable by `lpp load`
    Json,
    /// Dense matrix listing
    Matrix,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config TOML")?;
        Ok(config)
    }
}

fn default_prefix() -> String {
    "(LP-2) ".to_string()
}
