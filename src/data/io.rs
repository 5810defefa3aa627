//! Reading input tables and writing results as JSON or YAML.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialization format for input files and command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// JSON format.
    #[default]
    Json,
    /// YAML format.
    Yaml,
}

impl DataFormat {
    /// Picks the format from a file extension (`.json`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => bail!(
                "Cannot tell the format of {}: expected a .json, .yaml or .yml extension",
                path.display()
            ),
        }
    }

    /// Parses `content` in this format.
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        match self {
            Self::Json => serde_json::from_str(content).context("Failed to parse JSON"),
            Self::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML"),
        }
    }

    /// Renders `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).context("Failed to serialize to JSON"),
            Self::Yaml => serde_yaml::to_string(value).context("Failed to serialize to YAML"),
        }
    }
}

impl std::str::FromStr for DataFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Reads and deserializes a JSON or YAML file, chosen by extension.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DataFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    format
        .parse(&content)
        .with_context(|| format!("Failed to parse file: {}", path.display()))
}

/// Reads a table of rows from a JSON or YAML file.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let rows: Vec<T> = read_file(path)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Loaded rows");
    Ok(rows)
}
