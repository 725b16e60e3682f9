// Settings file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }
}

/// Reads a flat table of settings from a file.
///
/// Values may be strings, booleans or integers; they are rendered back to
/// text so that every source goes through [`Settings::apply`](crate::Settings::apply).
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Pick the format from the file extension.
    pub fn auto(path: &str) -> Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError(format!("No file extension: {}", path)))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))?;

        Ok(Self::new(format))
    }

    pub fn load_file(&self, path: &str) -> Result<HashMap<String, String>> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("Failed to read {}: {}", path, e)))?;

        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let value = match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::LoadError(format!("JSON parse error: {}", e)))?,
            FileFormat::Toml => {
                let toml_value: toml::Value = toml::from_str(content)
                    .map_err(|e| ConfigError::LoadError(format!("TOML parse error: {}", e)))?;
                serde_json::to_value(toml_value)
                    .map_err(|e| ConfigError::LoadError(format!("TOML conversion error: {}", e)))?
            }
            FileFormat::Env => return Ok(parse_env(content)),
        };

        flatten(value)
    }
}

fn flatten(value: Value) -> Result<HashMap<String, String>> {
    let Value::Object(map) = value else {
        return Err(ConfigError::LoadError(
            "settings file must contain a table".to_string(),
        ));
    };

    map.into_iter()
        .map(|(key, value)| {
            let raw = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(ConfigError::parse(
                        &key,
                        format!("unsupported value {}", other),
                    ));
                }
            };
            Ok((key.to_uppercase(), raw))
        })
        .collect()
}

fn parse_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_uppercase(), value.to_string())
        })
        .collect()
}
