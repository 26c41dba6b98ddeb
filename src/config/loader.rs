//! Configuration loading from disk.
//!
//! Files ending in `.properties` are read as `key=value` lines, with dotted
//! keys addressing sections (`dispatch.detailed_errors=false`). Every value is
//! read as a string; typed schema fields parse their text form. Anything else
//! is parsed as TOML.

use std::fs;
use std::path::Path;

use crate::config::schema::DispatcherConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Properties { line: usize, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Properties { line, message } => {
                write!(f, "Parse error on line {}: {}", line, message)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML or `.properties` file.
pub fn load_config(path: &Path) -> Result<DispatcherConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a configuration file without validating it.
pub fn read_config(path: &Path) -> Result<DispatcherConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let is_properties = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("properties"));

    if is_properties {
        parse_properties(&content)
    } else {
        toml::from_str(&content).map_err(ConfigError::Parse)
    }
}

/// Parse `.properties` content into a configuration.
pub fn parse_properties(content: &str) -> Result<DispatcherConfig, ConfigError> {
    let mut root = toml::Table::new();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let Some(split) = trimmed.find(['=', ':']) else {
            return Err(ConfigError::Properties {
                line,
                message: "expected `key=value`".to_string(),
            });
        };
        let key = trimmed[..split].trim();
        let value = trimmed[split + 1..].trim();
        if key.is_empty() {
            return Err(ConfigError::Properties {
                line,
                message: "empty key".to_string(),
            });
        }

        insert_dotted(&mut root, key, toml::Value::String(value.to_string()))
            .map_err(|message| ConfigError::Properties { line, message })?;
    }

    toml::Value::Table(root)
        .try_into()
        .map_err(ConfigError::Parse)
}

fn insert_dotted(root: &mut toml::Table, key: &str, value: toml::Value) -> Result<(), String> {
    let mut segments: Vec<&str> = key.split('.').map(str::trim).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(format!("malformed key `{key}`"));
    }
    let Some(leaf) = segments.pop() else {
        return Err(format!("malformed key `{key}`"));
    };

    let mut table = root;
    for segment in segments {
        let entry = table
            .entry(segment.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        table = match entry {
            toml::Value::Table(nested) => nested,
            _ => return Err(format!("`{segment}` is both a value and a section")),
        };
    }

    if table.contains_key(leaf) {
        return Err(format!("duplicate key `{key}`"));
    }
    table.insert(leaf.to_string(), value);
    Ok(())
}
