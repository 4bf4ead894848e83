use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::value::{Table, Value};

/// Section-keyed key/value store backing the whole run.
///
/// The run-level options live in the `[trackcast]` section; every target
/// reads its own section named after its registry id. Target sections are
/// open-ended, so access is by section/key rather than a closed serde
/// schema.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    table: Table,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = contents.parse::<Table>().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { table })
    }

    /// Parses settings from TOML text. Used by tests and by `load`.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        Ok(Self {
            table: text.parse::<Table>()?,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn section(&self, name: &str) -> Option<&Table> {
        self.table.get(name)?.as_table()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub fn get_str(&self, section: &str, key: &str) -> Option<String> {
        match self.section(section)?.get(key)? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Booleans are accepted both as TOML booleans and as the historical
    /// `"true"`/`"false"` config-file strings.
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.section(section)?.get(key)? {
            Value::Boolean(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_i64(&self, section: &str, key: &str) -> Option<i64> {
        match self.section(section)?.get(key)? {
            Value::Integer(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_str_list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        let values = self.section(section)?.get(key)?.as_array()?;
        Some(
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
        )
    }

    /// Targets are opt-in: an absent section or `enabled` key means disabled.
    pub fn target_enabled(&self, id: &str) -> bool {
        self.get_bool(id, "enabled").unwrap_or(false)
    }
}
