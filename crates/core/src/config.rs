//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services as an
//! `Arc<CoreConfig>`. Helpers in this module parse optional raw values (typically taken
//! from environment variables by the binaries) but never read the environment themselves,
//! so request handling and tests see a stable configuration.

use crate::constants::{ADMISSIONS_DIR_NAME, PATIENTS_DIR_NAME, UNREGISTERED};
use crate::{CoreError, CoreResult, NonEmptyText};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which store implementation backs the triage queue and patient lookups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    /// Process-local, lost on restart.
    #[default]
    Memory,
    /// YAML files under the configured data directory.
    File,
}

impl FromStr for StoreKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreKind::Memory),
            "file" | "yaml" => Ok(StoreKind::File),
            other => Err(CoreError::Validation(format!(
                "unknown store kind '{other}' (expected 'memory' or 'file')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    store: StoreKind,
    default_locality: NonEmptyText,
}

impl CoreConfig {
    pub fn new(data_dir: PathBuf, store: StoreKind, default_locality: NonEmptyText) -> Self {
        Self {
            data_dir,
            store,
            default_locality,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn admissions_dir(&self) -> PathBuf {
        self.data_dir.join(ADMISSIONS_DIR_NAME)
    }

    pub fn patients_dir(&self) -> PathBuf {
        self.data_dir.join(PATIENTS_DIR_NAME)
    }

    pub fn store(&self) -> StoreKind {
        self.store
    }

    /// Locality recorded on placeholder patients when the nurse did not supply one.
    pub fn default_locality(&self) -> &NonEmptyText {
        &self.default_locality
    }
}

/// Parse the store kind from an optional raw value, falling back to `default` when the
/// value is absent or blank.
pub fn store_kind_from_env_value(value: Option<String>, default: StoreKind) -> CoreResult<StoreKind> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<StoreKind>())
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

/// Parse the default locality, falling back to the unregistered sentinel.
pub fn locality_from_env_value(value: Option<String>) -> NonEmptyText {
    value
        .and_then(|v| NonEmptyText::new(v).ok())
        .unwrap_or_else(unregistered_text)
}

pub(crate) fn unregistered_text() -> NonEmptyText {
    NonEmptyText::new(UNREGISTERED).expect("UNREGISTERED is a non-empty literal")
}
