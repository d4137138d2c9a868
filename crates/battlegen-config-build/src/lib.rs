//! `battlegen.toml` configuration.
//!
//! Every key is optional; a missing file section falls back to the values
//! existing C++ headers were generated with.

use battlegen_schema::{descriptor::BuiltinMatch, resolve::ChangePolicy};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Conventional file name looked up next to the schema.
pub const CONFIG_FILE_NAME: &str = "battlegen.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub generate: GenerateConfig,
    pub cpp: CppConfig,
    pub rust: RustConfig,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Load `battlegen.toml` from `dir` if present, otherwise defaults.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let candidate = dir.as_ref().join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::from_path(candidate)
        } else {
            Ok(Self::default())
        }
    }
}

///
/// GenerateConfig
///
/// Backend-independent switches for resolution, parsing and the shape of
/// the deserialize routine.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    pub builtin_matching: BuiltinMatch,
    pub change_on_missing: ChangePolicy,

    /// Dispose the partially read value before reporting a failed
    /// deserialize. Off by default, which leaves allocated fields in place.
    pub rollback_on_failure: bool,
}

///
/// CppConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CppConfig {
    pub include_guard: String,
    pub core_header: String,
    pub namespace: String,
}

impl Default for CppConfig {
    fn default() -> Self {
        Self {
            include_guard: "_GENERATED".to_string(),
            core_header: "OpenBattleCore.h".to_string(),
            namespace: "OpenBattle".to_string(),
        }
    }
}

///
/// RustConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RustConfig {
    /// Path of the runtime crate the generated module binds against.
    pub runtime_path: String,
}

impl Default for RustConfig {
    fn default() -> Self {
        Self {
            runtime_path: "openbattle_core".to_string(),
        }
    }
}

///
/// TESTS
///
