//! Schema file loading.
//!
//! A schema file is TOML with optional `include`, `[[object]]` and
//! `[[message]]` tables. Includes are followed breadth-first and resolved
//! against the directory of the root file; the merged [`Definitions`] keep
//! the visit order. Include cycles are not detected, so a cycle never
//! terminates.

use crate::node::{Definitions, Message, Object};
use serde::Deserialize;
use std::{
    collections::VecDeque,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// LoadError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum LoadError {
    #[error("cannot read schema file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse schema file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

///
/// SchemaFile
///

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    include: Vec<String>,

    #[serde(default)]
    object: Vec<Object>,

    #[serde(default)]
    message: Vec<Message>,
}

/// Load a schema file and everything it includes.
///
/// Fails on the first file that cannot be read or parsed; nothing merged
/// up to that point is returned.
pub fn load(path: impl AsRef<Path>) -> Result<Definitions, LoadError> {
    let root = path.as_ref();
    let root_dir = root.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut defs = Definitions::new();
    let mut queue = VecDeque::from([root.to_path_buf()]);

    while let Some(next) = queue.pop_front() {
        let full = resolve_include(&root_dir, &next);
        log::info!("loading schema file {}", full.display());

        let file = read_file(&full)?;
        queue.extend(file.include.iter().map(PathBuf::from));

        defs.merge(Definitions {
            objects: file.object,
            messages: file.message,
        });
    }

    Ok(defs)
}

/// Parse a single schema document; includes are ignored.
pub fn from_toml_str(source: &str) -> Result<Definitions, toml::de::Error> {
    let file: SchemaFile = toml::from_str(source)?;

    Ok(Definitions {
        objects: file.object,
        messages: file.message,
    })
}

fn read_file(path: &Path) -> Result<SchemaFile, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// paths already under the root directory are used as-is
fn resolve_include(root_dir: &Path, path: &Path) -> PathBuf {
    if path.starts_with(root_dir) {
        path.to_path_buf()
    } else {
        root_dir.join(path)
    }
}

///
/// TESTS
///
