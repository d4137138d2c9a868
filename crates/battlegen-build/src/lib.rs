//! Code emission for battlegen schemas.
//!
//! Each [`Backend`] renders a whole [`Definitions`] set into one source
//! artifact. Backends are looked up by language tag in an explicit
//! [`BackendRegistry`] that the caller builds and owns.

pub mod backend;
pub mod plan;
pub mod registry;

pub use registry::BackendRegistry;

use battlegen_config_build::Config;
use battlegen_schema::{node::Definitions, resolve::ResolveError};
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum BuildError {
    #[error("formatting generated output failed")]
    Fmt(#[from] std::fmt::Error),

    #[error("invalid runtime path '{path}': {source}")]
    InvalidRuntimePath {
        path: String,
        #[source]
        source: syn::Error,
    },

    #[error("'{name}' is not a valid rust identifier")]
    InvalidRustIdent { name: String },

    #[error("field '{field}' has type '{ty}' which is not a valid rust type: {source}")]
    InvalidRustType {
        field: String,
        ty: String,
        #[source]
        source: syn::Error,
    },

    #[error("message '{message}' declares field '{field}', which is reserved for the wire version")]
    ReservedFieldName { message: String, field: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("unknown backend '{lang}', supported backends: {}", .supported.join(", "))]
    UnknownBackend { lang: String, supported: Vec<String> },
}

///
/// Backend
///
/// One output language. `export` renders the complete artifact in memory so
/// that nothing is written when emission fails.
///

pub trait Backend {
    /// Language tags this backend answers to.
    fn languages(&self) -> &'static [&'static str];

    fn export(&self, defs: &Definitions, config: &Config) -> Result<String, BuildError>;
}

/// Render `defs` with the backend registered for `lang`.
pub fn generate(
    registry: &BackendRegistry,
    lang: &str,
    defs: &Definitions,
    config: &Config,
) -> Result<String, BuildError> {
    let backend = registry.get(lang)?;
    log::info!(
        "generating {} objects and {} messages with the '{lang}' backend",
        defs.objects.len(),
        defs.messages.len()
    );

    backend.export(defs, config)
}
