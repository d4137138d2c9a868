use crate::{Backend, BuildError};
use battlegen_config_build::Config;
use battlegen_schema::node::Definitions;
use std::fmt::Write;

///
/// NilBackend
///
/// Debug dump: one line per message, nothing else.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NilBackend;

impl Backend for NilBackend {
    fn languages(&self) -> &'static [&'static str] {
        &["nil"]
    }

    fn export(&self, defs: &Definitions, _: &Config) -> Result<String, BuildError> {
        let mut out = String::new();
        for message in &defs.messages {
            writeln!(out, "{message:?}")?;
        }

        Ok(out)
    }
}

///
/// TESTS
///
