use anyhow::{Context, Result};
use battlegen_build::BackendRegistry;
use battlegen_config_build::Config;
use battlegen_schema::load::load;
use clap::Parser;
use std::{fs, path::PathBuf};

/// Compile a schema file into a single source artifact.
#[derive(Debug, Parser)]
#[command(name = "battlegen", version, about)]
pub struct Cli {
    /// Root schema file; includes are resolved next to it.
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// File the generated source is written to.
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Output language tag.
    #[arg(short, long, value_name = "TAG", default_value = "c")]
    pub lang: String,

    /// Generator settings; defaults to `battlegen.toml` next to the input.
    #[arg(short, long, value_name = "PATH", env = "BATTLEGEN_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Generate and write the output file. Nothing is written unless every
    /// earlier step succeeds.
    pub fn run(&self) -> Result<()> {
        let registry = BackendRegistry::with_defaults();
        let backend = registry.get(&self.lang)?;
        log::info!("using the '{}' backend", self.lang);

        let config = self.load_config()?;
        let defs = load(&self.input)
            .with_context(|| format!("loading schema {}", self.input.display()))?;

        let rendered = backend.export(&defs, &config)?;
        fs::write(&self.output, rendered)
            .with_context(|| format!("writing {}", self.output.display()))?;
        log::info!("wrote {}", self.output.display());

        Ok(())
    }

    fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => {
                let dir = self
                    .input
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_default();
                Config::discover(&dir)
                    .with_context(|| format!("loading config from {}", dir.display()))?
            }
        };

        Ok(config)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SCRATCH: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir(label: &str) -> PathBuf {
        let n = SCRATCH.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "battlegen-cli-{}-{label}-{n}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create scratch dir");

        dir
    }

    fn demo_schema() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../schema/demo/battle.toml")
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("battlegen").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn lang_defaults_to_c() {
        let cli = parse(&["-i", "in.toml", "-o", "out.h"]);

        assert_eq!(cli.lang, "c");
        assert_eq!(cli.input, PathBuf::from("in.toml"));
        assert_eq!(cli.output, PathBuf::from("out.h"));
    }

    #[test]
    fn long_flags_are_accepted() {
        let cli = parse(&[
            "--input", "in.toml", "--output", "out.rs", "--lang", "rust", "--config", "b.toml",
        ]);

        assert_eq!(cli.lang, "rust");
        assert_eq!(cli.config, Some(PathBuf::from("b.toml")));
    }

    #[test]
    fn input_and_output_are_required() {
        assert!(Cli::try_parse_from(["battlegen", "-o", "out.h"]).is_err());
        assert!(Cli::try_parse_from(["battlegen", "-i", "in.toml"]).is_err());
    }

    #[test]
    fn demo_schema_compiles_to_a_header() {
        let dir = scratch_dir("header");
        let output = dir.join("messages.h");
        let cli = Cli {
            input: demo_schema(),
            output: output.clone(),
            lang: "cpp".to_string(),
            config: None,
        };

        cli.run().expect("run");

        let header = fs::read_to_string(&output).expect("output written");
        assert!(header.contains("class SpawnMessage : public Message"));
        // battlegen.toml next to the demo schema is picked up
        assert!(header.contains("namespace Battle {"));
    }

    #[test]
    fn unknown_lang_writes_nothing() {
        let dir = scratch_dir("unknown");
        let output = dir.join("out.txt");
        let cli = Cli {
            input: demo_schema(),
            output: output.clone(),
            lang: "cobol".to_string(),
            config: None,
        };

        let err = cli.run().expect_err("cobol is not a backend");

        assert!(err.to_string().contains("c, cpp, rust, rs, nil"), "{err}");
        assert!(!output.exists());
    }

    #[test]
    fn missing_schema_writes_nothing() {
        let dir = scratch_dir("missing");
        let output = dir.join("out.h");
        let cli = Cli {
            input: dir.join("absent.toml"),
            output: output.clone(),
            lang: "c".to_string(),
            config: None,
        };

        assert!(cli.run().is_err());
        assert!(!output.exists());
    }

    #[test]
    fn explicit_config_overrides_discovery() {
        let dir = scratch_dir("config");
        let config = dir.join("custom.toml");
        fs::write(&config, "[rust]\nruntime_path = \"crate::wire\"\n").expect("write config");
        let output = dir.join("messages.rs");
        let cli = Cli {
            input: demo_schema(),
            output: output.clone(),
            lang: "rs".to_string(),
            config: Some(config),
        };

        cli.run().expect("run");

        let module = fs::read_to_string(&output).expect("output written");
        let module: String = module.split_whitespace().collect();
        assert!(module.contains("crate::wire::Serializable"));
    }
}
