mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::{EnvFilter, prelude::*};

fn main() -> Result<()> {
    let stderr_printer = tracing_subscriber::fmt::Layer::new().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(stderr_printer)
        .init();

    let cli = Cli::parse();
    cli.run()?;

    Ok(())
}
