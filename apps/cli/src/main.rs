use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use phi_engine::{io, Engine, EngineConfig, PhiEngine};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Integrated information (Phi) CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a request file (one request object or an array of them)
    Compute {
        /// Request JSON; defaults to `io.requests` from the config
        requests: Option<PathBuf>,
        /// Engine configuration (TOML, or YAML by extension)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Display engine banner and diagnostics
    Banner,
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let cfg = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => EngineConfig::from_yaml_path(path),
        _ => EngineConfig::from_toml_path(path),
    };
    cfg.with_context(|| format!("loading config {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compute {
            requests,
            config,
            output,
        } => {
            let cfg = load_config(config.as_deref())?;
            let Some(requests) = requests.or_else(|| cfg.io.requests.clone().map(PathBuf::from))
            else {
                bail!("no request file given and io.requests is not configured");
            };
            let output = output.or_else(|| cfg.io.outputs.clone().map(PathBuf::from));

            let batch = io::load_requests(&requests)
                .with_context(|| format!("reading requests {}", requests.display()))?;
            let mut engine = Engine::new();
            engine.prepare(cfg)?;
            let handle = engine.submit(batch)?;
            let report = engine.join(handle)?;
            engine.shutdown()?;
            tracing::info!(target: "phi", "{}", report.summary());

            match output {
                Some(path) => io::write_json(&path, &report)
                    .with_context(|| format!("writing report {}", path.display()))?,
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Command::Banner => {
            println!("{}", phi_engine::banner());
        }
    }
    Ok(())
}
