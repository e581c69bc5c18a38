//! ski CLI: one line in, one iteration out.

use std::io::BufRead;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ski_loop::config::EngineConfig;
use ski_loop::engine::Engine;
use ski_loop::paths::SkiPaths;
use ski_loop::pipeline::IterationOutput;

#[derive(Parser)]
#[command(name = "ski", version, about = "Iterative self-referential knowledge loop")]
struct Cli {
    /// Knowledge store file (default: $XDG_DATA_HOME/ski-loop/knowledge.redb).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/ski-loop/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep history in memory only; nothing is read from or written to disk.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one iteration on a line of text.
    Step {
        /// Input text (may be empty).
        #[arg(default_value = "")]
        text: String,

        /// Iteration number; defaults to the last stored iteration + 1.
        #[arg(long)]
        iteration: Option<u64>,

        /// Print the full iteration output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read stdin line by line, one iteration per line.
    Chat {
        /// Print each iteration output as a JSON line.
        #[arg(long)]
        json: bool,
    },

    /// Print the complete stored snapshot as JSON.
    Export,

    /// Show store statistics.
    Info,

    /// Write the effective configuration to the config file.
    InitConfig,
}

fn print_output(output: &IterationOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(output).into_diagnostic()?);
    } else {
        println!("{}", output.response);
    }
    Ok(())
}

/// Config and store file locations. Ephemeral runs only honor explicit flags
/// and never consult the XDG defaults.
fn locations(cli: &Cli) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
    let paths = if cli.ephemeral || (cli.store.is_some() && cli.config.is_some()) {
        None
    } else {
        Some(SkiPaths::resolve()?)
    };
    let config = cli
        .config
        .clone()
        .or_else(|| paths.as_ref().map(SkiPaths::config_file));
    let store = cli
        .store
        .clone()
        .or_else(|| paths.as_ref().map(SkiPaths::store_file));
    Ok((config, store))
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let (config_path, store_path) = locations(&cli)?;

    let config = match &config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    if let Commands::InitConfig = cli.command {
        let Some(path) = config_path else {
            miette::bail!("no config location with --ephemeral; pass --config <FILE>");
        };
        config.save(&path)?;
        println!("Wrote config to {}", path.display());
        return Ok(());
    }

    let mut engine = match (&store_path, cli.ephemeral) {
        (Some(path), false) => Engine::open(path, config)?,
        _ => Engine::in_memory(config)?,
    };

    match cli.command {
        Commands::Step {
            text,
            iteration,
            json,
        } => {
            let output = engine.step(&text, iteration)?;
            print_output(&output, json)?;
        }

        Commands::Chat { json } => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line.into_diagnostic()?;
                let output = engine.step(&line, None)?;
                print_output(&output, json)?;
            }
        }

        Commands::Export => {
            let snapshot = engine.snapshot()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshot).into_diagnostic()?
            );
        }

        Commands::Info => {
            match (&store_path, cli.ephemeral) {
                (Some(path), false) => println!("store: {}", path.display()),
                _ => println!("store: in memory"),
            }
            print!("{}", engine.info()?);
        }

        Commands::InitConfig => {}
    }

    Ok(())
}
