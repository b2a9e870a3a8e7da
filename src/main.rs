//! Alice CLI
//!
//! Terminal chat with a local model and a persistent memory of notes.

use alice::{config, AliceConfig, Session};
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Alice - sarcastic terminal assistant with memory
#[derive(Parser, Debug)]
#[command(name = "alice")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory (memory database and config.toml)
    #[arg(long)]
    home: Option<PathBuf>,

    /// Model to chat with
    #[arg(short, long)]
    model: Option<String>,

    /// Ollama base URL
    #[arg(long)]
    host: Option<String>,

    /// Wait for the full reply instead of streaming tokens
    #[arg(long)]
    no_stream: bool,

    /// Do not inject memory into prompts
    #[arg(long)]
    no_memory: bool,

    /// Starting chaos level (1 calm → 10 brutal)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    chaos: Option<u8>,

    /// Show a thinking indicator and any <think> content
    #[arg(long)]
    show_thinking: bool,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let home = config::resolve_home(cli.home.clone())?;
    let config = apply_cli(config::load(&home)?, &cli);
    info!("Home: {:?}, model: {}, host: {}", config.home, config.model, config.host);

    let mut session = Session::new(config, io::stdout())?;

    // Read stdin on a plain thread; the session awaits lines over a channel
    let (input_tx, input_rx) = mpsc::channel::<String>(32);
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    eprintln!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    session.run(input_rx).await?;
    Ok(())
}

fn apply_cli(mut config: AliceConfig, cli: &Cli) -> AliceConfig {
    if let Some(model) = &cli.model {
        config = config.with_model(model.as_str());
    }
    if let Some(host) = &cli.host {
        config = config.with_host(host.as_str());
    }
    if let Some(level) = cli.chaos {
        config = config.with_chaos_level(level);
    }
    if cli.no_stream {
        config = config.with_streaming(false);
    }
    if cli.no_memory {
        config = config.with_inject_memory(false);
    }
    if cli.show_thinking {
        config = config.with_show_thinking(true);
    }
    config
}
