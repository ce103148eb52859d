//! utfplay binary
//!
//! Usage:
//!   utfplay                  # interactive mode (stdin/stdout)
//!   utfplay --serve [OPTIONS] # HTTP server

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use utfplay::config::{AppConfig, Cli, LogConfig, LogFormat, RunMode};
use utfplay::network::Server;
use utfplay::shell::Session;

fn main() {
    let config = AppConfig::from(Cli::parse());
    init_tracing(&config.log);

    if let Err(e) = run(config) {
        tracing::error!(error = ?e, "fatal");
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so interactive output on stdout stays clean.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match log.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(config: AppConfig) -> Result<()> {
    println!("Welcome to the UTF-8 Encoder/Decoder Service!");

    match config.mode {
        RunMode::Serve => {
            let bind_addr = config.server.bind_addr;
            let mut server = Server::bind(config.server)
                .with_context(|| format!("binding {bind_addr}"))?;
            println!("Starting server on {}", server.local_addr()?);
            server.run().context("server event loop")?;
        }
        RunMode::Interactive => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut session = Session::new(stdin.lock(), stdout.lock(), config.codec);
            session.run().context("interactive session")?;
        }
    }
    Ok(())
}
