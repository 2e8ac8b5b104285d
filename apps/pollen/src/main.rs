use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use marketplace_api::{restore_session, MarketplaceContext};
use marketplace_core::LedgerPolicy;
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod shell;

use config::{load_settings, prepare_database_url};
use shell::{Flow, Shell};

#[derive(Parser, Debug)]
#[command(name = "pollen", about = "Browse, book and post mentoring services")]
struct Args {
    /// Config file (defaults to ./pollen.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    /// Close the detail pane after each booking.
    #[arg(long)]
    clear_selection_after_booking: bool,
    /// Print views and events as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }
    if args.clear_selection_after_booking {
        settings.clear_selection_after_booking = true;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let database_url = prepare_database_url(&settings.database_url);
    let storage = Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open account store at '{database_url}'"))?;
    info!(%database_url, "account store ready");

    let policy = LedgerPolicy {
        clear_selection_after_booking: settings.clear_selection_after_booking,
    };
    let mut ctx = MarketplaceContext::new(storage, policy);
    let restored = restore_session(&mut ctx)
        .await
        .map_err(shared::error::ApiException::from)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match restored {
        Some(user) => writeln!(out, "Welcome back, {}.", user.name)?,
        None => writeln!(out, "Log in or register to continue. Type `help` for commands.")?,
    }

    let mut shell = Shell::new(ctx, args.json);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        if shell.execute(&line, &mut out).await? == Flow::Quit {
            break;
        }
        out.flush()?;
    }

    Ok(())
}
