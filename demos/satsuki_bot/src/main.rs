//! Satsuki Bot
//!
//! A small Slack bot on top of Chime:
//!
//! - `/hello` answers with a message everyone in the channel can see
//! - `@bot ping` answers `pong` (and a couple of other words)
//! - any message mentioning `あなたとJava` gets a `:yoshi:` reaction and a reply
//!
//! # Usage
//!
//! ```bash
//! CHIME_SLACK__BOT_TOKEN=xoxb-... CHIME_SLACK__SIGNING_SECRET=... \
//!     cargo run --package satsuki-bot -- --config demos/satsuki_bot/chime.toml
//! ```

mod handlers;

use std::path::PathBuf;

use anyhow::Result;
use chime::prelude::*;
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file; searched in the current directory when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (development, production, ...).
    #[arg(short, long)]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = ChimeRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile);
    }

    let mut runtime = builder.build()?;
    runtime.register_all(handlers::entries()?);

    info!(handlers = runtime.registry().len(), "Satsuki bot ready");
    runtime.run().await?;

    Ok(())
}
