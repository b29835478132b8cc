//! `amoura`: command-line client for the Amoura API.
//!
//! # Usage
//!
//! ```
//! amoura --url http://localhost:8080 --email ana@example.com --password secret me
//! amoura --config ~/.config/amoura/config.toml swipe <user-id> like
//! ```

mod client;

use std::path::PathBuf;

use amoura_core::swipe::Direction;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "amoura", about = "Command-line client for the Amoura API")]
struct Args {
  /// Path to a TOML config file (url, email, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the Amoura server (default: http://localhost:8080).
  #[arg(long, env = "AMOURA_URL")]
  url: Option<String>,

  /// Account e-mail, used as the Basic-auth username.
  #[arg(long, env = "AMOURA_EMAIL")]
  email: Option<String>,

  /// Account password (plaintext).
  #[arg(long, env = "AMOURA_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account with the configured e-mail and password.
  Register {
    /// Name shown to matches.
    display_name: String,
  },
  /// Show the authenticated account.
  Me,
  /// Like, pass or superlike another user.
  Swipe {
    to_user:   Uuid,
    /// One of `like`, `pass`, `superlike`.
    direction: Direction,
  },
  /// List active matches, most recently active first.
  Matches,
  /// Deactivate a match you belong to.
  Deactivate { match_id: Uuid },
  /// Send a message to a match.
  Send { match_id: Uuid, text: String },
  /// Show the messages of a match.
  Messages {
    match_id: Uuid,
    /// Only messages newer than this RFC 3339 timestamp.
    #[arg(long)]
    since:    Option<DateTime<Utc>>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

impl ConfigFile {
  fn load(path: Option<&PathBuf>) -> Result<Self> {
    let Some(path) = path else {
      return Ok(Self::default());
    };
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }
}

/// CLI flags (and their env fallbacks) override the config file, which
/// overrides defaults.
fn resolve(args: &Args, file: ConfigFile) -> ApiConfig {
  let pick = |flag: &Option<String>, from_file: String| {
    flag.clone().or_else(|| (!from_file.is_empty()).then_some(from_file))
  };
  ApiConfig {
    base_url: pick(&args.url, file.url).unwrap_or_else(|| "http://localhost:8080".to_string()),
    email:    pick(&args.email, file.email).unwrap_or_default(),
    password: pick(&args.password, file.password).unwrap_or_default(),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let file_cfg = ConfigFile::load(args.config.as_ref())?;
  let client = ApiClient::new(resolve(&args, file_cfg))?;

  match args.command {
    Command::Register { display_name } => print(&client.register(&display_name).await?),
    Command::Me => print(&client.me().await?),
    Command::Swipe { to_user, direction } => {
      print(&client.swipe(to_user, direction).await?)
    }
    Command::Matches => print(&client.matches().await?),
    Command::Deactivate { match_id } => print(&client.deactivate(match_id).await?),
    Command::Send { match_id, text } => {
      print(&client.send_message(match_id, &text).await?)
    }
    Command::Messages { match_id, since } => {
      print(&client.messages(match_id, since).await?)
    }
  }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  let out = serde_json::to_string_pretty(value).context("serialising response")?;
  println!("{out}");
  Ok(())
}
