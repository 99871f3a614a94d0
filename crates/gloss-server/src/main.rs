//! gloss-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the annotation workbench over HTTP.
//!
//! Account management runs through subcommands:
//!
//! ```text
//! cargo run -p gloss-server --bin server -- add-user ana
//! cargo run -p gloss-server --bin server -- add-interval sprint-1 2026-03-01 2026-04-01
//! cargo run -p gloss-server --bin server -- hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gloss_core::store::AnnotationStore as _;
use gloss_server::{AppState, ServerConfig, auth, refcache::ReferenceCache};
use gloss_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Gloss annotation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Create an annotator account; the password is read from stdin.
  AddUser { username: String },
  /// Create a named evaluation interval over [start, end).
  AddInterval {
    name:  String,
    start: NaiveDate,
    end:   NaiveDate,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit. Needs no configuration.
  if matches!(cli.command, Some(Command::HashPassword)) {
    let password = read_password()?;
    let hash = auth::hash_password(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("GLOSS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Some(Command::AddUser { username }) => {
      let password = read_password()?;
      let hash = auth::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
      let user = store.add_user(&username, &hash).await?;
      tracing::info!(user_id = user.user_id, %username, "created user");
      return Ok(());
    }
    Some(Command::AddInterval { name, start, end }) => {
      anyhow::ensure!(start < end, "interval start must precede its end");
      let interval = store.add_evaluation_interval(&name, start, end).await?;
      tracing::info!(
        interval_id = interval.interval_id,
        %name,
        "created evaluation interval"
      );
      return Ok(());
    }
    Some(Command::HashPassword) | None => {}
  }

  // Build application state.
  let state = AppState {
    store:      Arc::new(store),
    references: Arc::new(ReferenceCache::new(Duration::from_secs(
      server_cfg.reference_cache_ttl_secs,
    ))),
    config:     Arc::new(server_cfg.clone()),
  };

  let app = gloss_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
