//! `gloss-import` — bulk-import commands for the Gloss store.
//!
//! # Usage
//!
//! ```text
//! gloss-import --store gloss.db data \
//!     --entries-directory entries \
//!     --images-directory static/pages \
//!     --static-directory static \
//!     --mappings-file mappings.csv
//! gloss-import --store gloss.db references --input-file references.txt
//! gloss-import --store gloss.db update-metadata
//! ```

mod data;
mod mappings;
mod metadata;
mod references;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use gloss_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gloss-import", about = "Bulk-import commands for the Gloss store")]
struct Cli {
  /// Path of the SQLite store.
  #[arg(long, env = "GLOSS_STORE_PATH", default_value = "gloss.db")]
  store: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Import XML entries, page images and their associations.
  Data {
    /// Directory containing the dictionary entry XML files.
    #[arg(long)]
    entries_directory: PathBuf,
    /// Directory containing the page images.
    #[arg(long)]
    images_directory:  PathBuf,
    /// Static-files root; image paths are stored relative to it.
    #[arg(long)]
    static_directory:  PathBuf,
    /// File mapping headwords to comma-separated page numbers.
    #[arg(long)]
    mappings_file:     PathBuf,
    /// Volume under which to import.
    #[arg(long, default_value = "eDTLR")]
    volume:            String,
  },
  /// Insert approved references from a text file, one per line.
  References {
    #[arg(long)]
    input_file: PathBuf,
  },
  /// Recompute the derived columns of every entry and annotation.
  UpdateMetadata,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let store = SqliteStore::open(&cli.store)
    .await
    .with_context(|| format!("failed to open store at {:?}", cli.store))?;

  match cli.command {
    Command::Data {
      entries_directory,
      images_directory,
      static_directory,
      mappings_file,
      volume,
    } => {
      data::run(&store, &data::DataArgs {
        entries_dir: entries_directory,
        images_dir: images_directory,
        static_dir: static_directory,
        mappings_file,
        volume,
      })
      .await
    }
    Command::References { input_file } => {
      references::run(&store, &input_file).await
    }
    Command::UpdateMetadata => metadata::run(&store).await,
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory as _;

  use super::*;

  #[test]
  fn cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn explicit_store_flag_wins() {
    let cli =
      Cli::parse_from(["gloss-import", "--store", "x.db", "update-metadata"]);
    assert_eq!(cli.store, PathBuf::from("x.db"));
    assert!(matches!(cli.command, Command::UpdateMetadata));
  }
}
