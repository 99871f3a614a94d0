//! The `references` subcommand: insert approved references from a text
//! file, one per line, skipping ones already present.

use std::path::Path;

use anyhow::Context as _;
use gloss_core::store::AnnotationStore as _;
use gloss_store_sqlite::SqliteStore;

pub async fn run(store: &SqliteStore, input_file: &Path) -> anyhow::Result<()> {
  let raw = std::fs::read_to_string(input_file)
    .with_context(|| format!("reading references file {}", input_file.display()))?;

  for line in raw.lines() {
    let text = line.trim();
    if text.is_empty() {
      continue;
    }
    if store.reference_exists(text).await? {
      tracing::warn!(%text, "reference already exists");
      continue;
    }
    store.add_reference(text, true).await?;
    tracing::info!(%text, "inserted reference");
  }

  Ok(())
}
