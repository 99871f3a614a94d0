//! The `update-metadata` subcommand: recompute the derived columns of
//! every entry and annotation from their current text. Annotation versions
//! are left alone; nothing about the text itself changes.

use gloss_core::store::AnnotationStore as _;
use gloss_store_sqlite::SqliteStore;

pub async fn run(store: &SqliteStore) -> anyhow::Result<()> {
  let mut entries = 0usize;
  for mut entry in store.all_entries().await? {
    entry.refresh_metadata();
    store.update_entry(&entry).await?;
    entries += 1;
  }

  let mut annotations = 0usize;
  for mut annotation in store.all_annotations().await? {
    annotation.refresh_metadata();
    store.update_annotation(&annotation).await?;
    annotations += 1;
  }

  tracing::info!(entries, annotations, "recomputed derived columns");
  Ok(())
}
