//! The `data` subcommand: bulk-import XML entries, page images and their
//! associations.
//!
//! Failures are per record: an entry whose pages lack images, whose file
//! cannot be read, or whose rows collide with existing ones is logged and
//! skipped; the run continues.

use std::{
  collections::{BTreeSet, HashMap},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use gloss_core::{
  convert::xml_to_markdown, entry::NewEntry, store::AnnotationStore as _,
};
use gloss_store_sqlite::SqliteStore;

use crate::mappings::{load_mappings, normalize_headword, scan_images};

pub struct DataArgs {
  pub entries_dir:   PathBuf,
  pub images_dir:    PathBuf,
  /// Static-files root; image paths are stored relative to it.
  pub static_dir:    PathBuf,
  pub mappings_file: PathBuf,
  pub volume:        String,
}

pub async fn run(store: &SqliteStore, args: &DataArgs) -> anyhow::Result<()> {
  let mappings = load_mappings(&args.mappings_file)?;
  let images = scan_images(&args.images_dir)?;

  for entry_file in xml_files(&args.entries_dir)? {
    let stem = entry_file
      .file_stem()
      .and_then(|s| s.to_str())
      .unwrap_or_default();
    let headword = normalize_headword(stem);

    let Some(page_nos) = mappings.get(&headword) else {
      tracing::warn!(
        %headword,
        file = %entry_file.display(),
        "no page mappings for entry"
      );
      continue;
    };

    let imported = import_entry(
      store,
      &entry_file,
      page_nos,
      &images,
      &args.volume,
      &args.static_dir,
    )
    .await;
    if let Err(e) = imported {
      tracing::error!(
        file = %entry_file.display(),
        error = %e,
        "skipping entry"
      );
    }
  }

  tracing::info!("finished importing data");
  Ok(())
}

fn xml_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
  let listing = std::fs::read_dir(dir)
    .with_context(|| format!("reading entries directory {}", dir.display()))?;
  let mut files = Vec::new();
  for entry in listing {
    let path = entry?.path();
    if path.extension().and_then(|e| e.to_str()) == Some("xml") {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

async fn import_entry(
  store: &SqliteStore,
  entry_file: &Path,
  page_nos: &BTreeSet<u32>,
  images: &HashMap<u32, PathBuf>,
  volume_name: &str,
  static_dir: &Path,
) -> anyhow::Result<()> {
  // Every page needs an image before anything is written.
  for no in page_nos {
    anyhow::ensure!(images.contains_key(no), "no image found for page {no}");
  }

  let volume = store.get_or_create_volume(volume_name).await?;
  let mut pages = Vec::with_capacity(page_nos.len());
  for no in page_nos {
    let image = &images[no];
    let relative = image.strip_prefix(static_dir).unwrap_or(image);
    let page = store
      .get_or_create_page(volume.volume_id, *no, &relative.to_string_lossy())
      .await?;
    pages.push(page);
  }

  let xml = std::fs::read_to_string(entry_file)
    .with_context(|| format!("reading {}", entry_file.display()))?;
  let entry = store
    .add_entry(NewEntry::from_text(xml_to_markdown(&xml)))
    .await?;

  for page in &pages {
    if let Err(e) = store.link_entry_page(entry.entry_id, page.page_id).await {
      if e.is_constraint_violation() {
        tracing::warn!(
          entry_id = entry.entry_id,
          page_id = page.page_id,
          "entry-page link already exists"
        );
      } else {
        return Err(e.into());
      }
    }
  }

  move_to_imported(entry_file)?;
  tracing::info!(
    entry_id = entry.entry_id,
    pages = page_nos.len(),
    file = %entry_file.display(),
    "imported entry"
  );
  Ok(())
}

/// Move a processed XML file into `imported/` next to it.
fn move_to_imported(entry_file: &Path) -> anyhow::Result<()> {
  let parent = entry_file
    .parent()
    .context("entry file has no parent directory")?;
  let imported = parent.join("imported");
  std::fs::create_dir_all(&imported)?;
  let target =
    imported.join(entry_file.file_name().context("entry file has no name")?);
  std::fs::rename(entry_file, &target).with_context(|| {
    format!("moving {} to {}", entry_file.display(), target.display())
  })?;
  Ok(())
}
