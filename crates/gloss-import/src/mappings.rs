//! The entry-page mapping file and headword normalisation.
//!
//! Mapping files are plain text, one entry per line: the headword, a
//! comma, then the comma-separated page numbers the entry appears on.
//! Headwords in the file and XML file stems both reduce to the same
//! canonical form before lookup.

use std::{
  collections::{BTreeSet, HashMap},
  path::{Path, PathBuf},
};

use anyhow::Context as _;

/// Canonical form of a headword: first whitespace token, uppercased,
/// cedilla and stray Latin diacritics folded, truncated at the first
/// non-alphabetic character.
pub fn normalize_headword(raw: &str) -> String {
  let Some(first) = raw.split_whitespace().next() else {
    return String::new();
  };
  first
    .to_uppercase()
    .chars()
    .map(fold_char)
    .take_while(|c| c.is_alphabetic())
    .collect()
}

// Cedilla forms fold to the comma-below letters; accented As collapse to
// the plain letter (OCR artifacts in the mapping files).
fn fold_char(c: char) -> char {
  match c {
    'Ş' => 'Ș',
    'Ţ' => 'Ț',
    'Å' | 'Á' | 'Ấ' | 'Ắ' => 'A',
    _ => c,
  }
}

/// Load and parse a mapping file into page-number sets per canonical
/// headword.
pub fn load_mappings(
  path: &Path,
) -> anyhow::Result<HashMap<String, BTreeSet<u32>>> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading mappings file {}", path.display()))?;
  Ok(parse_mappings(&raw))
}

/// Parse `HEADWORD,p1,p2,…` lines. Repeated headwords merge their page
/// sets; lines without pages or with an empty headword are skipped.
pub fn parse_mappings(raw: &str) -> HashMap<String, BTreeSet<u32>> {
  let mut result: HashMap<String, BTreeSet<u32>> = HashMap::new();
  for line in raw.lines() {
    let Some((headword, pages)) = line.split_once(',') else {
      continue;
    };
    let headword = normalize_headword(headword);
    if headword.is_empty() {
      continue;
    }
    let numbers = pages
      .split(',')
      .filter_map(|n| n.trim().parse::<u32>().ok());
    result.entry(headword).or_default().extend(numbers);
  }
  result
}

/// Map page numbers to image paths: every `*.png` directly in `dir`,
/// keyed by the first digit run in its file stem.
pub fn scan_images(dir: &Path) -> anyhow::Result<HashMap<u32, PathBuf>> {
  let mut results = HashMap::new();
  let listing = std::fs::read_dir(dir)
    .with_context(|| format!("reading images directory {}", dir.display()))?;
  for entry in listing {
    let path = entry?.path();
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
      continue;
    }
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
      continue;
    };
    if let Some(no) = first_digit_run(stem) {
      results.insert(no, path);
    }
  }
  Ok(results)
}

fn first_digit_run(stem: &str) -> Option<u32> {
  let start = stem.find(|c: char| c.is_ascii_digit())?;
  let digits: String = stem[start..]
    .chars()
    .take_while(|c| c.is_ascii_digit())
    .collect();
  digits.parse().ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn headword_reduces_to_first_token_uppercased() {
    assert_eq!(normalize_headword("mâţă de mare"), "MÂȚĂ");
  }

  #[test]
  fn headword_stops_at_the_first_non_letter() {
    assert_eq!(normalize_headword("CAL2"), "CAL");
    assert_eq!(normalize_headword("a-lene"), "A");
  }

  #[test]
  fn headword_folds_accented_vowels() {
    assert_eq!(normalize_headword("åşa"), "AȘA");
  }

  #[test]
  fn empty_headword_stays_empty() {
    assert_eq!(normalize_headword("   "), "");
    assert_eq!(normalize_headword("123"), "");
  }

  #[test]
  fn mappings_merge_repeated_headwords() {
    let parsed = parse_mappings("CAL,1,2\ncal,2,3\nMÂȚĂ,7\n");
    assert_eq!(
      parsed["CAL"].iter().copied().collect::<Vec<_>>(),
      vec![1, 2, 3]
    );
    assert_eq!(parsed["MÂȚĂ"].iter().copied().collect::<Vec<_>>(), vec![7]);
  }

  #[test]
  fn mappings_skip_malformed_lines() {
    let parsed = parse_mappings("no-comma-here\n,5\nCAL,1\n");
    assert_eq!(parsed.len(), 1);
    assert!(parsed.contains_key("CAL"));
  }

  #[test]
  fn digit_run_in_image_stems() {
    assert_eq!(first_digit_run("page_0042_scan"), Some(42));
    assert_eq!(first_digit_run("no-digits"), None);
  }
}
