//! Inline-markup marks and the pure text helpers shared by entries,
//! annotations and the import pipeline.

use unicode_normalization::UnicodeNormalization as _;
use unicode_normalization::char::is_combining_mark;

// ─── Marks ───────────────────────────────────────────────────────────────────

/// The inline markers of the markup format.
pub mod marks {
  pub const BOLD: &str = "**";
  pub const EMPHASIS: &str = "*";
  pub const SUPERSCRIPT: &str = "^";
  pub const SUBSCRIPT: &str = "_";
  pub const REFERENCE: &str = "@";
  pub const SPACED: &str = "$";
}

/// Remove every inline marker from `text`, leaving plain words only.
pub fn strip_marks(text: &str) -> String {
  text
    .chars()
    .filter(|c| !matches!(c, '*' | '^' | '_' | '@' | '$'))
    .collect()
}

// ─── Title word ──────────────────────────────────────────────────────────────

/// Extract the headword from the bolded prefix of `text`.
///
/// The title word is the content of a leading `**…**` span (with any
/// superscript markers dropped). Texts without such a prefix yield the whole
/// text unchanged.
pub fn extract_title_word(text: &str) -> String {
  let Some(rest) = text.strip_prefix(marks::BOLD) else {
    return text.to_owned();
  };
  // The span content runs to the first `*`; the prefix only counts as a
  // title-word marker when a closing `**` sits right there.
  let Some(star) = rest.find('*') else {
    return text.to_owned();
  };
  if !rest[star..].starts_with(marks::BOLD) {
    return text.to_owned();
  }
  rest[..star].replace(marks::SUPERSCRIPT, "")
}

/// The bolded form of a title word, as it appears at the start of a text.
pub fn format_title_word(title_word: &str) -> String {
  format!("{}{}{}", marks::BOLD, title_word, marks::BOLD)
}

// ─── Diacritics ──────────────────────────────────────────────────────────────

/// Replace the legacy cedilla diacritics with their comma-below forms.
pub fn correct_diacritics(text: &str) -> String {
  text
    .chars()
    .map(|c| match c {
      'Ş' => 'Ș',
      'ş' => 'ș',
      'Ţ' => 'Ț',
      'ţ' => 'ț',
      other => other,
    })
    .collect()
}

/// Strip diacritics by NFKD-decomposing and dropping combining marks.
pub fn remove_diacritics(text: &str) -> String {
  text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn title_word_from_bolded_prefix() {
    assert_eq!(extract_title_word("**CAT**\nA small feline."), "CAT");
  }

  #[test]
  fn title_word_without_prefix_is_whole_text() {
    assert_eq!(extract_title_word("CAT, a small feline."), "CAT, a small feline.");
  }

  #[test]
  fn title_word_with_unterminated_bold_is_whole_text() {
    assert_eq!(extract_title_word("**CAT"), "**CAT");
  }

  #[test]
  fn title_word_drops_superscript_markers() {
    assert_eq!(extract_title_word("**CAT^2^**rest"), "CAT2");
  }

  #[test]
  fn empty_title_word() {
    assert_eq!(extract_title_word("****rest"), "");
  }

  #[test]
  fn strip_marks_removes_all_markers() {
    assert_eq!(strip_marks("**A**, *b*, c^2^, d_1_, @e@, $f$"), "A, b, c2, d1, e, f");
  }

  #[test]
  fn corrects_cedilla_diacritics() {
    assert_eq!(correct_diacritics("Şase şi Ţara ţin"), "Șase și Țara țin");
  }

  #[test]
  fn removes_diacritics() {
    assert_eq!(remove_diacritics("MÂȚĂ"), "MATA");
    assert_eq!(remove_diacritics("își"), "isi");
  }
}
