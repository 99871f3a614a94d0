//! Conversion from raw XML entry markup to the inline-markup format.
//!
//! The source tags carry no attributes, so the conversion is a fixed set of
//! literal substring replacements. Unmatched or malformed tags are left in
//! place as ordinary text; the converter never fails.

use crate::text::{correct_diacritics, marks};

/// Convert an XML entry string to inline markup.
///
/// Paragraphs collapse to newlines, the entry wrapper disappears, and
/// `<b>`/`<i>`/`<sup>`/`<sg>` pairs become their inline markers. The result
/// is trimmed and has its cedilla diacritics corrected.
pub fn xml_to_markdown(xml: &str) -> String {
  let data = xml
    .trim()
    .replace("<entry>", "")
    .replace("</entry>", "")
    .replace("<p>", "\n")
    .replace("</p>", "\n")
    .replace("<b>", marks::BOLD)
    .replace("</b>", marks::BOLD)
    .replace("<i>", marks::EMPHASIS)
    .replace("</i>", marks::EMPHASIS)
    .replace("<sup>", marks::SUPERSCRIPT)
    .replace("</sup>", marks::SUPERSCRIPT)
    .replace("<sg>", marks::REFERENCE)
    .replace("</sg>", marks::REFERENCE);

  correct_diacritics(data.trim())
}
