//! Inline HTML rendering for the annotation workbench.
//!
//! The pages are deliberately plain: a textarea, the page-image viewer
//! hook, and two submit buttons. Styling and the image viewer script are
//! served by the external static layer.

use gloss_core::{annotation::AnnotationId, entry::EntryId};

/// Escape text for embedding in HTML content or attribute values.
pub fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

fn layout(title: &str, body: &str) -> String {
  format!(
    "<!doctype html>\n\
     <html lang=\"ro\">\n\
     <head><meta charset=\"utf-8\"><title>{}</title></head>\n\
     <body>\n{}\n</body>\n\
     </html>\n",
    escape(title),
    body
  )
}

/// The annotation editor for one in-progress annotation.
pub fn editor(
  annotation_id: AnnotationId,
  entry_id: EntryId,
  title_word: &str,
  text: &str,
  notice: Option<&str>,
) -> String {
  let notice_html = match notice {
    Some(msg) => format!("<p class=\"notice\">{}</p>\n", escape(msg)),
    None => String::new(),
  };

  let body = format!(
    "<h1>{title}</h1>\n\
     {notice}\
     <div id=\"viewer\" data-entry-url=\"/api/entries/{entry_id}\"></div>\n\
     <form method=\"post\" action=\"/save\" id=\"annotation-{annotation_id}\">\n\
     <input type=\"hidden\" name=\"entry-id\" value=\"{entry_id}\">\n\
     <textarea name=\"text\" rows=\"24\" cols=\"80\">{text}</textarea>\n\
     <p>\n\
     <button type=\"submit\">Save</button>\n\
     <button type=\"submit\" formaction=\"/complete\">Complete</button>\n\
     <a href=\"/new\">New entry</a>\n\
     </p>\n\
     </form>",
    title = escape(title_word),
    notice = notice_html,
    entry_id = entry_id,
    annotation_id = annotation_id,
    text = escape(text),
  );
  layout(title_word, &body)
}

/// The no-work-available page.
pub fn thank_you() -> String {
  layout(
    "Thank you",
    "<h1>Thank you!</h1>\n\
     <p>There are no entries left to annotate right now.</p>\n\
     <p><a href=\"/\">Back to your annotations</a></p>",
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escape_covers_markup_characters() {
    assert_eq!(
      escape(r#"<b>"fish" & 'chips'</b>"#),
      "&lt;b&gt;&quot;fish&quot; &amp; &#39;chips&#39;&lt;/b&gt;"
    );
  }

  #[test]
  fn editor_escapes_the_annotation_text() {
    let page = editor(3, 7, "CAL", "**CAL**\n<sup>1</sup>", None);
    assert!(page.contains("&lt;sup&gt;1&lt;/sup&gt;"));
    assert!(page.contains("value=\"7\""));
    assert!(page.contains("/api/entries/7"));
  }

  #[test]
  fn editor_renders_the_notice_when_present() {
    let page = editor(3, 7, "CAL", "**CAL**", Some("too short"));
    assert!(page.contains("too short"));
  }
}
