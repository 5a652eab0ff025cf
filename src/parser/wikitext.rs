//! Default wikitext parser: heading-based sectioning with plain-text
//! markup stripping.
//!
//! This is intentionally a reduction of full wikitext semantics: templates,
//! comments, ref tags, and tables are dropped; links and emphasis collapse
//! to their visible text; `== Heading ==` lines delimit sections. The lead
//! section (text before any heading) is emitted only when it has content.

use super::{DocumentParser, ParseError, ParsedDocument, Section};

/// Stateless wikitext section parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct WikitextParser;

impl WikitextParser {
    /// Create the parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for WikitextParser {
    fn parse(&self, text: &str) -> Result<ParsedDocument, ParseError> {
        let cleaned = strip_block_markup(text);

        let mut sections: Vec<Section> = Vec::new();
        let mut title = String::new();
        let mut body: Vec<String> = Vec::new();
        let mut in_lead = true;

        for raw_line in cleaned.lines() {
            if let Some(next_title) = heading_title(raw_line) {
                flush_section(&mut sections, &title, &body, in_lead);
                title = next_title;
                body.clear();
                in_lead = false;
                continue;
            }

            let line = strip_inline_markup(raw_line);
            let line = line.trim_start_matches(['*', '#', ':', ';']).trim();
            // Stray table rows survive when the enclosing {| |} was unbalanced.
            if line.starts_with('|') || line.starts_with('!') {
                continue;
            }
            if !line.is_empty() {
                body.push(line.to_string());
            }
        }
        flush_section(&mut sections, &title, &body, in_lead);

        if sections.is_empty() {
            return Ok(ParsedDocument::empty());
        }
        Ok(ParsedDocument { sections })
    }
}

fn flush_section(sections: &mut Vec<Section>, title: &str, body: &[String], in_lead: bool) {
    let text = body.join("\n");
    // No empty lead: documents that open with a heading start at it.
    if in_lead && title.is_empty() && text.is_empty() {
        return;
    }
    sections.push(Section {
        title: title.to_string(),
        text,
    });
}

/// Recognize `== Title ==` heading lines (levels 2-6) and return the
/// cleaned title.
fn heading_title(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if !trimmed.starts_with("==") || !trimmed.ends_with("==") {
        return None;
    }
    let leading = trimmed.len() - trimmed.trim_start_matches('=').len();
    let trailing = trimmed.len() - trimmed.trim_end_matches('=').len();
    if leading < 2 || leading > 6 || trailing < 2 || leading + trailing >= trimmed.len() {
        return None;
    }
    let inner = &trimmed[leading..trimmed.len() - trailing];
    Some(strip_inline_markup(inner).trim().to_string())
}

/// Remove multi-line constructs before line-based sectioning: comments,
/// templates, tables, and ref tags.
fn strip_block_markup(text: &str) -> String {
    let text = strip_delimited(text, "<!--", "-->");
    let text = strip_nested(&text, "{{", "}}");
    let text = strip_nested(&text, "{|", "|}");
    strip_ref_tags(&text)
}

/// Drop non-nesting `open ... close` spans. Unterminated spans run to the
/// end of input.
fn strip_delimited(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after = &rest[start + open.len()..];
        match after.find(close) {
            Some(end) => rest = &after[end + close.len()..],
            None => rest = "",
        }
    }
    out.push_str(rest);
    out
}

/// Drop nesting `open ... close` spans, tracking depth. An unbalanced close
/// at depth zero passes through literally.
fn strip_nested(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with(open) {
            depth += 1;
            i += open.len();
        } else if depth > 0 && rest.starts_with(close) {
            depth -= 1;
            i += close.len();
        } else if let Some(ch) = rest.chars().next() {
            if depth == 0 {
                out.push(ch);
            }
            i += ch.len_utf8();
        } else {
            break;
        }
    }
    out
}

/// Drop `<ref .../>` and `<ref ...>...</ref>` spans.
fn strip_ref_tags(text: &str) -> String {
    const CLOSE: &str = "</ref>";
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<ref") {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find('>') {
            Some(gt) if after[..gt].ends_with('/') => rest = &after[gt + 1..],
            Some(_) => match after.find(CLOSE) {
                Some(end) => rest = &after[end + CLOSE.len()..],
                None => rest = "",
            },
            None => rest = "",
        }
    }
    out.push_str(rest);
    out
}

/// Collapse single-line markup to visible text.
fn strip_inline_markup(line: &str) -> String {
    let line = line.replace("'''", "").replace("''", "");
    let line = strip_wiki_links(&line);
    strip_external_links(&line)
}

/// `[[target|label]]` keeps the label, `[[target]]` keeps the target;
/// file, image, and category links disappear entirely.
fn strip_wiki_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("[[") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("]]") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let inner = &after[..end];
        let target = inner.split('|').next().unwrap_or("").trim();
        let label = inner.rsplit('|').next().unwrap_or("").trim();
        let namespace = target.to_ascii_lowercase();
        if !(namespace.starts_with("file:")
            || namespace.starts_with("image:")
            || namespace.starts_with("category:"))
        {
            out.push_str(label);
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// `[http://url label]` keeps the label; bare `[http://url]` disappears.
fn strip_external_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("[http") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find(']') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let inner = &after[..end];
        if let Some((_, label)) = inner.split_once(' ') {
            out.push_str(label.trim());
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedDocument {
        WikitextParser::new().parse(text).expect("parse")
    }

    #[test]
    fn heading_and_body() {
        let doc = parse("== Title ==\nBody text");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Title");
        assert_eq!(doc.sections[0].text, "Body text");
    }

    #[test]
    fn lead_section_kept_when_nonempty() {
        let doc = parse("Intro paragraph.\n\n== History ==\nOld things.");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "");
        assert_eq!(doc.sections[0].text, "Intro paragraph.");
        assert_eq!(doc.sections[1].title, "History");
    }

    #[test]
    fn empty_lead_skipped() {
        let doc = parse("\n== First ==\ntext");
        assert_eq!(doc.sections[0].title, "First");
    }

    #[test]
    fn sections_preserve_document_order() {
        let doc = parse("== A ==\na\n== B ==\nb\n=== B1 ===\nb1");
        let titles: Vec<_> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "B1"]);
    }

    #[test]
    fn heading_only_section_has_empty_text() {
        let doc = parse("== Lonely ==");
        assert_eq!(doc.sections[0].title, "Lonely");
        assert_eq!(doc.sections[0].text, "");
    }

    #[test]
    fn whitespace_only_input_yields_single_empty_section() {
        let doc = parse("   \n\n  ");
        assert_eq!(doc.sections, vec![Section::default()]);
    }

    #[test]
    fn emphasis_markup_is_stripped() {
        let doc = parse("'''Bold''' and ''italic'' words");
        assert_eq!(doc.sections[0].text, "Bold and italic words");
    }

    #[test]
    fn wiki_links_collapse_to_visible_text() {
        let doc = parse("See [[Other page|other]] and [[Plain link]].");
        assert_eq!(doc.sections[0].text, "See other and Plain link.");
    }

    #[test]
    fn file_and_category_links_disappear() {
        let doc = parse("[[File:Pic.jpg|thumb|caption]]Text[[Category:Things]]");
        assert_eq!(doc.sections[0].text, "Text");
    }

    #[test]
    fn external_links_keep_label_only() {
        let doc = parse("Visit [https://example.org the site] or [https://example.org].");
        assert_eq!(doc.sections[0].text, "Visit the site or .");
    }

    #[test]
    fn templates_and_comments_are_dropped() {
        let doc = parse("{{Infobox|name={{nested}}}}Real text<!-- hidden -->here");
        assert_eq!(doc.sections[0].text, "Real texthere");
    }

    #[test]
    fn ref_tags_are_dropped() {
        let doc = parse("Claim<ref name=\"a\">Source</ref> and fact<ref name=\"b\" />.");
        assert_eq!(doc.sections[0].text, "Claim and fact.");
    }

    #[test]
    fn tables_are_dropped() {
        let doc = parse("Before\n{|\n|-\n| cell\n|}\nAfter");
        assert_eq!(doc.sections[0].text, "Before\nAfter");
    }

    #[test]
    fn list_markers_are_stripped() {
        let doc = parse("== L ==\n* one\n# two\n: three");
        assert_eq!(doc.sections[0].text, "one\ntwo\nthree");
    }

    #[test]
    fn heading_markup_in_title_is_cleaned() {
        let doc = parse("== ''Styled'' [[Link|title]] ==\nbody");
        assert_eq!(doc.sections[0].title, "Styled title");
    }

    #[test]
    fn all_equals_line_is_not_a_heading() {
        assert_eq!(heading_title("===="), None);
        assert_eq!(heading_title("====="), None);
        assert!(heading_title("== ok ==").is_some());
    }

    #[test]
    fn unterminated_template_runs_to_end() {
        let doc = parse("text {{broken\nmore");
        assert_eq!(doc.sections[0].text, "text");
    }
}
