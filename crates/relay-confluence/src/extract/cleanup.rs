//! Text normalization applied to every emitted section.

/// Line that opens or closes a verbatim region in walker output.
///
/// Text mode has no fence syntax for preformatted blocks, so the walker
/// brackets them with this line. [`clean_text`] keeps the lines between
/// two markers untouched and drops the markers themselves.
pub(crate) const VERBATIM_LINE: &str = "\u{e000}";

/// Normalize extracted text.
///
/// - non-breaking and other Unicode spaces become plain spaces, zero-width
///   characters are removed
/// - runs of spaces after a line's indentation collapse to one
/// - trailing whitespace is stripped from every line
/// - at most one blank line separates blocks
///
/// Entity references are not decoded here: the storage parser already
/// resolved them, so any `&amp;` left in the text is literal content.
///
/// Lines inside fenced code blocks (```` ``` ```` or `~~~`) are kept verbatim.
pub fn clean_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut fence: Option<String> = None;
    let mut verbatim = false;
    let mut starts_verbatim: Option<bool> = None;
    let mut blank_run = 0usize;

    // Text placed before an opening marker on the same line (a list marker
    // or panel label) is joined to the first verbatim line.
    let mut lead: Option<String> = None;

    for raw in text.lines() {
        if let Some(prefix) = raw.trim_end().strip_suffix(VERBATIM_LINE) {
            if !verbatim && !prefix.trim().is_empty() {
                lead = Some(normalize_line(prefix));
                starts_verbatim.get_or_insert(false);
            }
            verbatim = !verbatim;
            continue;
        }
        if verbatim {
            let line = match lead.take() {
                Some(lead) => format!("{lead} {}", raw.trim()),
                None => raw.trim_end().to_owned(),
            };
            if starts_verbatim.is_none() && !line.trim().is_empty() {
                starts_verbatim = Some(true);
            }
            lines.push(line);
            blank_run = 0;
            continue;
        }
        if let Some(marker) = &fence {
            if is_fence_close(raw, marker) {
                fence = None;
            }
            lines.push(raw.trim_end().to_owned());
            blank_run = 0;
            continue;
        }

        let line = normalize_line(raw);
        if let Some(marker) = fence_marker(&line) {
            fence = Some(marker);
        }

        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
            starts_verbatim.get_or_insert(false);
        }
        lines.push(line);
    }

    let joined = lines.join("\n");
    let joined = joined.trim_matches('\n');
    if starts_verbatim == Some(true) {
        joined.trim_end().to_owned()
    } else {
        joined.trim().to_owned()
    }
}

/// Collapse every whitespace run to a single space.
///
/// A leading or trailing run is kept as one space so adjacent inline text
/// stays separated.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else if !is_invisible(ch) {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Collapse whitespace and trim, producing a single line.
pub(crate) fn single_line(text: &str) -> String {
    collapse_whitespace(text).trim().to_owned()
}

fn normalize_line(line: &str) -> String {
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    let (indent, rest) = line.split_at(indent_len);

    let mut out = String::with_capacity(line.len());
    out.push_str(indent);
    let mut in_space = false;
    for ch in rest.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else if !is_invisible(ch) {
            out.push(ch);
            in_space = false;
        }
    }

    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    if out.trim_start().is_empty() {
        out.clear();
    }
    out
}

fn is_invisible(ch: char) -> bool {
    matches!(
        ch,
        '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' | '\u{00ad}' | '\u{e000}'
    )
}

/// Opening fence marker (the run of backticks or tildes) of a line.
pub(crate) fn fence_marker(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.chars().take_while(|c| *c == ch).count();
    (run >= 3).then(|| ch.to_string().repeat(run))
}

pub(crate) fn is_fence_close(line: &str, marker: &str) -> bool {
    let trimmed = line.trim();
    let Some(ch) = marker.chars().next() else {
        return false;
    };
    trimmed.len() >= marker.len() && trimmed.chars().all(|c| c == ch)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(clean_text("a\n\n\n\nb\n\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_normalizes_unicode_spaces() {
        assert_eq!(clean_text("Fish\u{00a0}&\u{00a0}Chips"), "Fish & Chips");
        assert_eq!(clean_text("a\u{00a0}\u{00a0}b\u{200b}c"), "a bc");
    }

    #[test]
    fn test_entity_text_is_literal() {
        assert_eq!(
            clean_text("Write &lt;br/&gt; and &amp;"),
            "Write &lt;br/&gt; and &amp;"
        );
    }

    #[test]
    fn test_verbatim_region_untouched() {
        let text = format!(
            "Run:\n\n{VERBATIM_LINE}\n    let  x  =  1;\n\n\n\nfoo(a,   b)\n{VERBATIM_LINE}\n\n\nafter   it"
        );
        assert_eq!(
            clean_text(&text),
            "Run:\n\n    let  x  =  1;\n\n\n\nfoo(a,   b)\n\nafter it"
        );
    }

    #[test]
    fn test_verbatim_after_item_marker() {
        let text = format!("- {VERBATIM_LINE}\n  cargo  build\n    --release\n  {VERBATIM_LINE}");
        assert_eq!(clean_text(&text), "- cargo  build\n    --release");
    }

    #[test]
    fn test_leading_verbatim_keeps_indentation() {
        let text = format!("{VERBATIM_LINE}\n  indented\n{VERBATIM_LINE}");
        assert_eq!(clean_text(&text), "  indented");
    }

    #[test]
    fn test_strips_trailing_whitespace_and_trims() {
        assert_eq!(clean_text("\n\n  one   \ntwo\t\n\n"), "one\ntwo");
    }

    #[test]
    fn test_keeps_indentation() {
        assert_eq!(clean_text("- a\n  - b    c"), "- a\n  - b c");
    }

    #[test]
    fn test_whitespace_only_lines_count_as_blank() {
        assert_eq!(clean_text("a\n   \n\t\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_fenced_code_untouched() {
        let text = "intro\n\n```rust\nlet  x = \"&amp;\";\n\n\n\nfoo()\n```\n\n\nafter";
        assert_eq!(
            clean_text(text),
            "intro\n\n```rust\nlet  x = \"&amp;\";\n\n\n\nfoo()\n```\n\nafter"
        );
    }

    #[test]
    fn test_collapse_whitespace_keeps_edges() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), " a b ");
        assert_eq!(single_line("  a \n b  "), "a b");
    }

    #[test]
    fn test_fence_marker() {
        assert_eq!(fence_marker("```rust").as_deref(), Some("```"));
        assert_eq!(fence_marker("  ~~~~").as_deref(), Some("~~~~"));
        assert_eq!(fence_marker("``inline``"), None);
    }
}
