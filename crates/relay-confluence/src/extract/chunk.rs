//! Size-bounded chunking of sections.

use super::Section;
use super::cleanup::{fence_marker, is_fence_close};

/// Split sections whose content exceeds `max_chars` characters.
///
/// Content is cut on blank-line boundaries outside fenced code blocks; a
/// single paragraph longer than the limit is cut at the last whitespace
/// before it, or hard-cut when it has none. A paragraph holding a fenced
/// block is never cut, so a chunk may exceed the limit to keep the fence
/// balanced. Chunks after the first get `" (part N)"` appended to the title.
/// A limit of `0` returns the sections unchanged.
pub fn chunk_sections(sections: Vec<Section>, max_chars: usize) -> Vec<Section> {
    if max_chars == 0 {
        return sections;
    }

    let mut out = Vec::with_capacity(sections.len());
    for section in sections {
        if section.content.chars().count() <= max_chars {
            out.push(section);
            continue;
        }

        let parts = split_content(&section.content, max_chars);
        tracing::debug!(
            "Split section '{}' into {} chunks",
            section.title,
            parts.len()
        );
        for (index, content) in parts.into_iter().enumerate() {
            let title = if index == 0 {
                section.title.clone()
            } else {
                format!("{} (part {})", section.title, index + 1)
            };
            out.push(Section {
                title,
                hierarchy: section.hierarchy.clone(),
                level: section.level,
                content,
            });
        }
    }
    out
}

fn split_content(content: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for (paragraph, fenced) in paragraphs(content) {
        let pieces = if fenced {
            vec![paragraph.as_str()]
        } else {
            split_long(&paragraph, max_chars)
        };
        for piece in pieces {
            let piece_len = piece.chars().count();
            if !current.is_empty() && current_len + 2 + piece_len > max_chars {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push_str("\n\n");
                current_len += 2;
            }
            current.push_str(piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Blank-line separated paragraphs with their indentation, flagged when they
/// contain a fenced block. Blank lines inside a fence do not separate.
fn paragraphs(content: &str) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    let mut fence: Option<String> = None;
    let mut fenced = false;

    for line in content.lines() {
        if let Some(marker) = &fence {
            if is_fence_close(line, marker) {
                fence = None;
            }
            lines.push(line);
            continue;
        }
        if line.trim().is_empty() {
            if !lines.is_empty() {
                out.push((lines.join("\n"), fenced));
                lines.clear();
            }
            fenced = false;
            continue;
        }
        if let Some(marker) = fence_marker(line) {
            fence = Some(marker);
            fenced = true;
        }
        lines.push(line);
    }
    if !lines.is_empty() {
        out.push((lines.join("\n"), fenced));
    }
    out
}

fn split_long(paragraph: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = paragraph;
    while rest.chars().count() > max_chars {
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(i, _)| i);
        let cut = rest[..limit]
            .rfind(char::is_whitespace)
            .filter(|&i| i > 0)
            .unwrap_or(limit);
        pieces.push(rest[..cut].trim_end());
        rest = rest[cut..].trim_start();
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}
