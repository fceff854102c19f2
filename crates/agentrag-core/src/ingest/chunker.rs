//! Overlapping character chunking

use super::TextChunk;
use crate::providers::hash_content;

/// Default window, in characters
pub const CHUNK_SIZE_CHARS: usize = 1000;
/// Default overlap between consecutive windows, in characters
pub const CHUNK_OVERLAP_CHARS: usize = 200;

/// Byte offset of every char boundary, ending with `content.len()`
fn char_boundaries(content: &str) -> Vec<usize> {
    content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()))
        .collect()
}

/// Split `content` into overlapping windows of at most `chunk_size` characters.
///
/// Cuts prefer a paragraph break, then a sentence end, a newline, and finally
/// a space, searched in the last 30% of the window. Whitespace-only windows
/// are dropped. Every chunk records the `source` it came from and its
/// character offset.
pub fn chunk_text(source: &str, content: &str, chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size.saturating_sub(1));

    if content.trim().is_empty() {
        return Vec::new();
    }

    let bounds = char_boundaries(content);
    let char_count = bounds.len() - 1;

    if char_count <= chunk_size {
        return vec![make_chunk(source, content, 0)];
    }

    // Char index of a byte offset that is known to sit on a boundary
    let char_at = |byte: usize| bounds.partition_point(|&b| b < byte);

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        let mut chunk_end = end;

        if end < char_count {
            let search_start = start + chunk_size * 70 / 100;

            if search_start < end {
                let region_start = bounds[search_start];
                let region = &content[region_start..bounds[end]];

                let cut = if let Some(pos) = region.rfind("\n\n") {
                    Some(pos + 2)
                } else if let Some(pos) = region.rfind(". ") {
                    Some(pos + 2)
                } else if let Some(pos) = region.rfind('\n') {
                    Some(pos + 1)
                } else {
                    region.rfind(' ').map(|pos| pos + 1)
                };

                if let Some(cut) = cut {
                    chunk_end = char_at(region_start + cut);
                }
            }
        }

        let piece = &content[bounds[start]..bounds[chunk_end]];
        if !piece.trim().is_empty() {
            chunks.push(make_chunk(source, piece, start));
        }

        if chunk_end >= char_count {
            break;
        }

        let next = chunk_end.saturating_sub(overlap);
        start = if next > start { next } else { chunk_end };
    }

    chunks
}

fn make_chunk(source: &str, text: &str, position: usize) -> TextChunk {
    TextChunk {
        text: text.to_string(),
        source: source.to_string(),
        position,
        hash: hash_content(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_chunk_small_content() {
        let content = "Small content.";
        let chunks = chunk_text("raw text", content, 100, 20);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, content);
        assert_eq!(chunks[0].source, "raw text");
        assert_eq!(chunks[0].position, 0);
    }

    #[test]
    fn test_chunk_empty_content() {
        assert!(chunk_text("raw text", "   \n\n  ", 100, 20).is_empty());
    }

    #[test]
    fn test_chunk_preserves_paragraphs() {
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_text("doc", content, 30, 5);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].text.starts_with("First paragraph."));
    }

    #[test]
    fn test_chunks_overlap() {
        let content = "word ".repeat(100);
        let chunks = chunk_text("doc", &content, 100, 20);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let first_end = pair[0].position + pair[0].text.chars().count();
            assert!(pair[1].position < first_end, "consecutive chunks must overlap");
        }
    }

    #[test]
    fn test_chunk_handles_unicode() {
        let content = "Hello 世界! This is a test with emoji 🎉 and special chars ─ here.";
        let chunks = chunk_text("doc", content, 20, 5);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
        }
    }

    #[test]
    fn test_identical_text_identical_hash() {
        let a = chunk_text("a", "same text", 100, 10);
        let b = chunk_text("b", "same text", 100, 10);
        assert_eq!(a[0].hash, b[0].hash);
    }

    #[test]
    fn test_window_counts_characters_not_bytes() {
        // 30 chars but 90 bytes: one window of 40 characters holds it all
        let content = "世".repeat(30);
        let chunks = chunk_text("doc", &content, 40, 5);
        assert_eq!(chunks.len(), 1);

        let content = "é".repeat(100);
        let chunks = chunk_text("doc", &content, 40, 10);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 40));
        assert_eq!(chunks[1].position, 30);
    }

    proptest! {
        #[test]
        fn prop_chunks_cover_content_in_order(
            content in "[a-zé世 .\n]{1,600}",
            size in 10usize..200,
            overlap in 0usize..50,
        ) {
            let chunks = chunk_text("p", &content, size, overlap);
            let mut last = 0usize;
            for chunk in &chunks {
                prop_assert!(chunk.position >= last || chunk.position == 0);
                let len = chunk.text.chars().count();
                prop_assert!(len <= size.max(1));
                let window: String = content.chars().skip(chunk.position).take(len).collect();
                prop_assert_eq!(window, chunk.text.clone());
                last = chunk.position;
            }
            if !content.trim().is_empty() {
                prop_assert!(!chunks.is_empty());
                let tail = chunks.last().unwrap();
                let covered = tail.position + tail.text.chars().count();
                let rest: String = content.chars().skip(covered).collect();
                prop_assert!(rest.trim().is_empty());
            }
        }
    }
}
