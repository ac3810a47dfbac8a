//! Recursive text chunking with configurable size and overlap.
//!
//! Documents are split at the coarsest separator that applies — paragraph,
//! line, sentence, then comma — and pieces that are still too large fall
//! through to finer separators, bottoming out at character level. Adjacent
//! pieces are then merged into chunks of at most `chunk_size` characters,
//! carrying the trailing `overlap` characters of each closed chunk into the
//! next one as context.

/// Preferred split separators, coarsest first.
pub const SEPARATORS: [&str; 4] = ["\n\n", "\n", ".", ","];

/// Split `text` into ordered, overlapping chunks.
///
/// Every returned chunk is at most `chunk_size` characters; each chunk
/// after the first starts with up to `overlap` trailing characters of its
/// predecessor. Whitespace-only chunks are dropped.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    // An overlap as large as the chunk itself would make no forward progress
    let overlap = if overlap < chunk_size {
        overlap
    } else {
        chunk_size / 2
    };

    let pieces = split_recursive(text, &SEPARATORS, chunk_size, overlap);
    let chunks = merge_pieces(pieces, chunk_size, overlap);

    tracing::debug!(
        "Chunked {} chars into {} chunks (size: {}, overlap: {})",
        text.chars().count(),
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

/// Recursively split text into pieces small enough to merge.
///
/// The first separator that divides the text is used; oversized pieces are
/// re-split with the remaining, finer separators. When the separator list
/// is exhausted the piece is cut at character level — never below.
fn split_recursive(text: &str, separators: &[&str], chunk_size: usize, overlap: usize) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    let Some((separator, rest)) = separators.split_first() else {
        // Character-level floor: pieces sized to leave room for the carry
        return split_chars(text, (chunk_size - overlap).max(1));
    };

    let mut pieces = Vec::new();
    for part in text.split_inclusive(separator) {
        if char_len(part) <= chunk_size {
            pieces.push(part.to_string());
        } else {
            pieces.extend(split_recursive(part, rest, chunk_size, overlap));
        }
    }
    pieces
}

/// Cut text into consecutive runs of at most `piece_size` characters.
fn split_chars(text: &str, piece_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(piece_size)
        .map(|run| run.iter().collect())
        .collect()
}

/// Merge ordered pieces into chunks of at most `chunk_size` characters,
/// carrying trailing overlap into each new chunk.
fn merge_pieces(pieces: Vec<String>, chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        let piece_len = char_len(&piece);
        let current_len = char_len(&current);

        if current_len > 0 && current_len + piece_len > chunk_size {
            // Close the chunk; the carry shrinks if the next piece needs
            // the room to stay within the chunk size
            let carry_len = overlap.min(chunk_size.saturating_sub(piece_len));
            let carry = tail_chars(&current, carry_len);
            push_chunk(&mut chunks, current);
            current = carry;
        }

        current.push_str(&piece);
    }

    push_chunk(&mut chunks, current);
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, chunk: String) {
    if !chunk.trim().is_empty() {
        chunks.push(chunk);
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn tail_chars(s: &str, n: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars[chars.len().saturating_sub(n)..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("Hello, world!", 200, 40);
        assert_eq!(chunks, vec!["Hello, world!".to_string()]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", 200, 40).is_empty());
    }

    #[test]
    fn test_size_bound_and_overlap() {
        let text = "a".repeat(953);
        let chunks = chunk_text(&text, 200, 40);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 200, "chunk exceeds size bound");
        }

        // Each chunk after the first starts with the trailing characters of
        // its predecessor, at most 40 of them
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let tail: String = prev[prev.len().saturating_sub(40)..].iter().collect();
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn test_overlap_carries_previous_tail() {
        let text: String = (0..600)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();
        let chunks = chunk_text(&text, 200, 40);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev_tail: String = {
                let chars: Vec<char> = pair[0].chars().collect();
                chars[chars.len().saturating_sub(40)..].iter().collect()
            };
            assert!(
                pair[1].starts_with(&prev_tail),
                "chunk does not begin with predecessor's tail"
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let text = format!("{}\n\n{}", "first paragraph ".repeat(8), "second paragraph ".repeat(8));
        let chunks = chunk_text(&text, 200, 40);

        // The paragraph boundary becomes a chunk boundary rather than a
        // mid-word character cut
        assert!(chunks[0].contains("first paragraph"));
        assert!(chunks.last().unwrap().contains("second paragraph"));
    }

    #[test]
    fn test_sentence_fallback() {
        let text = "One sentence here. Another sentence there. ".repeat(10);
        let chunks = chunk_text(&text, 200, 40);

        for chunk in &chunks {
            assert!(chunk.chars().count() <= 200);
        }
    }

    #[test]
    fn test_whitespace_only_chunks_dropped() {
        let chunks = chunk_text("   \n\n   \n ", 200, 40);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_multibyte_text_is_not_split_inside_chars() {
        let text = "γλώσσα ".repeat(60);
        let chunks = chunk_text(&text, 100, 20);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn test_degenerate_overlap_still_progresses() {
        let text = "b".repeat(500);
        let chunks = chunk_text(&text, 100, 100);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }
}
