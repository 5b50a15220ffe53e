//! Overlapping character-window splitter.
//!
//! Windows step by `chunk_size - chunk_overlap` and are trimmed back to the
//! last sentence terminator when one falls in the latter half of the window,
//! so chunks rarely cut a sentence mid-way.

const SENTENCE_TERMINATORS: [char; 4] = ['.', '!', '?', '\n'];

pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + chunk_size).min(total);
        let window: String = chars[start..end].iter().collect();

        let piece = if end < total {
            trim_to_sentence_boundary(&window)
        } else {
            window
        };

        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        start += step;
    }

    chunks
}

/// Cut the window back to its last sentence terminator, but only when doing
/// so keeps at least half of the window.
fn trim_to_sentence_boundary(window: &str) -> String {
    let chars: Vec<char> = window.chars().collect();
    let half = chars.len() / 2;

    for idx in (half..chars.len()).rev() {
        if SENTENCE_TERMINATORS.contains(&chars[idx]) {
            return chars[..=idx].iter().collect();
        }
    }

    window.to_string()
}
