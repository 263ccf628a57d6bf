//! Chunk-level text cleanup before segmentation.

/// Strip characters the synthesis service rejects and formatting markers
/// that would otherwise be read aloud. Control characters become spaces so
/// they still separate words; emphasis markers are removed outright. The
/// result is never longer than the input.
pub fn normalize_chunk(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '*' | '_' | '#' | '`' => None,
            '\n' | '\t' => Some(c),
            c if c.is_control() => Some(' '),
            c => Some(c),
        })
        .collect()
}
