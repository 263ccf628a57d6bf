//! Sentence segmentation over an incrementally filled buffer.
//!
//! Chunk boundaries carry no meaning: they may split words, punctuation or
//! decimal numbers arbitrarily, so the segmenter accumulates text and only
//! commits to a sentence when it sees a terminator that is not a decimal
//! point, or when the buffer outgrows the configured threshold.

/// A speakable unit of input text. `sequence` is assigned at segmentation
/// time in strictly increasing order and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub text: String,
    pub sequence: u64,
}

#[derive(Debug)]
pub struct SentenceSegmenter {
    buffer: String,
    next_sequence: u64,
    max_chars: usize,
    lookahead: usize,
}

impl SentenceSegmenter {
    pub fn new(max_chars: usize, lookahead: usize) -> Self {
        Self {
            buffer: String::new(),
            next_sequence: 0,
            max_chars: max_chars.max(1),
            lookahead,
        }
    }

    /// Append a normalized chunk and drain every sentence that can be
    /// extracted. Candidates without a word-forming character (e.g. a bare
    /// `"..."`) are discarded without consuming a sequence number.
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<Sentence> {
        self.buffer.push_str(chunk);
        let mut out = Vec::new();
        while let Some((candidate, rest)) = split_first_sentence(&self.buffer, self.max_chars, self.lookahead) {
            self.buffer = rest;
            if let Some(sentence) = self.accept(candidate) {
                out.push(sentence);
            }
        }
        out
    }

    /// Flush the remaining buffer once the input stream has ended.
    pub fn finish(&mut self) -> Option<Sentence> {
        let tail = std::mem::take(&mut self.buffer);
        self.accept(tail.trim().to_string())
    }

    fn accept(&mut self, text: String) -> Option<Sentence> {
        if !has_word_character(&text) {
            return None;
        }
        let sentence = Sentence {
            text,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        Some(sentence)
    }
}

fn has_word_character(text: &str) -> bool {
    text.chars().any(|c| c.is_alphanumeric())
}

/// Find the first complete sentence in `buffer`.
///
/// A `.` between two digits is part of a number, never a terminator. When
/// no terminator exists and the buffer exceeds `max_chars`, the split falls
/// on the last space within the first `max_chars + lookahead` characters,
/// or exactly at `max_chars` if no space is in range. Returns the trimmed
/// sentence candidate and the trimmed remainder, or `None` when the buffer
/// should keep waiting for more input.
fn split_first_sentence(buffer: &str, max_chars: usize, lookahead: usize) -> Option<(String, String)> {
    if buffer.is_empty() {
        return None;
    }
    let chars: Vec<char> = buffer.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        let terminates = match c {
            '!' | '?' => true,
            '.' => {
                // A period between two digits is a decimal point. A period
                // at the end of the buffer right after a digit is ambiguous
                // until the next chunk arrives, so it is deferred too;
                // `finish` flushes it if the stream ends there.
                let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
                let next_digit = chars
                    .get(i + 1)
                    .map_or(true, |n| n.is_ascii_digit());
                !(prev_digit && next_digit)
            }
            _ => false,
        };
        if terminates {
            return Some(split_at_char(&chars, i + 1));
        }
    }

    if chars.len() > max_chars {
        let search_end = (max_chars + lookahead).min(chars.len());
        let split_at = chars[..search_end]
            .iter()
            .rposition(|&c| c == ' ')
            .filter(|&i| i > 0)
            .unwrap_or(max_chars);
        return Some(split_at_char(&chars, split_at));
    }

    None
}

fn split_at_char(chars: &[char], at: usize) -> (String, String) {
    let sentence: String = chars[..at].iter().collect();
    let rest: String = chars[at..].iter().collect();
    (sentence.trim().to_string(), rest.trim().to_string())
}
