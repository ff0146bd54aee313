//! UTF-8 safe splitting for oversized segments.
//!
//! Splits text into character-counted windows with overlap, tracking
//! the line offset of every window so documents keep accurate line
//! numbers. All boundaries fall on `char_indices()` positions, so
//! multi-byte sequences are never cut.

/// Character-windowed text splitter.
///
/// Sizes are measured in **characters**, not bytes.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    /// Characters per segment
    chunk_size: usize,

    /// Characters shared between consecutive segments
    overlap: usize,
}

/// One split window and the number of lines preceding it in the input.
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub line_offset: usize,
}

impl TextSplitter {
    /// Create a splitter. `chunk_size` must be non-zero and larger than
    /// `overlap`; config validation upholds this for runtime values.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        assert!(overlap < chunk_size, "overlap must be < chunk_size");

        Self {
            chunk_size,
            overlap,
        }
    }

    /// Whether `text` fits in a single segment.
    pub fn fits(&self, text: &str) -> bool {
        text.chars().count() <= self.chunk_size
    }

    /// Split text into overlapping segments.
    ///
    /// Boundaries are computed over `char_indices()`, so every segment
    /// is valid UTF-8 regardless of emojis or other multi-byte
    /// sequences in the input.
    pub fn split(&self, text: &str) -> Vec<Segment> {
        let char_indices: Vec<(usize, char)> = text.char_indices().collect();

        if char_indices.is_empty() {
            return Vec::new();
        }

        // Line offset at each character position, so a segment knows
        // how many lines precede it.
        let mut line_at = Vec::with_capacity(char_indices.len());
        let mut line = 0usize;
        for &(_, c) in &char_indices {
            line_at.push(line);
            if c == '\n' {
                line += 1;
            }
        }

        let mut segments = Vec::new();
        let mut char_start = 0;

        while char_start < char_indices.len() {
            let char_end = (char_start + self.chunk_size).min(char_indices.len());

            let byte_start = char_indices[char_start].0;
            let byte_end = if char_end < char_indices.len() {
                char_indices[char_end].0
            } else {
                text.len()
            };

            segments.push(Segment {
                text: text[byte_start..byte_end].to_string(),
                line_offset: line_at[char_start],
            });

            // Always advance at least one character to guarantee
            // termination.
            let step = self.chunk_size.saturating_sub(self.overlap);
            char_start += step.max(1);
        }

        segments
    }
}
