//! Byte-offset ranges and line/column conversion.

pub use text_size::{TextRange, TextSize};

/// A 0-indexed line/column position. Columns count bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Converts between absolute byte offsets and line/column positions.
///
/// Handles `\n`, `\r\n`, and lone `\r` line endings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Offset of the first byte of each line.
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![TextSize::new(0)];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(super::text_size(i + 2));
                    i += 2;
                    continue;
                }
                b'\r' | b'\n' => line_starts.push(super::text_size(i + 1)),
                _ => {}
            }
            i += 1;
        }
        Self {
            line_starts,
            len: super::text_size(bytes.len()),
        }
    }

    /// Number of lines in the text (an empty text has one line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert an offset into a line/column position.
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let col = offset - self.line_starts[line];
        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    /// Convert a line/column position into an absolute offset.
    ///
    /// Returns `None` if the line does not exist or the column runs past
    /// the end of the line.
    pub fn offset(&self, pos: LineCol) -> Option<TextSize> {
        let line = pos.line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.len);
        let offset = start + TextSize::new(pos.col);
        (offset <= end).then_some(offset)
    }
}
