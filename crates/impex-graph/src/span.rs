use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Source location for a parsed record: byte range plus the 1-based
/// line/column of the range start, ready for diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub file: PathBuf,
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
}

impl SourceSpan {
    /// Construct a span from a path, byte offsets, and precomputed line/column.
    pub fn new(file: impl AsRef<Path>, start: u32, end: u32, line: u32, column: u32) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");

        Self {
            file: file.as_ref().to_path_buf(),
            start,
            end,
            line,
            column,
        }
    }

    /// Construct a span from byte offsets, deriving line/column from source.
    pub fn from_source(file: impl AsRef<Path>, source: &str, start: u32, end: u32) -> Self {
        let (line, column) = line_column(source, start);
        Self::new(file, start, end, line, column)
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true when the span has zero width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether the span contains a byte offset.
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Convert a byte offset into a 1-based `(line, column)` pair.
pub fn line_column(source: &str, offset: u32) -> (u32, u32) {
    let offset = (offset as usize).min(source.len());
    let prefix = &source[..offset];

    let line = prefix.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
    let column = match prefix.rfind('\n') {
        Some(idx) => prefix[idx + 1..].chars().count() as u32 + 1,
        None => prefix.chars().count() as u32 + 1,
    };

    (line, column)
}
