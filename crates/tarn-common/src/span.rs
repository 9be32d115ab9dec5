use serde::Serialize;

/// Identifies one source buffer within a compilation.
///
/// The core never reads files; drivers hand it pre-read sources and use the
/// id to map diagnostics back to whatever they read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceId(pub u32);

/// Byte-offset span into one source. Start is inclusive, end is exclusive.
///
/// All positions in the Tarn compiler are tracked as byte offsets into the
/// original source string. Line/column information is computed on demand
/// via [`LineIndex`] when needed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub source: SourceId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    pub fn new(source: SourceId, start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { source, start, end }
    }

    /// A zero-length span, used for fully synthesized nodes.
    pub fn empty(source: SourceId) -> Self {
        Self::new(source, 0, 0)
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span is empty (zero-length).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one covering both.
    ///
    /// Spans may only be merged when they come from the same source and
    /// `self` does not start after `other`; [`Span::try_merge`] reports
    /// violations instead of panicking.
    pub fn merge(self, other: Span) -> Span {
        self.try_merge(other)
            .expect("merged spans must share a source and be ordered")
    }

    /// Merge two spans, or `None` if they come from different sources or
    /// are out of order.
    pub fn try_merge(self, other: Span) -> Option<Span> {
        if self.source != other.source || self.start > other.start {
            return None;
        }
        Some(Span {
            source: self.source,
            start: self.start,
            end: self.end.max(other.end),
        })
    }
}

/// Pre-computed index of line start positions for on-demand line/column
/// lookup.
///
/// Constructed once per source, then used to convert byte offsets to
/// human-readable (line, column) pairs via binary search.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index by scanning the source text for newlines.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    ///
    /// Column is measured in bytes from the start of the line (1-based).
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        // partition_point returns the index of the first line_start > offset,
        // so the line index is one less than that.
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line_idx = line_idx.saturating_sub(1);
        let line = (line_idx as u32) + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: SourceId = SourceId(0);

    #[test]
    fn span_new_and_len() {
        let span = Span::new(SRC, 5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn span_empty() {
        let span = Span::new(SRC, 3, 3);
        assert_eq!(span.len(), 0);
        assert!(span.is_empty());
    }

    #[test]
    fn span_merge_ordered() {
        let a = Span::new(SRC, 5, 10);
        let b = Span::new(SRC, 8, 15);
        let merged = a.merge(b);
        assert_eq!((merged.start, merged.end), (5, 15));
    }

    #[test]
    fn span_merge_rejects_unordered() {
        let a = Span::new(SRC, 8, 15);
        let b = Span::new(SRC, 5, 10);
        assert_eq!(a.try_merge(b), None);
    }

    #[test]
    fn span_merge_rejects_cross_source() {
        let a = Span::new(SourceId(0), 0, 4);
        let b = Span::new(SourceId(1), 4, 8);
        assert_eq!(a.try_merge(b), None);
    }

    #[test]
    fn line_index_multiple_lines() {
        let idx = LineIndex::new("hello\nworld\nfoo");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(6), (2, 1));
        assert_eq!(idx.line_col(12), (3, 1));
        assert_eq!(idx.line_col(13), (3, 2));
    }

    #[test]
    fn line_index_newline_at_offset() {
        let idx = LineIndex::new("ab\ncd");
        assert_eq!(idx.line_col(2), (1, 3));
        assert_eq!(idx.line_col(3), (2, 1));
    }

    #[test]
    fn line_index_line_count() {
        assert_eq!(LineIndex::new("a\nb\nc").line_count(), 3);
    }
}
