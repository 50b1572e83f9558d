//! Streaming segment reader
//!
//! Splits an interchange into segments without materializing the envelope a
//! second time: every segment id and element is a borrowed slice of the
//! input. Inter-segment whitespace (newlines, indentation) is trimmed and
//! blank segments are skipped.

use crate::delimiters::Delimiters;

/// One X12 segment: its tag and the elements following it, in order.
/// `elements[0]` is the first element after the tag (e.g. CLM01).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub id: &'a str,
    pub elements: Vec<&'a str>,
}

impl<'a> Segment<'a> {
    /// Element by 1-based X12 position (`element(5)` is CLM05). Missing
    /// trailing elements read as empty.
    pub fn element(&self, position: usize) -> &'a str {
        debug_assert!(position >= 1);
        self.elements.get(position - 1).copied().unwrap_or("")
    }

    /// Split a composite element into its sub-elements.
    pub fn composite(&self, position: usize, delims: &Delimiters) -> Vec<&'a str> {
        let raw = self.element(position);
        if raw.is_empty() {
            return Vec::new();
        }
        raw.split(delims.sub_element).collect()
    }
}

/// Forward-only scanner over the segments of one interchange.
pub struct SegmentScanner<'a> {
    input: &'a str,
    delims: Delimiters,
    pos: usize,
}

impl<'a> SegmentScanner<'a> {
    pub fn new(input: &'a str, delims: Delimiters) -> Self {
        SegmentScanner {
            input,
            delims,
            pos: 0,
        }
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delims
    }

    /// Bytes of input consumed so far, including the terminator of the last
    /// returned segment. Lets the caller resume after an IEA when the input
    /// carries multiple interchanges.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// The next non-blank segment, or `None` at end of input.
    pub fn next_segment(&mut self) -> Option<Segment<'a>> {
        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];
            let (raw, advance) = match rest.find(self.delims.segment) {
                Some(end) => (&rest[..end], end + self.delims.segment.len_utf8()),
                None => (rest, rest.len()),
            };
            self.pos += advance;

            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let mut parts = raw.split(self.delims.element);
            let id = parts.next().unwrap_or("").trim();
            if id.is_empty() {
                continue;
            }
            return Some(Segment {
                id,
                elements: parts.collect(),
            });
        }
        None
    }
}
