//! Bounds-checked 32-bit word cursor over a page buffer
//!
//! The decoder never touches the page bytes directly; it walks them through
//! this cursor, which refuses to read past the boundary declared by the
//! page header. Words are read as host-order (little-endian) u32.

/// How payload words sit in the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordLayout {
    /// Payload words packed back to back
    #[default]
    Contiguous,
    /// Two payload words per 128-bit link frame: words 0 and 1 of each
    /// four-word group carry data, words 2 and 3 are link padding
    GbtInterleaved,
}

/// Cursor over the 32-bit words of one page
#[derive(Debug)]
pub struct WordCursor<'a> {
    page: &'a [u8],
    offset: usize,
    limit: usize,
    layout: WordLayout,
}

impl<'a> WordCursor<'a> {
    /// Create a contiguous cursor starting at `start` bytes into `page`,
    /// refusing to read at or past `limit` bytes. The limit is clamped to
    /// the buffer length and truncated to whole words.
    pub fn new(page: &'a [u8], start: usize, limit: usize) -> Self {
        Self::with_layout(page, start, limit, WordLayout::Contiguous)
    }

    pub fn with_layout(page: &'a [u8], start: usize, limit: usize, layout: WordLayout) -> Self {
        let limit = limit.min(page.len()) & !0x3;
        Self {
            page,
            offset: start,
            limit,
            layout,
        }
    }

    /// Byte distance to the next payload word
    #[inline]
    fn step_bytes(&self) -> usize {
        match self.layout {
            WordLayout::Contiguous => 4,
            // From an odd word of a group, jump over the two padding
            // words to the next group
            WordLayout::GbtInterleaved => {
                if (self.offset / 4) % 4 == 1 {
                    12
                } else {
                    4
                }
            }
        }
    }

    /// Current byte offset from the start of the page
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.offset
    }

    /// Declared decode boundary in bytes
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// True once the cursor has reached or passed the decode boundary
    #[inline]
    pub fn at_end(&self) -> bool {
        self.offset + 4 > self.limit
    }

    /// Read the current word without advancing
    #[inline]
    pub fn peek(&self) -> Option<u32> {
        if self.at_end() {
            return None;
        }
        let b = &self.page[self.offset..self.offset + 4];
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Advance by `n` payload words
    #[inline]
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.offset += self.step_bytes();
        }
    }

    /// Read the current word and advance past it
    #[inline]
    pub fn take(&mut self) -> Option<u32> {
        let w = self.peek()?;
        self.offset += self.step_bytes();
        Some(w)
    }
}
