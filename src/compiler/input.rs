//! Byte-offset cursor over template source.
//!
//! All parsing is speculative: a production reads ahead through the cursor
//! and rewinds to a saved checkpoint when it fails to match. The cursor
//! itself never allocates; it is plain offset arithmetic over the borrowed
//! source.

/// A saved cursor location, handed back by [`Cursor::checkpoint`].
pub(crate) type Checkpoint = usize;

/// Scanner over raw template source.
///
/// Offsets are byte offsets. Multi-byte UTF-8 sequences are consumed whole
/// through [`Cursor::take_char`], so the offset always sits on a character
/// boundary.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }

    /// The full source this cursor scans.
    pub(crate) fn source(&self) -> &'a str {
        self.source
    }

    /// Current byte offset.
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Saves the current location so a failed production can rewind.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        self.offset
    }

    /// Rewinds to a previously saved checkpoint.
    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        self.offset = checkpoint;
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.offset += n;
    }

    pub(crate) fn regress(&mut self, n: usize) {
        self.offset -= n;
    }

    /// True when fewer than `len` bytes remain.
    pub(crate) fn is_past_eof(&self, len: usize) -> bool {
        self.offset + len > self.source.len()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.is_past_eof(1)
    }

    /// The next byte, if any.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.offset).copied()
    }

    /// Byte-for-byte literal match at the current offset, without consuming.
    pub(crate) fn matches(&self, literal: &str) -> bool {
        self.source.as_bytes()[self.offset..]
            .starts_with(literal.as_bytes())
    }

    /// Consumes and returns one full character.
    pub(crate) fn take_char(&mut self) -> Option<char> {
        let c = self.source[self.offset..].chars().next()?;
        self.offset += c.len_utf8();
        Some(c)
    }
}
