use super::EventStreamError;

/// Longest unterminated line kept while waiting for its newline.
pub(crate) const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Reassembles lines from chunks that may end in the middle of a line.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
    limit: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_limit(MAX_LINE_LENGTH)
    }
}

impl LineBuffer {
    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            limit,
        }
    }

    /// Fails once more than `limit` bytes are buffered without a newline among them.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Result<(), EventStreamError> {
        self.pending.extend_from_slice(chunk);
        if self.pending.len() > self.limit && !self.pending.contains(&b'\n') {
            return Err(EventStreamError::LineTooLong(self.limit));
        }
        Ok(())
    }

    /// The next complete line without its terminator and surrounding whitespace.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).trim().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_split_across_chunks() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"data: {\"a\":").unwrap();
        assert_eq!(buffer.next_line(), None);

        buffer.push(b" 1}\r\ndata: {\"b\"").unwrap();
        assert_eq!(buffer.next_line().as_deref(), Some("data: {\"a\": 1}"));
        assert_eq!(buffer.next_line(), None);

        buffer.push(b": 2}\n\n").unwrap();
        assert_eq!(buffer.next_line().as_deref(), Some("data: {\"b\": 2}"));
        assert_eq!(buffer.next_line().as_deref(), Some(""));
        assert_eq!(buffer.next_line(), None);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let text = "data: Привет\n".as_bytes();
        let mut buffer = LineBuffer::default();
        buffer.push(&text[..8]).unwrap();
        buffer.push(&text[8..]).unwrap();
        assert_eq!(buffer.next_line().as_deref(), Some("data: Привет"));
    }

    #[test]
    fn test_unterminated_line_is_capped() {
        let mut buffer = LineBuffer::with_limit(16);
        buffer.push(b"data: 0123456789").unwrap();
        assert!(matches!(
            buffer.push(b"abc"),
            Err(EventStreamError::LineTooLong(16))
        ));
    }

    #[test]
    fn test_long_chunk_with_lines_is_accepted() {
        let mut buffer = LineBuffer::with_limit(16);
        buffer.push(b"data: 1\ndata: 2\ndata: 3\n").unwrap();
        assert_eq!(buffer.next_line().as_deref(), Some("data: 1"));
    }
}
