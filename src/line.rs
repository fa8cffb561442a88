use std::io::BufRead;

use crate::Result;

/// A single line of a file together with the position of its first byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    contents: String,
    offset: u64,
}

impl Line {
    /// Create a new line from raw bytes read at `offset`. The line terminator is stripped.
    pub fn new(raw: &[u8], offset: u64) -> Line {
        Self {
            contents: String::from_utf8_lossy(trim_terminator(raw)).into_owned(),
            offset,
        }
    }

    /// Returns the lines contents without its terminator
    #[inline]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Returns the offset of the first byte of the line
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Strips a trailing `\n` and a `\r` right before it.
pub fn trim_terminator(raw: &[u8]) -> &[u8] {
    match raw {
        [rest @ .., b'\r', b'\n'] => rest,
        [rest @ .., b'\n'] => rest,
        _ => raw,
    }
}

/// Reads the next terminated line into `buf`, including the terminator. Returns the amount of
/// bytes the line occupies in the stream, or `None` if the stream has ended. A trailing fragment
/// without terminator is treated as the end of the stream.
pub fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<usize>> {
    buf.clear();
    let n = reader.read_until(b'\n', buf)?;

    if n == 0 || buf.last() != Some(&b'\n') {
        return Ok(None);
    }

    Ok(Some(n))
}

/// Counts the terminated lines left in `reader`.
pub fn count_lines<R: BufRead>(reader: &mut R) -> Result<usize> {
    let mut buf = Vec::with_capacity(1000);
    let mut lines = 0;
    while read_line(reader, &mut buf)?.is_some() {
        lines += 1;
    }
    Ok(lines)
}
