use std::io::{Read, Seek, SeekFrom};

use itertools::Itertools;
use tracing::trace;

use crate::{error::Error, Result};

/// Max amount of bytes read at once while walking backwards through a stream.
pub const BACKWARD_CHUNK_SIZE: u64 = 512 * 1024;

/// A line with a known byte offset, used as starting point for scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub line: usize,
    pub offset: u64,
}

impl Anchor {
    /// The beginning of every stream
    pub const START: Anchor = Anchor { line: 0, offset: 0 };

    #[inline]
    pub fn new(line: usize, offset: u64) -> Anchor {
        Self { line, offset }
    }
}

/// Finds the byte offset of `target`, a line before `anchor`, by reading the stream backwards in
/// chunks of at most `BACKWARD_CHUNK_SIZE` bytes and counting line terminators.
///
/// Returns `Error::LineNotFound` if the start of the stream is reached before `target`.
pub fn find_line_offset<R: Read + Seek>(
    reader: &mut R,
    anchor: Anchor,
    target: usize,
) -> Result<u64> {
    find_line_offset_chunked(reader, anchor, target, BACKWARD_CHUNK_SIZE)
}

pub(crate) fn find_line_offset_chunked<R: Read + Seek>(
    reader: &mut R,
    anchor: Anchor,
    target: usize,
    chunk_size: u64,
) -> Result<u64> {
    if target >= anchor.line {
        return if target == anchor.line {
            Ok(anchor.offset)
        } else {
            Err(Error::LineNotFound { line: target })
        };
    }

    if anchor.offset == 0 {
        return Err(Error::LineNotFound { line: target });
    }

    // Amount of line starts we still have to cross
    let mut remaining = anchor.line - target;

    // The byte right before the anchor terminates the previous line. Everything before is
    // unexamined.
    let mut scan_end = anchor.offset - 1;

    let mut buf = vec![0; chunk_size.min(scan_end) as usize];

    while scan_end > 0 {
        let size = chunk_size.min(scan_end);
        let start = scan_end - size;
        let chunk = &mut buf[..size as usize];

        reader.seek(SeekFrom::Start(start))?;
        reader.read_exact(chunk)?;

        trace!(start, size, remaining, "scanning backwards");

        // Positions are counted from the end of the chunk
        for pos in chunk.iter().rev().positions(|b| *b == b'\n') {
            remaining -= 1;
            if remaining == 0 {
                return Ok(scan_end - pos as u64);
            }
        }

        scan_end = start;
    }

    // The start of the stream is the beginning of line 0
    if remaining == 1 {
        return Ok(0);
    }

    Err(Error::LineNotFound { line: target })
}
