use std::{
    fs,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
    time::Instant,
};

use tracing::debug;

use crate::{
    error::Error,
    line::{self, Line},
    seek::{self, Anchor},
    GoTo, Result,
};

/// A window of at most `window_size` consecutive lines of a stream. Lines outside of the window
/// are never held in memory. Moving the window seeks within the stream, using the lines already
/// cached as anchors to avoid scanning from the beginning.
#[derive(Debug)]
pub struct TextFile<R: Read + Seek> {
    reader: BufReader<R>,
    window_start: usize,
    window_size: usize,
    /// Cached lines. `lines[i]` is the line `window_start + i`
    lines: Vec<Line>,
}

impl TextFile<fs::File> {
    /// Open the file at `path` and cache its first `window_size` lines.
    pub fn open<P: AsRef<Path>>(path: P, window_size: usize) -> Result<TextFile<fs::File>> {
        Self::new(fs::File::open(path)?, window_size)
    }
}

impl<R: Read + Seek> TextFile<R> {
    /// Creates a new `TextFile` over `stream` and caches the first `window_size` lines.
    ///
    /// Returns an error if `window_size` is zero or the stream can't be read.
    pub fn new(stream: R, window_size: usize) -> Result<TextFile<R>> {
        if window_size == 0 {
            return Err(Error::InvalidWindowSize);
        }

        let mut text_file = Self {
            reader: BufReader::new(stream),
            window_start: 0,
            window_size,
            lines: Vec::with_capacity(window_size),
        };

        text_file.reader.seek(SeekFrom::Start(0))?;
        text_file.go_to(0)?;
        Ok(text_file)
    }

    /// Index of the first line of the window.
    #[inline]
    pub fn window_start(&self) -> usize {
        self.window_start
    }

    /// Max amount of lines the window holds.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Amount of lines currently cached. Less than `window_size` if the stream ended within the
    /// window.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the cached `line`, if it's part of the window.
    #[inline]
    pub fn get(&self, line: usize) -> Option<&Line> {
        line.checked_sub(self.window_start)
            .and_then(|pos| self.lines.get(pos))
    }

    /// Iterates over all cached lines together with their line-index, in ascending order.
    pub fn cached_lines(&self) -> impl Iterator<Item = (usize, &Line)> + '_ {
        let start = self.window_start;
        self.lines
            .iter()
            .enumerate()
            .map(move |(pos, line)| (start + pos, line))
    }

    /// Returns the last cached line as anchor.
    fn last_anchor(&self) -> Option<Anchor> {
        let last = self.lines.last()?;
        Some(Anchor::new(
            self.window_start + self.lines.len() - 1,
            last.offset(),
        ))
    }

    /// Finds the nearest known line to start scanning forward from in order to reach `target`.
    fn find_anchor(&mut self, target: usize) -> Result<Anchor> {
        if target == 0 {
            return Ok(Anchor::START);
        }

        let first = match self.lines.first() {
            Some(first) => Anchor::new(self.window_start, first.offset()),
            // The stream ended before the window, nothing is known
            None => return Ok(Anchor::START),
        };

        if target < first.line {
            let offset = seek::find_line_offset(&mut self.reader, first, target)?;
            return Ok(Anchor::new(target, offset));
        }

        if let Some(line) = self.get(target) {
            return Ok(Anchor::new(target, line.offset()));
        }

        // Target is behind the window
        Ok(self.last_anchor().unwrap_or(Anchor::START))
    }

    /// Reads the lines `target..target + window_size`, scanning forward from `anchor`.
    fn read_window(&mut self, anchor: Anchor, target: usize) -> Result<Vec<Line>> {
        self.reader.seek(SeekFrom::Start(anchor.offset))?;

        let mut lines = Vec::with_capacity(self.window_size);
        let mut buf = Vec::with_capacity(1000);
        let mut curr_line = anchor.line;
        let mut curr_offset = anchor.offset;

        while lines.len() < self.window_size {
            let n = match line::read_line(&mut self.reader, &mut buf)? {
                Some(n) => n,
                None => break,
            };

            // Lines before the target only get skipped
            if curr_line >= target {
                lines.push(Line::new(&buf, curr_offset));
            }

            curr_offset += n as u64;
            curr_line += 1;
        }

        Ok(lines)
    }

    /// Reads the line starting at `offset` without changing the window. Returns `None` if there
    /// is no complete line at `offset`.
    pub fn read_line_at(&mut self, offset: u64) -> Result<Option<Line>> {
        self.reader.seek(SeekFrom::Start(offset))?;

        let mut buf = Vec::new();
        Ok(line::read_line(&mut self.reader, &mut buf)?.map(|_| Line::new(&buf, offset)))
    }

    /// Returns the underlying stream
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: Read + Seek> GoTo for TextFile<R> {
    /// Moves the window to start at `line`. If an error occurs, the previous window is kept.
    fn go_to(&mut self, line: usize) -> Result<()> {
        let now = Instant::now();

        let anchor = self.find_anchor(line)?;
        let lines = self.read_window(anchor, line)?;

        self.lines = lines;
        self.window_start = line;

        debug!(
            line,
            anchor_line = anchor.line,
            anchor_offset = anchor.offset,
            cached = self.lines.len(),
            "go_to took {:?}",
            now.elapsed()
        );
        Ok(())
    }

    #[inline]
    fn first_line(&self) -> usize {
        self.window_start
    }
}
