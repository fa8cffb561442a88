use std::{
    fmt, fs,
    io::{Read, Seek},
    path::Path,
};

use tracing::debug;

use crate::{index::LineIndex, line::Line, text_file::TextFile, GoTo, Result};

/// Amount of lines the internal `TextFile` reads per step if not specified otherwise.
pub const DEFAULT_WINDOW_SIZE: usize = 256;

/// Holds the offsets of up to `capacity` lines matching a predicate, starting at a given line.
/// Calling `go_to` with a later line returns the next page of matches.
pub struct FilteredFile<R: Read + Seek, F: FnMut(&Line) -> bool> {
    text_file: TextFile<R>,
    matches: LineIndex,
    predicate: F,
    first_line: usize,
    capacity: usize,
}

impl<F: FnMut(&Line) -> bool> FilteredFile<fs::File, F> {
    /// Open the file at `path` and collect the first page of matches.
    pub fn open<P: AsRef<Path>>(
        path: P,
        capacity: usize,
        predicate: F,
    ) -> Result<FilteredFile<fs::File, F>> {
        Self::new(fs::File::open(path)?, capacity, predicate)
    }
}

impl<R: Read + Seek, F: FnMut(&Line) -> bool> FilteredFile<R, F> {
    /// Create a new `FilteredFile` and collect up to `capacity` matches from the beginning of
    /// `stream`.
    #[inline]
    pub fn new(stream: R, capacity: usize, predicate: F) -> Result<FilteredFile<R, F>> {
        Self::with_window_size(stream, capacity, DEFAULT_WINDOW_SIZE, predicate)
    }

    /// Like `new` but scans `window_size` lines per step.
    pub fn with_window_size(
        stream: R,
        capacity: usize,
        window_size: usize,
        predicate: F,
    ) -> Result<FilteredFile<R, F>> {
        let mut filtered = Self {
            text_file: TextFile::new(stream, window_size)?,
            matches: LineIndex::new(),
            predicate,
            first_line: 0,
            capacity,
        };
        filtered.go_to(0)?;
        Ok(filtered)
    }

    /// Returns the matches of the last `go_to` call
    #[inline]
    pub fn matches(&self) -> &LineIndex {
        &self.matches
    }

    /// Max amount of matches per page
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Collects the page following the current one. Returns `false` without scanning if the
    /// current page already reached the end of the stream.
    pub fn next_page(&mut self) -> Result<bool> {
        let last = match self.matches.last_line() {
            Some(last) if self.matches.len() >= self.capacity => last,
            _ => return Ok(false),
        };

        self.go_to(last + 1)?;
        Ok(!self.matches.is_empty())
    }

    /// Reads the contents of all matched lines.
    pub fn matched_lines(&mut self) -> Result<Vec<(usize, Line)>> {
        let mut lines = Vec::with_capacity(self.matches.len());
        for (line, offset) in self.matches.iter() {
            if let Some(read) = self.text_file.read_line_at(offset)? {
                lines.push((line, read));
            }
        }
        Ok(lines)
    }

    /// Scans forward from `first_line` until `capacity` matches are found or the stream ends.
    fn collect_matches(&mut self, first_line: usize) -> Result<LineIndex> {
        let mut matches = LineIndex::new();
        if self.capacity == 0 {
            return Ok(matches);
        }

        // A window already starting at `first_line` holds the same lines a new read would
        if self.text_file.window_start() != first_line {
            self.text_file.go_to(first_line)?;
        }

        loop {
            for (line, cached) in self.text_file.cached_lines() {
                if !(self.predicate)(cached) {
                    continue;
                }

                matches.insert(line, cached.offset());
                if matches.len() >= self.capacity {
                    return Ok(matches);
                }
            }

            // A window which isn't full means the stream has ended
            if self.text_file.len() < self.text_file.window_size() {
                return Ok(matches);
            }

            let next = self.text_file.window_start() + self.text_file.len();
            self.text_file.go_to(next)?;
        }
    }
}

impl<R: Read + Seek, F: FnMut(&Line) -> bool> GoTo for FilteredFile<R, F> {
    /// Replaces the matches with the first `capacity` matches at or after `line`. If an error
    /// occurs, the previous matches are kept.
    fn go_to(&mut self, line: usize) -> Result<()> {
        let matches = self.collect_matches(line)?;

        debug!(line, matches = matches.len(), "filtered");

        self.matches = matches;
        self.first_line = line;
        Ok(())
    }

    #[inline]
    fn first_line(&self) -> usize {
        self.first_line
    }
}

impl<R: Read + Seek + fmt::Debug, F: FnMut(&Line) -> bool> fmt::Debug for FilteredFile<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredFile")
            .field("text_file", &self.text_file)
            .field("matches", &self.matches)
            .field("first_line", &self.first_line)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::{Cell, RefCell},
        io::{self, Cursor, SeekFrom, Write},
        rc::Rc,
    };

    const TEXT: &str = "text\nanotherThing\nanothertext\nsomethingelse\n";

    fn contains(pattern: &'static str) -> impl FnMut(&Line) -> bool {
        move |line: &Line| line.contents().contains(pattern)
    }

    fn matches<R: Read + Seek, F: FnMut(&Line) -> bool>(
        filtered: &FilteredFile<R, F>,
    ) -> Vec<(usize, u64)> {
        filtered.matches().iter().collect()
    }

    #[test]
    fn test_filter() {
        let filtered = FilteredFile::new(Cursor::new(TEXT), 2, contains("text")).unwrap();
        assert_eq!(matches(&filtered), vec![(0, 0), (2, 18)]);
    }

    #[test]
    fn test_pagination() {
        for window_size in 1..6 {
            let mut filtered =
                FilteredFile::with_window_size(Cursor::new(TEXT), 4, window_size, contains("e"))
                    .unwrap();
            assert_eq!(matches(&filtered), vec![(0, 0), (1, 5), (2, 18), (3, 30)]);

            filtered.go_to(2).unwrap();
            assert_eq!(matches(&filtered), vec![(2, 18), (3, 30)]);
            assert_eq!(filtered.first_line(), 2);
        }
    }

    #[test]
    fn test_capacity_bound() {
        let text: String = (0..100).map(|i| format!("{}\n", i)).collect();
        let mut filtered =
            FilteredFile::with_window_size(Cursor::new(text), 5, 3, contains("1")).unwrap();

        assert_eq!(
            matches(&filtered),
            vec![(1, 2), (10, 20), (11, 23), (12, 26), (13, 29)]
        );

        filtered.go_to(50).unwrap();
        let lines: Vec<_> = filtered.matches().iter().map(|(l, _)| l).collect();
        assert_eq!(lines, vec![51, 61, 71, 81, 91]);
    }

    #[test]
    fn test_zero_capacity() {
        let filtered = FilteredFile::new(Cursor::new(TEXT), 0, contains("e")).unwrap();
        assert!(filtered.matches().is_empty());
    }

    #[test]
    fn test_no_match() {
        let mut filtered = FilteredFile::new(Cursor::new(TEXT), 3, contains("zzz")).unwrap();
        assert!(filtered.matches().is_empty());
        assert!(!filtered.next_page().unwrap());

        filtered.go_to(100).unwrap();
        assert!(filtered.matches().is_empty());
    }

    #[test]
    fn test_predicate_evaluated_once() {
        let text: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        let mut filtered = FilteredFile::with_window_size(Cursor::new(text), 4, 3, move |l: &Line| {
            log.borrow_mut().push(l.offset());
            l.contents().ends_with('5')
        })
        .unwrap();

        {
            let seen = seen.borrow();
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(seen.len(), 30);
        }
        assert_eq!(filtered.matches().len(), 3);

        seen.borrow_mut().clear();
        filtered.go_to(20).unwrap();
        let seen = seen.borrow();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_next_page() {
        let text: String = (0..20).map(|i| format!("{}\n", i)).collect();
        let mut filtered =
            FilteredFile::with_window_size(Cursor::new(text), 3, 4, contains("")).unwrap();

        let mut pages = vec![matches(&filtered)];
        while filtered.next_page().unwrap() {
            pages.push(matches(&filtered));
        }

        assert_eq!(pages.len(), 7);
        assert_eq!(pages[0].iter().map(|m| m.0).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(pages[6].iter().map(|m| m.0).collect::<Vec<_>>(), vec![18, 19]);
        assert_eq!(pages.iter().map(|p| p.len()).sum::<usize>(), 20);
    }

    #[test]
    fn test_matched_lines() {
        let mut filtered = FilteredFile::new(Cursor::new(TEXT), 10, contains("text")).unwrap();

        let lines: Vec<_> = filtered
            .matched_lines()
            .unwrap()
            .into_iter()
            .map(|(i, l)| (i, l.contents().to_owned()))
            .collect();

        assert_eq!(
            lines,
            vec![(0, "text".to_owned()), (2, "anothertext".to_owned())]
        );
    }

    /// Counts reads and fails all of them once `broken` is set
    struct SwitchedStream {
        inner: Cursor<&'static str>,
        broken: Rc<Cell<bool>>,
        reads: Rc<Cell<usize>>,
    }

    impl Read for SwitchedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.broken.get() {
                return Err(io::Error::new(io::ErrorKind::Other, "broken stream"));
            }
            self.reads.set(self.reads.get() + 1);
            self.inner.read(buf)
        }
    }

    impl Seek for SwitchedStream {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn switched(text: &'static str) -> (SwitchedStream, Rc<Cell<bool>>, Rc<Cell<usize>>) {
        let broken = Rc::new(Cell::new(false));
        let reads = Rc::new(Cell::new(0));
        let stream = SwitchedStream {
            inner: Cursor::new(text),
            broken: Rc::clone(&broken),
            reads: Rc::clone(&reads),
        };
        (stream, broken, reads)
    }

    #[test]
    fn test_error_keeps_matches() {
        let (stream, broken, _) = switched(TEXT);
        let mut filtered = FilteredFile::new(stream, 2, contains("text")).unwrap();
        assert_eq!(matches(&filtered), vec![(0, 0), (2, 18)]);

        broken.set(true);
        let res = filtered.go_to(1);
        assert!(matches!(res, Err(crate::error::Error::Io(_))));

        assert_eq!(matches(&filtered), vec![(0, 0), (2, 18)]);
        assert_eq!(filtered.first_line(), 0);

        broken.set(false);
        filtered.go_to(1).unwrap();
        assert_eq!(matches(&filtered), vec![(2, 18)]);
        assert_eq!(filtered.first_line(), 1);
    }

    #[test]
    fn test_first_page_reuses_window() {
        let (stream, _, reads) = switched(TEXT);
        let filtered = FilteredFile::new(stream, 2, contains("text")).unwrap();
        let after_new = reads.get();

        let (stream, _, reads) = switched(TEXT);
        let text_file = TextFile::new(stream, DEFAULT_WINDOW_SIZE).unwrap();

        // Collecting the first page doesn't read the stream again
        assert_eq!(reads.get(), after_new);
        assert_eq!(text_file.len(), 4);
        assert_eq!(matches(&filtered), vec![(0, 0), (2, 18)]);
    }

    #[test]
    fn test_open() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TEXT.as_bytes()).unwrap();

        let filtered = FilteredFile::open(file.path(), 2, contains("text")).unwrap();
        assert_eq!(matches(&filtered), vec![(0, 0), (2, 18)]);
    }
}
