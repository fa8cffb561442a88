use std::io::{Read, Seek};

use tracing::warn;

use crate::{text_file::TextFile, GoTo, Result};

/// State of a single view onto a file, meant to be owned by a display loop. The visible rows are
/// the cached window of the underlying `TextFile`.
#[derive(Debug)]
pub struct ViewSession<R: Read + Seek> {
    text_file: TextFile<R>,
    last_error: Option<String>,
}

impl<R: Read + Seek> ViewSession<R> {
    /// Create a new session showing `text_file`. The window size of the file is used as amount
    /// of rows.
    #[inline]
    pub fn new(text_file: TextFile<R>) -> ViewSession<R> {
        Self {
            text_file,
            last_error: None,
        }
    }

    /// Line shown in the top row.
    #[inline]
    pub fn top_line(&self) -> usize {
        self.text_file.window_start()
    }

    #[inline]
    pub fn text_file(&self) -> &TextFile<R> {
        &self.text_file
    }

    /// The error of the last failed navigation, if the last navigation failed.
    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Contents of each visible row. `None` for rows past the end of the file.
    pub fn rows(&self) -> Vec<Option<&str>> {
        let top = self.top_line();
        (0..self.text_file.window_size())
            .map(|row| {
                top.checked_add(row)
                    .and_then(|line| self.text_file.get(line))
                    .map(|l| l.contents())
            })
            .collect()
    }

    /// Short description of the cached window.
    pub fn status(&self) -> String {
        let status = format!(
            "Cache {} - {}",
            self.text_file.window_start(),
            self.text_file.window_size()
        );

        match &self.last_error {
            Some(err) => format!("{} ({})", status, err),
            None => status,
        }
    }

    /// Shows `line` in the top row. Returns `false` if the file couldn't be read, in which case
    /// the previous rows stay visible.
    pub fn go_to(&mut self, line: usize) -> bool {
        let res = self.text_file.go_to(line);
        self.record(res)
    }

    /// Moves one line up, stopping at the first line.
    pub fn scroll_up(&mut self) -> bool {
        if self.top_line() == 0 {
            return false;
        }

        let res = self.text_file.go_by(-1);
        self.record(res)
    }

    /// Moves one line down unless the top row already shows the last line.
    pub fn scroll_down(&mut self) -> bool {
        let top = self.top_line();

        let res = self.text_file.go_by(1);
        if !self.record(res) {
            return false;
        }

        if self.text_file.is_empty() {
            let res = self.text_file.go_to(top);
            self.record(res);
            return false;
        }

        true
    }

    fn record(&mut self, res: Result<()>) -> bool {
        match res {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(err) => {
                warn!(top_line = self.top_line(), "navigation failed: {}", err);
                self.last_error = Some(err.to_string());
                false
            }
        }
    }
}
