//!A simple library to view large text files by lines without loading them into memory. Lines are
//!read through a bounded window which is repositioned by seeking within the underlying stream.

pub mod error;
/// Predicate filtered line index
pub mod filtered;
/// Matched lines of a filtered file
pub mod index;
/// Line type and helper to parse lines from a stream
pub mod line;
/// Seeking backwards from a known line
pub mod seek;
/// View state for a display layer
pub mod session;
/// A cached window of lines
pub mod text_file;

pub use error::Error;
pub use filtered::FilteredFile;
pub use index::LineIndex;
pub use line::Line;
pub use session::ViewSession;
pub use text_file::TextFile;

pub type Result<T> = std::result::Result<T, error::Error>;

/// Shared navigation of line based views.
pub trait GoTo {
    /// Should reposition the view so it starts at `line`
    fn go_to(&mut self, line: usize) -> Result<()>;

    /// Returns the line the view currently starts at
    fn first_line(&self) -> usize;

    /// Moves the view by `delta` lines. Moving before the first line stops at line 0.
    fn go_by(&mut self, delta: isize) -> Result<()> {
        let target = if delta < 0 {
            self.first_line().saturating_sub(delta.unsigned_abs())
        } else {
            self.first_line().saturating_add(delta as usize)
        };
        self.go_to(target)
    }
}
