use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Seeking or reading the underlying stream failed
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
    /// A backward seek ran into the start of the stream before reaching `line`
    #[error("line {line} does not exist before the anchor")]
    LineNotFound { line: usize },
    /// A window has to hold at least one line
    #[error("window size must be at least 1")]
    InvalidWindowSize,
}
