/// A reading error with source location.
///
/// `line` and `col` are 1-based positions taken from the source cursor.
/// For end-of-input errors (e.g. a missing `)`), the position is the end of
/// the text, so locations are never `0:0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for ReaderError {
    /// Formats as `line:col: message` for CLI-friendly diagnostics.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ReaderError {}
