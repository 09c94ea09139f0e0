use super::reader_error::ReaderError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

/// Character cursor over program text with 1-based line/column tracking.
pub struct Source {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Source {
    pub fn new(text: &str) -> Self {
        Source {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        Some(ch)
    }

    pub fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    /// Skip whitespace and `;` line comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                ';' => {
                    while let Some(c) = self.current() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Error at the current position.
    pub fn error(&self, message: impl Into<String>) -> ReaderError {
        self.error_at(self.span(), message)
    }

    pub fn error_at(&self, span: Span, message: impl Into<String>) -> ReaderError {
        ReaderError {
            message: message.into(),
            line: span.line,
            col: span.col,
        }
    }
}
