use std::error::Error;
use std::fmt;

/// Line number (starting at one).
pub type Position = u32;

/// A parse error together with the line it was noticed on.
#[derive(Debug, PartialEq)]
pub struct FullParseError {
    pub pos: Position,
    pub error: ParseError,
}

impl fmt::Display for FullParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: line {}: {}", self.pos, self.error)
    }
}

impl Error for FullParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// The parser needed one kind of token and saw another.
    UnexpectedToken { expected: String, got: String },
    /// No expression can start with this token.
    NoPrefixParseFn(String),
    /// An integer literal that does not fit an `i64`.
    BadIntLiteral(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { expected, got } => {
                write!(f, "expected {}, got {}", expected, got)
            }
            ParseError::NoPrefixParseFn(token) => {
                write!(f, "no prefix parse function for {}", token)
            }
            ParseError::BadIntLiteral(lit) => {
                write!(f, "could not parse {} as integer", lit)
            }
        }
    }
}
