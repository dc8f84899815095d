use std::fmt;
use thiserror::Error;
use crate::{
    object::Value,
    walker::heap::HeapRef,
};

/// The category an error object belongs to.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum ErrorKind {
    UnboundSymbol,
    Arity,
    Index,
    Type,
    Io,
    User,
    Read,
    Arithmetic,
    Depth,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::UnboundSymbol => "UnboundSymbol",
            ErrorKind::Arity => "ArityError",
            ErrorKind::Index => "IndexError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Io => "IOError",
            ErrorKind::User => "UserError",
            ErrorKind::Read => "ReadError",
            ErrorKind::Arithmetic => "ArithmeticError",
            ErrorKind::Depth => "DepthError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A non-local exit out of the evaluator.
///
/// Holds the heap handle of the raised error object. Every evaluation step returns
/// `Result<_, ExecError>`; only `catch` and `repl` turn one back into an ordinary value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExecError(pub(crate) HeapRef);

impl ExecError {
    pub fn object(&self) -> Value {
        Value::Ref(self.0)
    }
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Thing {
    List,
    String,
    Quote,
}

impl fmt::Display for Thing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Thing::List => "list",
            Thing::String => "string",
            Thing::Quote => "quoted form",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ReadErrorKind {
    #[error("unexpected '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated {0}")]
    Unclosed(Thing),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected end of stream")]
    UnexpectedEof,
    #[error("nesting too deep")]
    TooDeep,
}

#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind}{}", while_reading_suffix(.while_reading))]
pub struct ReadError {
    kind: ReadErrorKind,
    line: Option<i64>,
    while_reading: Vec<Thing>,
}

fn while_reading_suffix(things: &[Thing]) -> String {
    match things.first() {
        Some(thing) => format!(" while reading {}", thing),
        None => String::new(),
    }
}

impl ReadError {
    pub fn unexpected_char(c: char) -> Self {
        Self::from(ReadErrorKind::UnexpectedChar(c))
    }

    pub fn unclosed(thing: Thing) -> Self {
        Self::from(ReadErrorKind::Unclosed(thing))
    }

    pub fn invalid_number(text: String) -> Self {
        Self::from(ReadErrorKind::InvalidNumber(text))
    }

    pub fn unexpected_eof() -> Self {
        Self::from(ReadErrorKind::UnexpectedEof)
    }

    pub fn too_deep() -> Self {
        Self::from(ReadErrorKind::TooDeep)
    }

    pub fn at(mut self, line: i64) -> Self {
        self.line = Some(line);
        self
    }

    pub fn while_reading(mut self, thing: Thing) -> Self {
        self.while_reading.push(thing);
        self
    }

    pub fn kind(&self) -> &ReadErrorKind {
        &self.kind
    }

    pub fn line(&self) -> Option<i64> {
        self.line
    }
}

impl From<ReadErrorKind> for ReadError {
    fn from(kind: ReadErrorKind) -> Self {
        Self {
            kind,
            line: None,
            while_reading: Vec::new(),
        }
    }
}

/// An error object that escaped to the host, already rendered to text.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{rendered}")]
pub struct Error {
    kind: ErrorKind,
    rendered: String,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, rendered: String) -> Self {
        Self { kind, rendered }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_mentions_context() {
        let err = ReadError::unclosed(Thing::List)
            .while_reading(Thing::Quote)
            .at(7);
        assert_eq!(err.to_string(), "unterminated list while reading quoted form");
        assert_eq!(err.line(), Some(7));
        assert_eq!(err.kind(), &ReadErrorKind::Unclosed(Thing::List));
    }
}
