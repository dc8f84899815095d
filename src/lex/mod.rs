use crate::{
    error::{ReadError, Thing},
    object::{stream::EOF, InputStream},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    QuasiQuote,
    Unquote,
    UnquoteSplicing,
    Str(Vec<u8>),
    Num(i64),
    Sym(Vec<u8>),
    Eof,
}

/// Splits a character stream into tokens, one token at a time.
///
/// The lexer always holds the next unconsumed character, so reading can stop after any
/// form and resume later from [`Lexer::current`].
pub struct Lexer {
    c: i32,
    line: i64,
}

fn is_space(c: i32) -> bool {
    matches!(c, 0x09..=0x0d | 0x20)
}

fn ends_atom(c: i32) -> bool {
    c == EOF || is_space(c) || matches!(c as u8, b'(' | b')' | b'"' | b';')
}

impl Lexer {
    pub fn start() -> Self {
        Self::with_char(b' ' as i32)
    }

    /// Resume with `c` as the next character.
    pub fn with_char(c: i32) -> Self {
        Self { c, line: 1 }
    }

    pub fn line(&self) -> i64 {
        self.line
    }

    pub fn current(&self) -> i32 {
        self.c
    }

    fn bump(&mut self, stream: &mut dyn InputStream) {
        if self.c == b'\n' as i32 {
            self.line += 1;
        }
        self.c = stream.read_char();
    }

    pub fn next_token(&mut self, stream: &mut dyn InputStream) -> Result<Token, ReadError> {
        loop {
            match self.c {
                EOF => return Ok(Token::Eof),
                c if is_space(c) => self.bump(stream),
                c if c == b';' as i32 => {
                    while self.c != EOF && self.c != b'\n' as i32 {
                        self.bump(stream);
                    }
                },
                c => return self.token(c as u8, stream),
            }
        }
    }

    fn token(&mut self, c: u8, stream: &mut dyn InputStream) -> Result<Token, ReadError> {
        let single = match c {
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b'\'' => Some(Token::Quote),
            b'`' => Some(Token::QuasiQuote),
            _ => None,
        };
        if let Some(token) = single {
            self.bump(stream);
            return Ok(token);
        }

        match c {
            b',' => {
                self.bump(stream);
                if self.c == b'@' as i32 {
                    self.bump(stream);
                    Ok(Token::UnquoteSplicing)
                } else {
                    Ok(Token::Unquote)
                }
            },
            b'"' => self.string(stream),
            _ => self.atom(stream),
        }
    }

    fn string(&mut self, stream: &mut dyn InputStream) -> Result<Token, ReadError> {
        let start = self.line;
        let mut bytes = Vec::new();
        self.bump(stream);
        loop {
            match self.c {
                EOF => return Err(ReadError::unclosed(Thing::String).at(start)),
                c if c == b'"' as i32 => {
                    self.bump(stream);
                    return Ok(Token::Str(bytes));
                },
                c => {
                    bytes.push(c as u8);
                    self.bump(stream);
                },
            }
        }
    }

    fn atom(&mut self, stream: &mut dyn InputStream) -> Result<Token, ReadError> {
        let mut bytes = Vec::new();
        while !ends_atom(self.c) {
            bytes.push(self.c as u8);
            self.bump(stream);
        }

        let numeric = match bytes.as_slice() {
            [c, ..] if c.is_ascii_digit() => true,
            [b'-', c, ..] if c.is_ascii_digit() => true,
            _ => false,
        };
        if numeric {
            parse_num(&bytes)
                .map(Token::Num)
                .ok_or_else(|| ReadError::invalid_number(String::from_utf8_lossy(&bytes).into_owned()).at(self.line))
        } else {
            Ok(Token::Sym(bytes))
        }
    }
}

/// Decimal, or `0x`/`0b`/`0o` prefixed, with an optional leading `-`.
fn parse_num(bytes: &[u8]) -> Option<i64> {
    let (neg, body) = match bytes {
        [b'-', body @ ..] => (true, body),
        body => (false, body),
    };
    let (radix, digits) = match body {
        [b'0', b'x', digits @ ..] => (16, digits),
        [b'0', b'b', digits @ ..] => (2, digits),
        [b'0', b'o', digits @ ..] => (8, digits),
        digits => (10, digits),
    };
    if digits.is_empty() || !digits.iter().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let digits = std::str::from_utf8(digits).ok()?;
    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if neg {
        // `i64::MIN` is the one magnitude that only fits negated.
        (magnitude <= i64::MIN.unsigned_abs()).then(|| (magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ReadErrorKind, object::stream::BufferStream};

    fn tokens(code: &str) -> Result<Vec<Token>, ReadError> {
        let mut stream = BufferStream::new(code);
        let mut lexer = Lexer::start();
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token(&mut stream)? {
                Token::Eof => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }

    #[test]
    fn punctuation_and_atoms() {
        assert_eq!(
            tokens("(f 'a `(b ,c ,@d))").unwrap(),
            vec![
                Token::LParen,
                Token::Sym(b"f".to_vec()),
                Token::Quote,
                Token::Sym(b"a".to_vec()),
                Token::QuasiQuote,
                Token::LParen,
                Token::Sym(b"b".to_vec()),
                Token::Unquote,
                Token::Sym(b"c".to_vec()),
                Token::UnquoteSplicing,
                Token::Sym(b"d".to_vec()),
                Token::RParen,
                Token::RParen,
            ],
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("42 -7 0xff 0b101 0o17 - -x").unwrap(),
            vec![
                Token::Num(42),
                Token::Num(-7),
                Token::Num(255),
                Token::Num(5),
                Token::Num(15),
                Token::Sym(b"-".to_vec()),
                Token::Sym(b"-x".to_vec()),
            ],
        );
        assert_eq!(tokens("-9223372036854775808").unwrap(), vec![Token::Num(i64::MIN)]);
        assert_eq!(tokens("9223372036854775807").unwrap(), vec![Token::Num(i64::MAX)]);
    }

    #[test]
    fn numbers_outside_i64() {
        for text in ["9223372036854775808", "-9223372036854775809", "0xffffffffffffffff", "99999999999999999999"] {
            let err = tokens(text).unwrap_err();
            assert_eq!(err.kind(), &ReadErrorKind::InvalidNumber(text.to_string()));
        }
    }

    #[test]
    fn bad_number() {
        let err = tokens("\n12ab").unwrap_err();
        assert_eq!(err.kind(), &ReadErrorKind::InvalidNumber("12ab".into()));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn strings_and_comments() {
        assert_eq!(
            tokens("; a comment\n\"hi there\" ;trailing").unwrap(),
            vec![Token::Str(b"hi there".to_vec())],
        );

        let err = tokens("\"open").unwrap_err();
        assert_eq!(err.kind(), &ReadErrorKind::Unclosed(Thing::String));
    }

    #[test]
    fn lines_and_lookahead() {
        let mut stream = BufferStream::new("a\n\nb c");
        let mut lexer = Lexer::start();
        assert_eq!(lexer.next_token(&mut stream).unwrap(), Token::Sym(b"a".to_vec()));
        assert_eq!(lexer.line(), 1);
        assert_eq!(lexer.current(), b'\n' as i32);
        assert_eq!(lexer.next_token(&mut stream).unwrap(), Token::Sym(b"b".to_vec()));
        assert_eq!(lexer.line(), 3);
        assert_eq!(lexer.current(), b' ' as i32);
    }
}
