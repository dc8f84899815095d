use crate::{
    error::{ReadError, ReadErrorKind, Thing},
    lex::{Lexer, Token},
    object::{InputStream, Value},
    Engine,
};

/// Read the next form from `stream`, or `None` once it is exhausted.
pub fn read(engine: &mut Engine, lexer: &mut Lexer, stream: &mut dyn InputStream) -> Result<Option<Value>, ReadError> {
    match lexer.next_token(stream)? {
        Token::Eof => Ok(None),
        token => read_form(engine, lexer, stream, token, 0).map(Some),
    }
}

// `depth` counts the lists and quotes already open around `token`.
fn read_form(
    engine: &mut Engine,
    lexer: &mut Lexer,
    stream: &mut dyn InputStream,
    token: Token,
    depth: usize,
) -> Result<Value, ReadError> {
    let opens = matches!(
        token,
        Token::LParen | Token::Quote | Token::QuasiQuote | Token::Unquote | Token::UnquoteSplicing
    );
    if opens && depth >= engine.config.max_depth {
        let line = lexer.line();
        skip_form(lexer, stream, token)?;
        return Err(ReadError::too_deep().at(line));
    }

    match token {
        Token::LParen => {
            let start = lexer.line();
            let mut items = Vec::new();
            loop {
                match lexer.next_token(stream).map_err(|e| e.while_reading(Thing::List))? {
                    Token::RParen => return Ok(engine.new_list(items)),
                    Token::Eof => return Err(ReadError::unclosed(Thing::List).at(start)),
                    token => match read_form(engine, lexer, stream, token, depth + 1) {
                        Ok(item) => items.push(item),
                        Err(err) if err.kind() == &ReadErrorKind::TooDeep => {
                            skip_list(lexer, stream)?;
                            return Err(err);
                        },
                        Err(err) => return Err(err),
                    },
                }
            }
        },
        Token::RParen => Err(ReadError::unexpected_char(')').at(lexer.line())),
        Token::Quote | Token::QuasiQuote | Token::Unquote | Token::UnquoteSplicing => {
            let head = match token {
                Token::Quote => engine.syms.quote,
                Token::QuasiQuote => engine.syms.qquote,
                Token::Unquote => engine.syms.unquote,
                _ => engine.syms.splicing,
            };
            let inner = match lexer.next_token(stream).map_err(|e| e.while_reading(Thing::Quote))? {
                Token::Eof => return Err(ReadError::unexpected_eof().while_reading(Thing::Quote).at(lexer.line())),
                token => read_form(engine, lexer, stream, token, depth + 1)?,
            };
            Ok(engine.new_list(vec![Value::Sym(head), inner]))
        },
        Token::Str(bytes) => Ok(engine.new_str(bytes)),
        Token::Num(n) => Ok(Value::Num(n)),
        Token::Sym(name) => Ok(Value::Sym(engine.symbols.intern(name))),
        Token::Eof => Err(ReadError::unexpected_eof().at(lexer.line())),
    }
}

// Consume the form `token` begins without building it.
fn skip_form(lexer: &mut Lexer, stream: &mut dyn InputStream, mut token: Token) -> Result<(), ReadError> {
    loop {
        match token {
            Token::LParen => return skip_list(lexer, stream),
            Token::Quote | Token::QuasiQuote | Token::Unquote | Token::UnquoteSplicing => {
                token = lexer.next_token(stream)?;
            },
            _ => return Ok(()),
        }
    }
}

// Consume up to the `)` closing a list whose `(` has already been read.
fn skip_list(lexer: &mut Lexer, stream: &mut dyn InputStream) -> Result<(), ReadError> {
    let mut open = 1usize;
    while open > 0 {
        match lexer.next_token(stream)? {
            Token::LParen => open += 1,
            Token::RParen => open -= 1,
            Token::Eof => break,
            _ => {},
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::stream::BufferStream;

    fn read_all(engine: &mut Engine, code: &str) -> Result<Vec<String>, ReadError> {
        let mut stream = BufferStream::new(code);
        let mut lexer = Lexer::start();
        let mut forms = Vec::new();
        while let Some(form) = read(engine, &mut lexer, &mut stream)? {
            forms.push(engine.show(form));
        }
        Ok(forms)
    }

    #[test]
    fn nested_forms() {
        let mut engine = Engine::default();
        assert_eq!(
            read_all(&mut engine, "(a (b \"c\") 1) 'x `(y ,z ,@w) ()").unwrap(),
            vec![
                "(a (b \"c\") 1)",
                "(quote x)",
                "(quasi-quote (y (unquote z) (unquote-splicing w)))",
                "()",
            ],
        );
    }

    #[test]
    fn symbols_are_interned() {
        let mut engine = Engine::default();
        let mut stream = BufferStream::new("foo foo");
        let mut lexer = Lexer::start();
        let a = read(&mut engine, &mut lexer, &mut stream).unwrap();
        let b = read(&mut engine, &mut lexer, &mut stream).unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn unbalanced() {
        let mut engine = Engine::default();

        let err = read_all(&mut engine, "(a\n(b c)").unwrap_err();
        assert_eq!(err.kind(), &ReadErrorKind::Unclosed(Thing::List));
        assert_eq!(err.line(), Some(1));

        let err = read_all(&mut engine, "a)").unwrap_err();
        assert_eq!(err.kind(), &ReadErrorKind::UnexpectedChar(')'));

        let err = read_all(&mut engine, "(x \"y)").unwrap_err();
        assert_eq!(err.to_string(), "unterminated string while reading list");

        let err = read_all(&mut engine, "'").unwrap_err();
        assert_eq!(err.kind(), &ReadErrorKind::UnexpectedEof);
    }

    #[test]
    fn nesting_is_bounded() {
        let mut engine = Engine::new(crate::Config {
            max_depth: 8,
            ..crate::Config::default()
        });
        assert!(read_all(&mut engine, "((((((((x))))))))").is_ok());

        let err = read_all(&mut engine, "(((((((((x)))))))))").unwrap_err();
        assert_eq!(err.kind(), &ReadErrorKind::TooDeep);
        let err = read_all(&mut engine, &format!("{}x", "'".repeat(9))).unwrap_err();
        assert_eq!(err.kind(), &ReadErrorKind::TooDeep);

        let deep = format!("{}{}", "(".repeat(100_000), ")".repeat(100_000));
        let err = read_all(&mut engine, &deep).unwrap_err();
        assert_eq!(err.to_string(), "nesting too deep");
    }

    #[test]
    fn too_deep_forms_are_skipped_whole() {
        let mut engine = Engine::new(crate::Config {
            max_depth: 2,
            ..crate::Config::default()
        });
        let mut stream = BufferStream::new("(a (b (c (d)) e) f) g");
        let mut lexer = Lexer::start();
        let err = read(&mut engine, &mut lexer, &mut stream).unwrap_err();
        assert_eq!(err.kind(), &ReadErrorKind::TooDeep);

        let next = read(&mut engine, &mut lexer, &mut stream).unwrap().unwrap();
        assert_eq!(engine.show(next), "g");
    }
}
