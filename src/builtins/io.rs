use std::{
    cell::RefCell,
    io::Write,
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};
use crate::{
    error::{ErrorKind, ExecError},
    lex::Lexer,
    object::{
        stream::{FileSink, FileStream, StringStream, EOF},
        IStreamRef, OStreamRef, Obj, OutputStream, Value,
    },
    parse,
    walker::heap::HeapRef,
    Engine,
};

fn path_arg(engine: &mut Engine, env: HeapRef, val: Value) -> Result<String, ExecError> {
    let bytes = engine.bytes_arg(env, val)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn io_error(engine: &mut Engine, env: HeapRef, err: std::io::Error, val: Value) -> ExecError {
    engine.raise(env, ErrorKind::Io, err.to_string(), val)
}

/// `(file-stream path)`: a stream that reports itself closed if `path` could not be opened.
pub fn file_stream(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let path = path_arg(engine, env, args[0])?;
    let stream: IStreamRef = Rc::new(RefCell::new(FileStream::open(path)));
    Ok(engine.alloc(Obj::IStream(stream)))
}

/// `(string-stream str)`: an output stream starting with the contents of `str`.
pub fn string_stream(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let initial = engine.bytes_arg(env, args[0])?;
    let stream: OStreamRef = Rc::new(RefCell::new(StringStream::new(initial)));
    Ok(engine.alloc(Obj::OStream(stream)))
}

/// `(read stream last-char)` reads one form, yielding `(form next-char)`. The form is `nil`
/// once the stream is exhausted.
pub fn read(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let stream = engine.istream_arg(env, args[0])?;
    let last = engine.num_arg(env, args[1])?;

    let mut lexer = Lexer::with_char(last as i32);
    let res = parse::read(engine, &mut lexer, &mut *stream.borrow_mut());
    let form = match res {
        Ok(form) => form.unwrap_or_else(|| engine.nil()),
        Err(err) => return Err(engine.read_failure(env, err)),
    };
    Ok(engine.new_list(vec![form, Value::Num(lexer.current() as i64)]))
}

pub fn read_char(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let stream = engine.istream_arg(env, args[0])?;
    let c = stream.borrow_mut().read_char();
    Ok(if c == EOF { engine.nil() } else { Value::Num(c as i64) })
}

pub fn read_line(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let stream = engine.istream_arg(env, args[0])?;
    let (line, more) = stream.borrow_mut().read_line();
    Ok(if more { engine.new_str(line) } else { engine.nil() })
}

/// `(write stream str)`
pub fn write(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let stream = engine.ostream_arg(env, args[0])?;
    let bytes = engine.bytes_arg(env, args[1])?;
    let res = {
        let mut stream = stream.borrow_mut();
        bytes.iter().try_for_each(|c| stream.write_char(*c))
    };
    match res {
        Ok(()) => Ok(args[0]),
        Err(err) => Err(io_error(engine, env, err, args[0])),
    }
}

/// `(write-char stream code)`
pub fn write_char(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let stream = engine.ostream_arg(env, args[0])?;
    let c = engine.byte_arg(env, args[1])?;
    let res = stream.borrow_mut().write_char(c);
    match res {
        Ok(()) => Ok(args[0]),
        Err(err) => Err(io_error(engine, env, err, args[0])),
    }
}

/// `(write-line stream str)`
pub fn write_line(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let stream = engine.ostream_arg(env, args[0])?;
    let bytes = engine.bytes_arg(env, args[1])?;
    let res = stream.borrow_mut().write_line(&bytes);
    match res {
        Ok(()) => Ok(args[0]),
        Err(err) => Err(io_error(engine, env, err, args[0])),
    }
}

fn emit(engine: &mut Engine, args: &[Value], newline: bool) -> Value {
    let mut text = args
        .iter()
        .map(|arg| engine.display(*arg))
        .collect::<String>();
    if newline {
        text.push('\n');
    }
    if let Err(err) = engine.out.write_all(text.as_bytes()).and_then(|()| engine.out.flush()) {
        tracing::warn!("failed to write output: {}", err);
    }
    args.last().copied().unwrap_or_else(|| engine.nil())
}

/// `(prin form...)` writes the display form of each argument to the output sink.
pub fn prin(engine: &mut Engine, _env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    Ok(emit(engine, args, false))
}

/// Like `prin`, followed by a newline.
pub fn print(engine: &mut Engine, _env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    Ok(emit(engine, args, true))
}

/// Microseconds since the Unix epoch.
pub fn time(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 0, Some(0))?;
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since| since.as_micros() as i64);
    Ok(Value::Num(micros))
}

/// `(load path)` evaluates every form in the file in the calling environment.
pub fn load(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let path = path_arg(engine, env, args[0])?;
    engine.load_in(env, &path)
}

/// `(save form path)` writes the printed form of `form` to a fresh file.
pub fn save(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let path = path_arg(engine, env, args[1])?;
    let mut sink = FileSink::create(&path);
    if !sink.is_open() {
        return Err(engine.raise(env, ErrorKind::Io, "could not create", args[1]));
    }

    let text = engine.show(args[0]);
    match sink.write_line(text.as_bytes()).and_then(|()| sink.flush()) {
        Ok(()) => Ok(args[0]),
        Err(err) => Err(io_error(engine, env, err, args[1])),
    }
}
