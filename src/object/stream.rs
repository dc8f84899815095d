use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Stdin, Write},
    path::Path,
};

/// Returned by [`InputStream::read_char`] once the stream is exhausted.
pub const EOF: i32 = -1;

pub trait InputStream {
    fn is_open(&self) -> bool;

    /// The next byte, or [`EOF`].
    fn read_char(&mut self) -> i32;

    /// The next line without its terminator, and whether a line was actually read.
    fn read_line(&mut self) -> (Vec<u8>, bool);

    fn describe(&self) -> &'static str;
}

pub trait OutputStream {
    fn is_open(&self) -> bool;

    fn write_char(&mut self, c: u8) -> io::Result<()>;

    /// Write `s` followed by a newline.
    fn write_line(&mut self, s: &[u8]) -> io::Result<()>;

    /// Everything written so far, for streams that keep it.
    fn contents(&self) -> Option<&[u8]> {
        None
    }

    fn describe(&self) -> &'static str;
}

fn next_byte(reader: &mut impl BufRead) -> i32 {
    let c = match reader.fill_buf() {
        Ok(buf) if !buf.is_empty() => buf[0],
        _ => return EOF,
    };
    reader.consume(1);
    c as i32
}

fn next_line(reader: &mut impl BufRead) -> (Vec<u8>, bool) {
    let mut line = Vec::new();
    match reader.read_until(b'\n', &mut line) {
        Ok(0) | Err(_) => (line, false),
        Ok(_) => {
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            (line, true)
        },
    }
}

pub struct StdinStream {
    stdin: Stdin,
}

impl StdinStream {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdinStream {
    fn default() -> Self {
        Self::new()
    }
}

impl InputStream for StdinStream {
    fn is_open(&self) -> bool {
        true
    }

    fn read_char(&mut self) -> i32 {
        next_byte(&mut self.stdin.lock())
    }

    fn read_line(&mut self) -> (Vec<u8>, bool) {
        next_line(&mut self.stdin.lock())
    }

    fn describe(&self) -> &'static str {
        "stdin"
    }
}

/// A file opened for reading. Failing to open is reported through `is_open`.
pub struct FileStream {
    reader: Option<BufReader<File>>,
}

impl FileStream {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(err) => {
                tracing::warn!("could not open '{}': {}", path.display(), err);
                None
            },
        };
        Self { reader }
    }
}

impl InputStream for FileStream {
    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn read_char(&mut self) -> i32 {
        match &mut self.reader {
            Some(reader) => next_byte(reader),
            None => EOF,
        }
    }

    fn read_line(&mut self) -> (Vec<u8>, bool) {
        match &mut self.reader {
            Some(reader) => next_line(reader),
            None => (Vec::new(), false),
        }
    }

    fn describe(&self) -> &'static str {
        "file"
    }
}

/// Reads from an in-memory buffer.
pub struct BufferStream {
    data: Vec<u8>,
    pos: usize,
}

impl BufferStream {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }
}

impl InputStream for BufferStream {
    fn is_open(&self) -> bool {
        true
    }

    fn read_char(&mut self) -> i32 {
        match self.data.get(self.pos) {
            Some(c) => {
                self.pos += 1;
                *c as i32
            },
            None => EOF,
        }
    }

    fn read_line(&mut self) -> (Vec<u8>, bool) {
        if self.pos >= self.data.len() {
            return (Vec::new(), false);
        }
        let rest = &self.data[self.pos..];
        let (line, used) = match rest.iter().position(|c| *c == b'\n') {
            Some(end) => (rest[..end].to_vec(), end + 1),
            None => (rest.to_vec(), rest.len()),
        };
        self.pos += used;
        (line, true)
    }

    fn describe(&self) -> &'static str {
        "buffer"
    }
}

/// Accumulates output in memory.
#[derive(Default)]
pub struct StringStream {
    buf: Vec<u8>,
}

impl StringStream {
    pub fn new(initial: impl Into<Vec<u8>>) -> Self {
        Self { buf: initial.into() }
    }
}

impl OutputStream for StringStream {
    fn is_open(&self) -> bool {
        true
    }

    fn write_char(&mut self, c: u8) -> io::Result<()> {
        self.buf.push(c);
        Ok(())
    }

    fn write_line(&mut self, s: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(s);
        self.buf.push(b'\n');
        Ok(())
    }

    fn contents(&self) -> Option<&[u8]> {
        Some(&self.buf)
    }

    fn describe(&self) -> &'static str {
        "string"
    }
}

/// A file opened (and truncated) for writing.
pub struct FileSink {
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn create(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let writer = match File::create(path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(err) => {
                tracing::warn!("could not create '{}': {}", path.display(), err);
                None
            },
        };
        Self { writer }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match &mut self.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "stream not open"))
    }
}

impl OutputStream for FileSink {
    fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn write_char(&mut self, c: u8) -> io::Result<()> {
        self.writer()?.write_all(&[c])
    }

    fn write_line(&mut self, s: &[u8]) -> io::Result<()> {
        let writer = self.writer()?;
        writer.write_all(s)?;
        writer.write_all(b"\n")
    }

    fn describe(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_lines_and_chars() {
        let mut stream = BufferStream::new("ab\ncd");
        assert_eq!(stream.read_char(), b'a' as i32);
        assert_eq!(stream.read_line(), (b"b".to_vec(), true));
        assert_eq!(stream.read_line(), (b"cd".to_vec(), true));
        assert_eq!(stream.read_line(), (Vec::new(), false));
        assert_eq!(stream.read_char(), EOF);
    }

    #[test]
    fn missing_file_reports_closed() {
        let mut stream = FileStream::open("/definitely/not/here.lisp");
        assert!(!stream.is_open());
        assert_eq!(stream.read_char(), EOF);
        assert_eq!(stream.read_line().1, false);
    }

    #[test]
    fn string_stream_keeps_output() {
        let mut stream = StringStream::new("> ");
        stream.write_char(b'x').unwrap();
        stream.write_line(b"yz").unwrap();
        assert_eq!(stream.contents(), Some(&b"> xyz\n"[..]));
    }
}
