//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::{cell::RefCell, io, path::PathBuf, process, rc::Rc};
pub use chrysalis::{Config, Engine, ErrorKind, Value};

/// An output sink the test keeps a handle to.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A default engine whose output is captured.
pub fn capturing() -> (Engine, SharedBuf) {
    let buf = SharedBuf::default();
    (Engine::default().with_output(buf.clone()), buf)
}

/// Evaluate `code`, returning the printed form of the last result.
pub fn eval_show(engine: &mut Engine, code: &str) -> String {
    match engine.eval_str(code) {
        Ok(val) => engine.show(val),
        Err(err) => panic!("evaluating {:?} failed: {}", code, engine.show(err.object())),
    }
}

/// [`eval_show`] in a fresh engine.
pub fn show(code: &str) -> String {
    eval_show(&mut Engine::default(), code)
}

/// The kind of the error `code` raises or evaluates to.
pub fn error_kind(engine: &mut Engine, code: &str) -> ErrorKind {
    let val = match engine.eval_str(code) {
        Ok(val) => val,
        Err(err) => err.object(),
    };
    match engine.error_info(val) {
        Some(info) => info.kind,
        None => panic!("{:?} produced {} rather than an error", code, engine.show(val)),
    }
}

/// A path in the temp directory unique to this test process.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("chrysalis-{}-{}", process::id(), name))
}

/// Write `contents` to a fresh temp file and return its path as a string.
pub fn temp_file(name: &str, contents: &str) -> String {
    let path = temp_path(name);
    std::fs::write(&path, contents).expect("could not write temp file");
    path.to_string_lossy().into_owned()
}
