//! The read-eval-print driver behind `repl`, `load` and host evaluation.

use std::{cell::RefCell, io::Write, rc::Rc};
use crate::{
    error::{ErrorKind, ExecError, ReadError},
    lex::Lexer,
    object::{stream::FileStream, IStreamRef, InputStream, Value},
    parse,
    walker::{env, heap::HeapRef},
    Engine,
};

impl Engine {
    /// Evaluate every form read from `stream` in `env`, with `*stream-name*` bound to
    /// `name` and `*stream-line*` following the reader.
    ///
    /// When `report` is set, errors are printed to the output sink and evaluation carries
    /// on with the next form. Otherwise the first error is returned.
    pub(crate) fn run_stream(&mut self, env: HeapRef, stream: IStreamRef, name: &str, report: bool) -> Result<Value, ExecError> {
        let (name_sym, line_sym) = (self.syms.stream_name, self.syms.stream_line);
        let saved = match self.heap.get(env).as_env() {
            Some(scope) => [(name_sym, scope.local(name_sym)), (line_sym, scope.local(line_sym))],
            None => return Err(self.raise(env, ErrorKind::Type, "not an environment", Value::Ref(env))),
        };

        let name = self.new_str(name);
        env::insert(&mut self.heap, env, name_sym, name);
        env::insert(&mut self.heap, env, line_sym, Value::Num(1));

        let roots = saved.iter().filter_map(|(_, val)| *val).collect::<Vec<_>>();
        let res = self.read_eval(env, &stream, report, &roots);

        if let Some(scope) = self.heap.get_mut(env).as_env_mut() {
            for (sym, val) in saved {
                match val {
                    Some(val) => scope.insert(sym, val),
                    None => scope.remove(sym),
                };
            }
        }
        res
    }

    fn read_eval(&mut self, env: HeapRef, stream: &IStreamRef, report: bool, roots: &[Value]) -> Result<Value, ExecError> {
        let line_sym = self.syms.stream_line;
        let mut lexer = Lexer::start();
        let mut last = self.nil();

        loop {
            let read = parse::read(self, &mut lexer, &mut *stream.borrow_mut());
            let line = match &read {
                Err(err) => err.line().unwrap_or_else(|| lexer.line()),
                Ok(_) => lexer.line(),
            };
            env::insert(&mut self.heap, env, line_sym, Value::Num(line));

            let res = match read {
                Ok(Some(form)) => self.eval(env, form),
                Ok(None) => return Ok(last),
                Err(err) => Err(self.read_failure(env, err)),
            };
            match res {
                Ok(val) => {
                    last = val;
                    if self.config.echo {
                        self.emit_line(val);
                    }
                },
                Err(err) if report => {
                    last = err.object();
                    self.emit_line(last);
                },
                Err(err) => return Err(err),
            }

            if report && self.depth == 0 && self.heap.pending() > self.config.gc_threshold {
                let mut keep = vec![Value::Ref(env), last];
                keep.extend_from_slice(roots);
                self.collect(&keep);
            }
        }
    }

    fn emit_line(&mut self, val: Value) {
        let text = self.show(val);
        if let Err(err) = writeln!(self.out, "{}", text).and_then(|()| self.out.flush()) {
            tracing::warn!("failed to write output: {}", err);
        }
    }

    pub(crate) fn read_failure(&mut self, env: HeapRef, err: ReadError) -> ExecError {
        let nil = self.nil();
        self.raise(env, ErrorKind::Read, err.to_string(), nil)
    }

    /// Run `stream` as an interactive session: errors are reported and skipped.
    pub(crate) fn repl(&mut self, env: HeapRef, stream: IStreamRef, name: &str) -> Result<Value, ExecError> {
        if !stream.borrow().is_open() {
            let name = self.new_str(name);
            return Err(self.raise(env, ErrorKind::Io, "stream not open", name));
        }
        self.run_stream(env, stream, name, true)
    }

    pub(crate) fn load_in(&mut self, env: HeapRef, path: &str) -> Result<Value, ExecError> {
        let stream = FileStream::open(path);
        if !stream.is_open() {
            let path = self.new_str(path);
            return Err(self.raise(env, ErrorKind::Io, "could not open", path));
        }
        tracing::info!(path, "loading");
        self.repl(env, Rc::new(RefCell::new(stream)), path)
    }
}
