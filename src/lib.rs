//! A small Lisp evaluator: an interned symbol table, a heap of objects with mark and sweep
//! reclamation, chained lexical environments and a tree-walking `eval`/`apply` with macros,
//! quasi-quotation and `catch`.

pub mod builtins;
pub mod error;
mod lex;
pub mod object;
mod parse;
mod repl;
pub mod util;
pub mod walker;

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};
use self::{
    object::{
        stream::{BufferStream, StdinStream},
        ErrorObj, IStreamRef, Obj, Printed,
    },
    util::InternTable,
    walker::{env, env::Env, heap::Heap},
};
pub use self::{
    error::{Error, ErrorKind, ExecError},
    object::{Symbol, Value},
    walker::heap::HeapRef,
};

/// Symbols the evaluator recognises by identity, interned once at startup.
pub(crate) struct Syms {
    pub nil: Symbol,
    pub t: Symbol,
    pub underscore: Symbol,
    pub rest: Symbol,
    pub optional: Symbol,
    pub lambda: Symbol,
    pub macro_: Symbol,
    pub quote: Symbol,
    pub qquote: Symbol,
    pub unquote: Symbol,
    pub splicing: Symbol,
    pub stream_name: Symbol,
    pub stream_line: Symbol,
}

impl Syms {
    fn new(symbols: &mut InternTable<Vec<u8>>) -> Self {
        Self {
            nil: symbols.intern("nil"),
            t: symbols.intern("t"),
            underscore: symbols.intern("_"),
            rest: symbols.intern("&rest"),
            optional: symbols.intern("&optional"),
            lambda: symbols.intern("lambda"),
            macro_: symbols.intern("macro"),
            quote: symbols.intern("quote"),
            qquote: symbols.intern("quasi-quote"),
            unquote: symbols.intern("unquote"),
            splicing: symbols.intern("unquote-splicing"),
            stream_name: symbols.intern("*stream-name*"),
            stream_line: symbols.intern("*stream-line*"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Deepest nesting of evaluation, reading and printing.
    ///
    /// Evaluation past it raises a `DepthError`, reading fails and printing shows `...`.
    /// The default fits the 2 MiB stack of a spawned thread in a debug build; raise it
    /// only on a thread with a larger stack.
    pub max_depth: usize,
    /// Allocations between collections at the top-level `repl`.
    pub gc_threshold: usize,
    /// Print the result of every form `repl` evaluates.
    pub echo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 200,
            gc_threshold: 1 << 16,
            echo: false,
        }
    }
}

/// One interpreter: its heap, symbol table, root environment and output sink.
///
/// Values handed out by the engine stay valid until the next collection. Collections
/// only happen between the top-level forms of a `repl` or `load` started from the host,
/// or on an explicit [`Engine::collect`].
pub struct Engine {
    pub(crate) heap: Heap<Obj>,
    pub(crate) symbols: InternTable<Vec<u8>>,
    pub(crate) syms: Syms,
    pub(crate) root: HeapRef,
    pub(crate) config: Config,
    pub(crate) out: Box<dyn Write>,
    pub(crate) depth: usize,
    pub(crate) gensyms: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let mut symbols = InternTable::default();
        let syms = Syms::new(&mut symbols);
        let mut heap = Heap::new();
        let root = heap.insert(Obj::Env(Env::new(None)));

        let mut engine = Self {
            heap,
            symbols,
            syms,
            root,
            config,
            out: Box::new(io::stdout()),
            depth: 0,
            gensyms: 0,
        };
        builtins::install(&mut engine);
        engine
    }

    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn insert_global(&mut self, name: &str, value: Value) {
        let sym = self.intern(name);
        env::insert(&mut self.heap, self.root, sym, value);
    }

    pub fn with_global(mut self, name: &str, value: Value) -> Self {
        self.insert_global(name, value);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> HeapRef {
        self.root
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    pub fn symbol_name(&self, sym: Symbol) -> &[u8] {
        self.symbols.get(sym)
    }

    /// Look a global binding up by name.
    pub fn global(&self, name: &str) -> Option<Value> {
        let sym = self.symbols.find(name.as_bytes())?;
        env::get(&self.heap, self.root, sym)
    }

    /// Read and evaluate every form in `code` at the root, returning the last result.
    pub fn eval_str(&mut self, code: &str) -> Result<Value, ExecError> {
        self.eval_named(code, "<eval>")
    }

    pub fn eval_named(&mut self, code: &str, name: &str) -> Result<Value, ExecError> {
        let stream: IStreamRef = Rc::new(RefCell::new(BufferStream::new(code)));
        let root = self.root;
        self.run_stream(root, stream, name, false)
    }

    /// Like [`Engine::eval_str`], rendering any escaping error.
    pub fn run(&mut self, code: &str) -> Result<Value, Error> {
        self.eval_str(code).map_err(|err| self.host_error(err))
    }

    /// Load a file at the root. Errors inside the file are reported and skipped; only a
    /// file that cannot be opened fails.
    pub fn load(&mut self, path: &str) -> Result<Value, Error> {
        let root = self.root;
        self.load_in(root, path).map_err(|err| self.host_error(err))
    }

    /// Run an interactive session over standard input until it is exhausted.
    pub fn repl_stdin(&mut self) -> Value {
        let stream: IStreamRef = Rc::new(RefCell::new(StdinStream::new()));
        let root = self.root;
        match self.repl(root, stream, "stdin") {
            Ok(val) => val,
            Err(err) => err.object(),
        }
    }

    /// Reclaim everything unreachable from the root environment and `roots`.
    pub fn collect(&mut self, roots: &[Value]) -> usize {
        let extra = roots.iter().filter_map(|val| match val {
            Value::Ref(r) => Some(*r),
            _ => None,
        });
        let freed = self.heap.clean(std::iter::once(self.root).chain(extra));
        let stats = self.heap.stats();
        tracing::debug!(freed, live = stats.total_values, bins = stats.total_bins, "heap collected");
        freed
    }

    pub fn heap_stats(&self) -> walker::heap::Stats {
        self.heap.stats()
    }

    /// The canonical printed form of `value`.
    pub fn show(&self, value: Value) -> String {
        Printed::new(self, value, false).to_string()
    }

    /// The printed form with a top-level string left unquoted.
    pub fn display(&self, value: Value) -> String {
        Printed::new(self, value, true).to_string()
    }

    pub fn list(&self, value: Value) -> Option<&[Value]> {
        match value {
            Value::Ref(r) => self.heap.get(r).as_list().map(|list| &list[..]),
            _ => None,
        }
    }

    pub fn string(&self, value: Value) -> Option<&[u8]> {
        match value {
            Value::Ref(r) => match self.heap.get(r) {
                Obj::Str(s) => Some(&s[..]),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn error_info(&self, value: Value) -> Option<&ErrorObj> {
        match value {
            Value::Ref(r) => match self.heap.get(r) {
                Obj::Error(err) => Some(err),
                _ => None,
            },
            _ => None,
        }
    }

    pub(crate) fn host_error(&self, err: ExecError) -> Error {
        let kind = self
            .error_info(err.object())
            .map_or(ErrorKind::User, |info| info.kind);
        Error::new(kind, self.show(err.object()))
    }
}
