//! The primitive surface bound in every root environment.

mod control;
mod io;
mod math;
mod seq;

use crate::{
    error::{ErrorKind, ExecError},
    object::{Func, IStreamRef, NativeFn, OStreamRef, Obj, Symbol, Value},
    walker::{env, forms, heap::HeapRef},
    Engine,
};

const SPECIAL_FORMS: &[(&str, NativeFn)] = &[
    ("catch", forms::catch),
    ("lambda", forms::lambda),
    ("macro", forms::macro_),
    ("quote", forms::quote),
    ("quasi-quote", forms::quasi_quote),
    ("cond", forms::cond),
    ("while", forms::lwhile),
    ("defmacro", forms::defmacro),
    ("env", forms::lenv),
    ("defq", forms::defq),
    ("setq", forms::setq),
];

const PRIMITIVES: &[(&str, NativeFn)] = &[
    ("add", math::add),
    ("sub", math::sub),
    ("mul", math::mul),
    ("div", math::div),
    ("mod", math::rem),
    ("max", math::max),
    ("min", math::min),
    ("eq", math::eq),
    ("ne", math::ne),
    ("lt", math::lt),
    ("gt", math::gt),
    ("le", math::le),
    ("ge", math::ge),
    ("eql", math::eql),
    ("bit-and", math::band),
    ("bit-or", math::bor),
    ("bit-xor", math::bxor),
    ("bit-shl", math::bshl),
    ("bit-shr", math::bshr),
    ("bit-asr", math::basr),
    ("list", seq::list),
    ("push", seq::push),
    ("pop", seq::pop),
    ("length", seq::length),
    ("elem", seq::elem),
    ("elem-set", seq::elem_set),
    ("slice", seq::slice),
    ("cat", seq::cat),
    ("clear", seq::clear),
    ("copy", seq::copy),
    ("find", seq::find),
    ("merge-sym", seq::merge_sym),
    ("split", seq::split),
    ("match?", seq::is_match),
    ("some!", seq::some),
    ("each!", seq::each),
    ("partition", seq::partition),
    ("cmp", seq::cmp),
    ("code", seq::code),
    ("char", seq::lchar),
    ("str", seq::str),
    ("file-stream", io::file_stream),
    ("string-stream", io::string_stream),
    ("read", io::read),
    ("read-char", io::read_char),
    ("read-line", io::read_line),
    ("write", io::write),
    ("write-char", io::write_char),
    ("write-line", io::write_line),
    ("prin", io::prin),
    ("print", io::print),
    ("time", io::time),
    ("load", io::load),
    ("save", io::save),
    ("progn", control::progn),
    ("apply", control::apply),
    ("eval", control::eval),
    ("repl", control::repl),
    ("def", control::def),
    ("set", control::set),
    ("def?", control::is_defined),
    ("sym", control::sym),
    ("gensym", control::gensym),
    ("bind", control::bind),
    ("throw", control::throw),
];

/// Bind `nil`, `t`, the stream location symbols and every primitive in the root.
pub fn install(engine: &mut Engine) {
    let root = engine.root;
    let (nil, t) = (engine.syms.nil, engine.syms.t);
    env::insert(&mut engine.heap, root, nil, Value::Sym(nil));
    env::insert(&mut engine.heap, root, t, Value::Sym(t));

    let name = engine.new_str("<toplevel>");
    let (stream_name, stream_line) = (engine.syms.stream_name, engine.syms.stream_line);
    env::insert(&mut engine.heap, root, stream_name, name);
    env::insert(&mut engine.heap, root, stream_line, Value::Num(0));

    let natives = SPECIAL_FORMS
        .iter()
        .map(|(name, imp)| (*name, *imp, true))
        .chain(PRIMITIVES.iter().map(|(name, imp)| (*name, *imp, false)));
    for (name, imp, special) in natives {
        let name = engine.intern(name);
        let func = engine.alloc(Obj::Func(Func::Native { name, imp, special }));
        env::insert(&mut engine.heap, root, name, func);
    }
}

// Argument checking shared by primitives and special forms.
impl Engine {
    pub(crate) fn arity(&mut self, env: HeapRef, args: &[Value], min: usize, max: Option<usize>) -> Result<(), ExecError> {
        if args.len() < min || max.map_or(false, |max| args.len() > max) {
            let got = self.new_list(args.to_vec());
            Err(self.raise(env, ErrorKind::Arity, "wrong number of args", got))
        } else {
            Ok(())
        }
    }

    fn type_error(&mut self, env: HeapRef, msg: &str, val: Value) -> ExecError {
        self.raise(env, ErrorKind::Type, msg, val)
    }

    pub(crate) fn num_arg(&mut self, env: HeapRef, val: Value) -> Result<i64, ExecError> {
        match val {
            Value::Num(n) => Ok(n),
            _ => Err(self.type_error(env, "not a number", val)),
        }
    }

    /// A character code in `0..=255`.
    pub(crate) fn byte_arg(&mut self, env: HeapRef, val: Value) -> Result<u8, ExecError> {
        let n = self.num_arg(env, val)?;
        u8::try_from(n).map_err(|_| self.type_error(env, "not a character code", val))
    }

    pub(crate) fn sym_arg(&mut self, env: HeapRef, val: Value) -> Result<Symbol, ExecError> {
        match val {
            Value::Sym(sym) => Ok(sym),
            _ => Err(self.type_error(env, "not a symbol", val)),
        }
    }

    /// The items of a list argument.
    pub(crate) fn list_arg(&mut self, env: HeapRef, val: Value) -> Result<Vec<Value>, ExecError> {
        match self.list_items(val) {
            Some(items) => Ok(items),
            None => Err(self.type_error(env, "not a list", val)),
        }
    }

    /// A list argument by reference, for primitives that mutate it in place.
    pub(crate) fn list_ref_arg(&mut self, env: HeapRef, val: Value) -> Result<HeapRef, ExecError> {
        match val {
            Value::Ref(r) if self.heap.get(r).as_list().is_some() => Ok(r),
            _ => Err(self.type_error(env, "not a list", val)),
        }
    }

    /// The bytes of a string or symbol argument.
    pub(crate) fn bytes_arg(&mut self, env: HeapRef, val: Value) -> Result<Vec<u8>, ExecError> {
        let bytes = match val {
            Value::Sym(sym) => Some(self.symbols.get(sym).clone()),
            Value::Ref(r) => match self.heap.get(r) {
                Obj::Str(s) => Some(s.0.clone()),
                _ => None,
            },
            Value::Num(_) => None,
        };
        match bytes {
            Some(bytes) => Ok(bytes),
            None => Err(self.type_error(env, "not a string", val)),
        }
    }

    pub(crate) fn env_arg(&mut self, env: HeapRef, val: Value) -> Result<HeapRef, ExecError> {
        match val {
            Value::Ref(r) if self.heap.get(r).as_env().is_some() => Ok(r),
            _ => Err(self.type_error(env, "not an environment", val)),
        }
    }

    pub(crate) fn istream_arg(&mut self, env: HeapRef, val: Value) -> Result<IStreamRef, ExecError> {
        let stream = match val {
            Value::Ref(r) => match self.heap.get(r) {
                Obj::IStream(stream) => Some(stream.clone()),
                _ => None,
            },
            _ => None,
        };
        match stream {
            Some(stream) if stream.borrow().is_open() => Ok(stream),
            Some(_) => Err(self.raise(env, ErrorKind::Io, "stream not open", val)),
            None => Err(self.type_error(env, "not an input stream", val)),
        }
    }

    pub(crate) fn ostream_arg(&mut self, env: HeapRef, val: Value) -> Result<OStreamRef, ExecError> {
        let stream = match val {
            Value::Ref(r) => match self.heap.get(r) {
                Obj::OStream(stream) => Some(stream.clone()),
                _ => None,
            },
            _ => None,
        };
        match stream {
            Some(stream) if stream.borrow().is_open() => Ok(stream),
            Some(_) => Err(self.raise(env, ErrorKind::Io, "stream not open", val)),
            None => Err(self.type_error(env, "not an output stream", val)),
        }
    }
}
