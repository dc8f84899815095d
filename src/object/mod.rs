pub mod seq;
pub mod stream;

use std::{cell::RefCell, fmt, rc::Rc};
use crate::{
    error::{ErrorKind, ExecError},
    util::{Interned, SrcLoc},
    walker::{
        env::Env,
        heap::{HeapRef, HeapValue},
    },
    Engine,
};
pub use self::{
    seq::{List, Seq, Str},
    stream::{InputStream, OutputStream},
};

pub type Symbol = Interned<Vec<u8>>;

pub type IStreamRef = Rc<RefCell<dyn InputStream>>;
pub type OStreamRef = Rc<RefCell<dyn OutputStream>>;

/// A reference to any runtime object.
///
/// Numbers and symbols are carried inline. Everything else lives in the engine's heap.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Value {
    Num(i64),
    Sym(Symbol),
    Ref(HeapRef),
}

/// The calling convention shared by primitives and special forms.
///
/// Primitives receive evaluated arguments; special forms receive the raw argument forms.
/// Both receive the environment of the call.
pub type NativeFn = fn(&mut Engine, HeapRef, &[Value]) -> Result<Value, ExecError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClosureKind {
    Lambda,
    Macro,
}

#[derive(Copy, Clone)]
pub enum Func {
    Native {
        name: Symbol,
        imp: NativeFn,
        special: bool,
    },
    Closure {
        kind: ClosureKind,
        // The whole `(lambda params body...)` form.
        form: HeapRef,
        env: HeapRef,
    },
}

#[derive(Clone, Debug)]
pub struct ErrorObj {
    pub kind: ErrorKind,
    pub msg: String,
    pub src: SrcLoc,
    pub obj: Value,
}

pub enum Obj {
    Str(Str),
    List(List),
    Env(Env),
    Func(Func),
    Error(ErrorObj),
    IStream(IStreamRef),
    OStream(OStreamRef),
}

impl Obj {
    pub fn type_name(&self) -> &'static str {
        match self {
            Obj::Str(_) => "string",
            Obj::List(_) => "list",
            Obj::Env(_) => "env",
            Obj::Func(_) => "function",
            Obj::Error(_) => "error",
            Obj::IStream(_) => "input stream",
            Obj::OStream(_) => "output stream",
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Obj::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Obj::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_env(&self) -> Option<&Env> {
        match self {
            Obj::Env(env) => Some(env),
            _ => None,
        }
    }

    pub fn as_env_mut(&mut self) -> Option<&mut Env> {
        match self {
            Obj::Env(env) => Some(env),
            _ => None,
        }
    }
}

impl HeapValue for Obj {
    type ChildIter = std::vec::IntoIter<HeapRef>;

    fn children(&self) -> Self::ChildIter {
        fn refs<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<HeapRef> {
            values
                .filter_map(|val| match val {
                    Value::Ref(r) => Some(*r),
                    _ => None,
                })
                .collect()
        }

        let children = match self {
            Obj::List(list) => refs(list.iter()),
            Obj::Env(env) => {
                let mut children = refs(env.values());
                children.extend(env.parent());
                children
            },
            Obj::Func(Func::Closure { form, env, .. }) => vec![*form, *env],
            Obj::Error(err) => refs(std::iter::once(&err.obj)),
            Obj::Str(_) | Obj::Func(Func::Native { .. }) | Obj::IStream(_) | Obj::OStream(_) => Vec::new(),
        };
        children.into_iter()
    }
}

/// The printed form of a value.
///
/// Canonical printing quotes strings. Display printing leaves a top-level string bare,
/// which is what `prin`, `print` and `str` produce.
pub struct Printed<'a> {
    engine: &'a Engine,
    value: Value,
    raw: bool,
}

impl<'a> Printed<'a> {
    pub(crate) fn new(engine: &'a Engine, value: Value, raw: bool) -> Self {
        Self { engine, value, raw }
    }
}

impl<'a> fmt::Display for Printed<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut path = Vec::new();
        write_value(self.engine, f, self.value, self.raw, &mut path)
    }
}

fn write_bytes(f: &mut fmt::Formatter, bytes: &[u8]) -> fmt::Result {
    write!(f, "{}", String::from_utf8_lossy(bytes))
}

// `path` holds the heap objects currently being printed so self-referential
// structures terminate. Anything nested deeper than `max_depth` prints as `...`.
fn write_value(
    engine: &Engine,
    f: &mut fmt::Formatter,
    value: Value,
    raw: bool,
    path: &mut Vec<HeapRef>,
) -> fmt::Result {
    let r = match value {
        Value::Num(n) => return write!(f, "{}", n),
        Value::Sym(sym) => return write_bytes(f, engine.symbols.get(sym)),
        Value::Ref(r) if path.contains(&r) || path.len() >= engine.config.max_depth => return write!(f, "..."),
        Value::Ref(r) => r,
    };

    path.push(r);
    let res = match engine.heap.get(r) {
        Obj::Str(s) if raw => write_bytes(f, s),
        Obj::Str(s) => {
            write!(f, "\"")?;
            write_bytes(f, s)?;
            write!(f, "\"")
        },
        Obj::List(list) => {
            write!(f, "(")?;
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write_value(engine, f, *item, false, path)?;
            }
            write!(f, ")")
        },
        Obj::Env(env) => {
            let mut bindings = env.bindings().collect::<Vec<_>>();
            bindings.sort_by(|(a, _), (b, _)| engine.symbols.get(*a).cmp(engine.symbols.get(*b)));
            write!(f, "{{")?;
            for (sym, val) in bindings {
                write!(f, "[")?;
                write_bytes(f, engine.symbols.get(sym))?;
                write!(f, " : ")?;
                write_value(engine, f, val, false, path)?;
                write!(f, "]")?;
            }
            write!(f, "}}")
        },
        Obj::Func(Func::Native { name, .. }) => {
            write!(f, "<function ")?;
            write_bytes(f, engine.symbols.get(*name))?;
            write!(f, ">")
        },
        Obj::Func(Func::Closure { form, .. }) => write_value(engine, f, Value::Ref(*form), false, path),
        Obj::Error(err) => {
            write!(f, "Error: {} ! < ", err.msg)?;
            write_value(engine, f, err.obj, false, path)?;
            write!(f, " > File: {}({})", err.src.name(), err.src.line())
        },
        Obj::IStream(stream) => write!(f, "<{} stream>", stream.borrow().describe()),
        Obj::OStream(stream) => write!(f, "<{} stream>", stream.borrow().describe()),
    };
    path.pop();
    res
}
