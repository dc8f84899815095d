//! The tree-walking evaluator.

pub mod env;
pub mod forms;
pub mod heap;

use crate::{
    error::{ErrorKind, ExecError},
    object::{ClosureKind, ErrorObj, Func, List, Obj, Value},
    util::SrcLoc,
    Engine,
};
use self::{env::Env, heap::HeapRef};

impl Engine {
    /// Evaluate `form` in `env`.
    pub fn eval(&mut self, env: HeapRef, form: Value) -> Result<Value, ExecError> {
        match form {
            Value::Num(_) => Ok(form),
            Value::Sym(sym) => match env::get(&self.heap, env, sym) {
                Some(val) => Ok(val),
                None => Err(self.raise(env, ErrorKind::UnboundSymbol, "symbol not bound", form)),
            },
            Value::Ref(r) => {
                let items = match self.heap.get(r).as_list() {
                    Some(list) if !list.is_empty() => list.to_vec(),
                    _ => return Ok(form),
                };

                self.nested(env, form, |engine| engine.eval_form(env, form, &items))
            },
        }
    }

    /// Run `f` one level deeper, raising a `DepthError` once `max_depth` levels are open.
    ///
    /// Every walk that recurses on the shape of user data goes through here.
    pub(crate) fn nested<T>(
        &mut self,
        env: HeapRef,
        form: Value,
        f: impl FnOnce(&mut Self) -> Result<T, ExecError>,
    ) -> Result<T, ExecError> {
        if self.depth >= self.config.max_depth {
            return Err(self.raise(env, ErrorKind::Depth, "recursion limit exceeded", form));
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    fn eval_form(&mut self, env: HeapRef, form: Value, items: &[Value]) -> Result<Value, ExecError> {
        let head = items[0];
        let func = self.eval(env, head)?;

        match self.func_of(func) {
            Some(Func::Native { imp, special: true, .. }) => imp(self, env, &items[1..]),
            Some(Func::Native { imp, .. }) => {
                let args = self.eval_args(env, &items[1..])?;
                imp(self, env, &args)
            },
            Some(Func::Closure { kind: ClosureKind::Lambda, form: lambda, env: captured }) => {
                let args = self.eval_args(env, &items[1..])?;
                self.apply_closure(lambda, captured, &args)
            },
            Some(Func::Closure { kind: ClosureKind::Macro, form: lambda, env: captured }) => {
                let expansion = self.apply_closure(lambda, captured, &items[1..])?;
                self.eval(env, expansion)
            },
            None => Err(self.raise(env, ErrorKind::Type, "not a lambda", form)),
        }
    }

    fn eval_args(&mut self, env: HeapRef, forms: &[Value]) -> Result<Vec<Value>, ExecError> {
        forms
            .iter()
            .map(|form| self.eval(env, *form))
            .collect()
    }

    pub(crate) fn func_of(&self, val: Value) -> Option<Func> {
        match val {
            Value::Ref(r) => match self.heap.get(r) {
                Obj::Func(func) => Some(*func),
                _ => None,
            },
            _ => None,
        }
    }

    /// Call `func` with already evaluated `args`.
    ///
    /// Macros applied this way return their expansion without evaluating it.
    pub fn apply(&mut self, env: HeapRef, func: Value, args: &[Value]) -> Result<Value, ExecError> {
        match self.func_of(func) {
            Some(Func::Native { imp, .. }) => self.nested(env, func, |engine| imp(engine, env, args)),
            Some(Func::Closure { form, env: captured, .. }) => {
                self.nested(env, func, |engine| engine.apply_closure(form, captured, args))
            },
            None => Err(self.raise(env, ErrorKind::Type, "not a lambda", func)),
        }
    }

    fn apply_closure(&mut self, form: HeapRef, captured: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
        let items = self.list_items(Value::Ref(form)).unwrap_or_default();
        if items.len() < 2 {
            return Err(self.raise(captured, ErrorKind::Type, "malformed lambda", Value::Ref(form)));
        }

        tracing::trace!(args = args.len(), "applying closure");
        let call_env = self.heap.insert(Obj::Env(Env::new(Some(captured))));
        self.bind(call_env, items[1], args)?;
        self.progn(call_env, &items[2..])
    }

    /// Bind the parameter list `params` against `args` in `env`.
    ///
    /// `&optional` makes the following names optional (bound to `nil` when missing) and
    /// `&rest` binds the next name to a list of whatever arguments remain. A parameter that
    /// is itself a list destructures the matching argument.
    pub fn bind(&mut self, env: HeapRef, params: Value, args: &[Value]) -> Result<(), ExecError> {
        let names = match self.list_items(params) {
            Some(names) => names,
            None => return Err(self.raise(env, ErrorKind::Type, "not a list", params)),
        };
        let rest = Value::Sym(self.syms.rest);
        let optional_marker = Value::Sym(self.syms.optional);

        let mut pos = 0;
        let mut optional = false;
        let mut i = 0;
        while i < names.len() {
            let name = names[i];
            i += 1;

            if name == rest {
                let rest_name = match names.get(i) {
                    Some(name) => *name,
                    None => return Err(self.raise(env, ErrorKind::Type, "missing &rest name", params)),
                };
                let remaining = self.new_list(args[pos.min(args.len())..].to_vec());
                return self.bind_one(env, rest_name, remaining);
            } else if name == optional_marker {
                optional = true;
            } else if pos < args.len() {
                self.bind_one(env, name, args[pos])?;
                pos += 1;
            } else if optional {
                let nil = self.nil();
                self.bind_one(env, name, nil)?;
            } else {
                let got = self.new_list(args.to_vec());
                return Err(self.raise(env, ErrorKind::Arity, "wrong number of args", got));
            }
        }

        if pos < args.len() {
            let got = self.new_list(args.to_vec());
            return Err(self.raise(env, ErrorKind::Arity, "wrong number of args", got));
        }
        Ok(())
    }

    fn bind_one(&mut self, env: HeapRef, name: Value, val: Value) -> Result<(), ExecError> {
        match name {
            Value::Sym(sym) => {
                env::insert(&mut self.heap, env, sym, val);
                Ok(())
            },
            Value::Ref(r) if self.heap.get(r).as_list().is_some() => match self.list_items(val) {
                Some(items) => self.nested(env, name, |engine| engine.bind(env, name, &items)),
                None => Err(self.raise(env, ErrorKind::Type, "not a list", val)),
            },
            _ => Err(self.raise(env, ErrorKind::Type, "not a symbol", name)),
        }
    }

    /// Evaluate each form in turn, yielding the last result (`nil` when empty).
    pub fn progn(&mut self, env: HeapRef, forms: &[Value]) -> Result<Value, ExecError> {
        let mut last = self.nil();
        for form in forms {
            last = self.eval(env, *form)?;
        }
        Ok(last)
    }

    /// Copy `form`, replacing `(unquote x)` with the value of `x` and splicing the elements
    /// of `(unquote-splicing x)` into the enclosing list.
    ///
    /// Only one level is supported: a nested `quasi-quote` is copied like any other list,
    /// and unquotes inside it are still evaluated.
    pub fn qquote(&mut self, env: HeapRef, form: Value) -> Result<Value, ExecError> {
        let items = match self.list_items(form) {
            Some(items) => items,
            None => return Ok(form),
        };

        if let &[head, arg] = items.as_slice() {
            if head == Value::Sym(self.syms.unquote) {
                return self.eval(env, arg);
            }
        }

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match self.list_items(item).as_deref() {
                Some(&[head, arg]) if head == Value::Sym(self.syms.splicing) => {
                    let spliced = self.eval(env, arg)?;
                    match self.list_items(spliced) {
                        Some(values) => out.extend(values),
                        None => return Err(self.raise(env, ErrorKind::Type, "not a list", spliced)),
                    }
                },
                _ => out.push(self.nested(env, item, |engine| engine.qquote(env, item))?),
            }
        }
        Ok(self.new_list(out))
    }

    /// Build an error object located at the current `*stream-name*`/`*stream-line*`.
    ///
    /// Locations have top-level-form granularity: `*stream-line*` is updated once per form
    /// read, so an error anywhere inside a multi-line form reports the line it ends on.
    pub fn raise(&mut self, env: HeapRef, kind: ErrorKind, msg: impl Into<String>, obj: Value) -> ExecError {
        let msg = msg.into();
        let src = self.src_at(env);
        tracing::debug!(kind = %kind, src = %src, "{}", msg);
        let err = self.heap.insert(Obj::Error(ErrorObj { kind, msg, src, obj }));
        ExecError(err)
    }

    fn src_at(&self, env: HeapRef) -> SrcLoc {
        let name = match env::get(&self.heap, env, self.syms.stream_name) {
            Some(Value::Ref(r)) => match self.heap.get(r) {
                Obj::Str(s) => String::from_utf8_lossy(s).into_owned(),
                _ => return SrcLoc::unknown(),
            },
            _ => return SrcLoc::unknown(),
        };
        let line = match env::get(&self.heap, env, self.syms.stream_line) {
            Some(Value::Num(n)) => n,
            _ => 0,
        };
        SrcLoc::new(&name, line)
    }

    pub(crate) fn list_items(&self, val: Value) -> Option<Vec<Value>> {
        match val {
            Value::Ref(r) => self.heap.get(r).as_list().map(|list| list.to_vec()),
            _ => None,
        }
    }

    pub(crate) fn alloc(&mut self, obj: Obj) -> Value {
        Value::Ref(self.heap.insert(obj))
    }

    pub fn new_list(&mut self, items: Vec<Value>) -> Value {
        self.alloc(Obj::List(List(items)))
    }

    pub fn new_str(&mut self, bytes: impl Into<Vec<u8>>) -> Value {
        self.alloc(Obj::Str(crate::object::Str(bytes.into())))
    }

    pub fn nil(&self) -> Value {
        Value::Sym(self.syms.nil)
    }

    pub fn t(&self) -> Value {
        Value::Sym(self.syms.t)
    }

    pub fn bool(&self, b: bool) -> Value {
        if b { self.t() } else { self.nil() }
    }

    pub fn is_nil(&self, val: Value) -> bool {
        val == self.nil()
    }
}
