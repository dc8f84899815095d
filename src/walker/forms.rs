//! Special forms: callables that receive their argument forms unevaluated.

use crate::{
    error::{ErrorKind, ExecError},
    object::{ClosureKind, Func, Obj, Value},
    Engine,
};
use super::{
    env::{self, Env},
    heap::HeapRef,
};

pub fn quote(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    Ok(args[0])
}

pub fn quasi_quote(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    engine.qquote(env, args[0])
}

fn closure(engine: &mut Engine, env: HeapRef, kind: ClosureKind, params: Value, body: &[Value]) -> Result<Value, ExecError> {
    if engine.list_items(params).is_none() {
        return Err(engine.raise(env, ErrorKind::Type, "not a list", params));
    }

    let head = match kind {
        ClosureKind::Lambda => Value::Sym(engine.syms.lambda),
        ClosureKind::Macro => Value::Sym(engine.syms.macro_),
    };
    let mut form = Vec::with_capacity(body.len() + 2);
    form.push(head);
    form.push(params);
    form.extend_from_slice(body);
    let form = engine.heap.insert(Obj::List(crate::object::List(form)));

    Ok(engine.alloc(Obj::Func(Func::Closure { kind, form, env })))
}

pub fn lambda(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, None)?;
    closure(engine, env, ClosureKind::Lambda, args[0], &args[1..])
}

pub fn macro_(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, None)?;
    closure(engine, env, ClosureKind::Macro, args[0], &args[1..])
}

/// `(defmacro name params body...)`
pub fn defmacro(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, None)?;
    let name = engine.sym_arg(env, args[0])?;
    let mac = closure(engine, env, ClosureKind::Macro, args[1], &args[2..])?;
    env::insert(&mut engine.heap, env, name, mac);
    Ok(mac)
}

/// `(cond (test body...) ...)`: the first clause whose test is not `nil` wins.
pub fn cond(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    for clause in args {
        let items = match engine.list_items(*clause) {
            Some(items) if !items.is_empty() => items,
            _ => return Err(engine.raise(env, ErrorKind::Type, "not a cond clause", *clause)),
        };
        let test = engine.eval(env, items[0])?;
        if !engine.is_nil(test) {
            return if items.len() == 1 {
                Ok(test)
            } else {
                engine.progn(env, &items[1..])
            };
        }
    }
    Ok(engine.nil())
}

/// `(while test body...)`
pub fn lwhile(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, None)?;
    let mut last = engine.nil();
    loop {
        let test = engine.eval(env, args[0])?;
        if engine.is_nil(test) {
            return Ok(last);
        }
        last = engine.progn(env, &args[1..])?;
    }
}

/// `(catch body...)`: an error raised anywhere beneath becomes the result.
pub fn catch(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    match engine.progn(env, args) {
        Ok(val) => Ok(val),
        Err(err) => Ok(err.object()),
    }
}

/// `(env)` is the current environment; `(env parent)` makes a fresh one below `parent`.
pub fn lenv(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 0, Some(1))?;
    match args.first() {
        None => Ok(Value::Ref(env)),
        Some(form) => {
            let parent = engine.eval(env, *form)?;
            let parent = if engine.is_nil(parent) {
                None
            } else {
                Some(engine.env_arg(env, parent)?)
            };
            Ok(engine.alloc(Obj::Env(Env::new(parent))))
        },
    }
}

fn pairs(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<(), ExecError> {
    if args.is_empty() || args.len() % 2 != 0 {
        let got = engine.new_list(args.to_vec());
        return Err(engine.raise(env, ErrorKind::Arity, "wrong number of args", got));
    }
    Ok(())
}

/// `(defq sym val ...)` binds in the current environment.
pub fn defq(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    pairs(engine, env, args)?;
    let mut last = engine.nil();
    for pair in args.chunks(2) {
        let sym = engine.sym_arg(env, pair[0])?;
        last = engine.eval(env, pair[1])?;
        env::insert(&mut engine.heap, env, sym, last);
    }
    Ok(last)
}

/// `(setq sym val ...)` updates existing bindings wherever they live.
pub fn setq(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    pairs(engine, env, args)?;
    let mut last = engine.nil();
    for pair in args.chunks(2) {
        let sym = engine.sym_arg(env, pair[0])?;
        last = engine.eval(env, pair[1])?;
        if env::set(&mut engine.heap, env, sym, last).is_none() {
            return Err(engine.raise(env, ErrorKind::UnboundSymbol, "symbol not bound", pair[0]));
        }
    }
    Ok(last)
}
