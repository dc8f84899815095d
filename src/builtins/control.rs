use crate::{
    error::{ErrorKind, ExecError},
    object::Value,
    walker::{env, heap::HeapRef},
    Engine,
};

pub fn progn(engine: &mut Engine, _env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    Ok(args.last().copied().unwrap_or_else(|| engine.nil()))
}

/// `(apply fn list)`
pub fn apply(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let items = engine.list_arg(env, args[1])?;
    engine.apply(env, args[0], &items)
}

/// `(eval form [env])`
pub fn eval(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(2))?;
    let target = match args.get(1) {
        Some(val) => engine.env_arg(env, *val)?,
        None => env,
    };
    engine.eval(target, args[0])
}

/// `(repl stream name)` evaluates every form the stream yields, reporting errors as it goes.
pub fn repl(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let stream = engine.istream_arg(env, args[0])?;
    let name = engine.bytes_arg(env, args[1])?;
    engine.repl(env, stream, &String::from_utf8_lossy(&name))
}

fn env_pairs(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<HeapRef, ExecError> {
    if args.len() < 3 || args.len() % 2 == 0 {
        let got = engine.new_list(args.to_vec());
        return Err(engine.raise(env, ErrorKind::Arity, "wrong number of args", got));
    }
    engine.env_arg(env, args[0])
}

/// `(def env sym val ...)` binds directly in `env`.
pub fn def(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    let target = env_pairs(engine, env, args)?;
    let mut last = engine.nil();
    for pair in args[1..].chunks(2) {
        let sym = engine.sym_arg(env, pair[0])?;
        last = pair[1];
        env::insert(&mut engine.heap, target, sym, last);
    }
    Ok(last)
}

/// `(set env sym val ...)` updates bindings visible from `env`.
pub fn set(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    let target = env_pairs(engine, env, args)?;
    let mut last = engine.nil();
    for pair in args[1..].chunks(2) {
        let sym = engine.sym_arg(env, pair[0])?;
        last = pair[1];
        if env::set(&mut engine.heap, target, sym, last).is_none() {
            return Err(engine.raise(env, ErrorKind::UnboundSymbol, "symbol not bound", pair[0]));
        }
    }
    Ok(last)
}

/// `(def? sym [env])`: the bound value, or `nil`.
pub fn is_defined(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(2))?;
    let sym = engine.sym_arg(env, args[0])?;
    let target = match args.get(1) {
        Some(val) => engine.env_arg(env, *val)?,
        None => env,
    };
    Ok(env::get(&engine.heap, target, sym).unwrap_or_else(|| engine.nil()))
}

pub fn sym(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let name = engine.bytes_arg(env, args[0])?;
    Ok(Value::Sym(engine.symbols.intern(name)))
}

/// A symbol whose name has not been interned before.
pub fn gensym(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 0, Some(0))?;
    loop {
        engine.gensyms += 1;
        let name = format!("G{}", engine.gensyms);
        if engine.symbols.find(name.as_bytes()).is_none() {
            return Ok(Value::Sym(engine.symbols.intern(name)));
        }
    }
}

/// `(bind params seq)` binds like a lambda call, in the current environment.
pub fn bind(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let items = engine.list_arg(env, args[1])?;
    engine.bind(env, args[0], &items)?;
    Ok(args[1])
}

/// `(throw message form)`
pub fn throw(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let msg = engine.bytes_arg(env, args[0])?;
    Err(engine.raise(env, ErrorKind::User, String::from_utf8_lossy(&msg), args[1]))
}
