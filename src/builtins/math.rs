use crate::{
    error::{ErrorKind, ExecError},
    object::{Obj, Value},
    walker::heap::HeapRef,
    Engine,
};

fn nums(engine: &mut Engine, env: HeapRef, args: &[Value], min: usize) -> Result<Vec<i64>, ExecError> {
    engine.arity(env, args, min, None)?;
    args.iter()
        .map(|arg| engine.num_arg(env, *arg))
        .collect()
}

fn fold(engine: &mut Engine, env: HeapRef, args: &[Value], f: fn(i64, i64) -> i64) -> Result<Value, ExecError> {
    let nums = nums(engine, env, args, 1)?;
    Ok(Value::Num(nums[1..].iter().fold(nums[0], |acc, n| f(acc, *n))))
}

pub fn add(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    fold(engine, env, args, i64::wrapping_add)
}

pub fn sub(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    fold(engine, env, args, i64::wrapping_sub)
}

pub fn mul(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    fold(engine, env, args, i64::wrapping_mul)
}

pub fn max(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    fold(engine, env, args, i64::max)
}

pub fn min(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    fold(engine, env, args, i64::min)
}

fn divide(engine: &mut Engine, env: HeapRef, args: &[Value], f: fn(i64, i64) -> i64) -> Result<Value, ExecError> {
    let nums = nums(engine, env, args, 1)?;
    let mut acc = nums[0];
    for (i, n) in nums.iter().enumerate().skip(1) {
        if *n == 0 {
            return Err(engine.raise(env, ErrorKind::Arithmetic, "division by zero", args[i]));
        }
        acc = f(acc, *n);
    }
    Ok(Value::Num(acc))
}

pub fn div(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    divide(engine, env, args, i64::wrapping_div)
}

pub fn rem(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    divide(engine, env, args, i64::wrapping_rem)
}

fn chain(engine: &mut Engine, env: HeapRef, args: &[Value], f: fn(&i64, &i64) -> bool) -> Result<Value, ExecError> {
    let nums = nums(engine, env, args, 1)?;
    Ok(engine.bool(nums.windows(2).all(|pair| f(&pair[0], &pair[1]))))
}

pub fn eq(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    chain(engine, env, args, i64::eq)
}

/// True when no two arguments are equal.
pub fn ne(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    let nums = nums(engine, env, args, 1)?;
    let distinct = nums
        .iter()
        .enumerate()
        .all(|(i, a)| nums[i + 1..].iter().all(|b| a != b));
    Ok(engine.bool(distinct))
}

pub fn lt(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    chain(engine, env, args, i64::lt)
}

pub fn gt(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    chain(engine, env, args, i64::gt)
}

pub fn le(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    chain(engine, env, args, i64::le)
}

pub fn ge(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    chain(engine, env, args, i64::ge)
}

/// Same object, equal numbers, or strings with equal contents.
pub(crate) fn is_eql(engine: &Engine, a: Value, b: Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Ref(a), Value::Ref(b)) => match (engine.heap.get(a), engine.heap.get(b)) {
            (Obj::Str(a), Obj::Str(b)) => a == b,
            _ => false,
        },
        _ => false,
    }
}

pub fn eql(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    Ok(engine.bool(is_eql(engine, args[0], args[1])))
}

pub fn band(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    fold(engine, env, args, |a, b| a & b)
}

pub fn bor(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    fold(engine, env, args, |a, b| a | b)
}

pub fn bxor(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    fold(engine, env, args, |a, b| a ^ b)
}

fn shift(engine: &mut Engine, env: HeapRef, args: &[Value], f: fn(i64, u32) -> i64) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let val = engine.num_arg(env, args[0])?;
    let cnt = engine.num_arg(env, args[1])?;
    if !(0..64).contains(&cnt) {
        return Err(engine.raise(env, ErrorKind::Arithmetic, "shift out of range", args[1]));
    }
    Ok(Value::Num(f(val, cnt as u32)))
}

pub fn bshl(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    shift(engine, env, args, |v, n| v << n)
}

pub fn bshr(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    shift(engine, env, args, |v, n| ((v as u64) >> n) as i64)
}

pub fn basr(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    shift(engine, env, args, |v, n| v >> n)
}
