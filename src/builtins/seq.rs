use std::collections::HashMap;
use crate::{
    error::{ErrorKind, ExecError},
    object::{seq::OutOfRange, List, Obj, Seq, Symbol, Value},
    walker::{env, heap::HeapRef},
    Engine,
};
use super::math::is_eql;

/// A sequence argument: a list, a string or the name of a symbol.
#[derive(Copy, Clone)]
enum SeqRef {
    List(HeapRef),
    Str(HeapRef),
    Sym(Symbol),
}

impl SeqRef {
    fn of(engine: &Engine, val: Value) -> Option<Self> {
        match val {
            Value::Sym(sym) => Some(SeqRef::Sym(sym)),
            Value::Ref(r) => match engine.heap.get(r) {
                Obj::List(_) => Some(SeqRef::List(r)),
                Obj::Str(_) => Some(SeqRef::Str(r)),
                _ => None,
            },
            Value::Num(_) => None,
        }
    }

    fn items(self, engine: &Engine) -> &[Value] {
        match self {
            SeqRef::List(r) => items_of(engine, r),
            _ => &[],
        }
    }

    fn bytes(self, engine: &Engine) -> &[u8] {
        match self {
            SeqRef::Str(r) => match engine.heap.get(r) {
                Obj::Str(s) => &s[..],
                _ => &[],
            },
            SeqRef::Sym(sym) => &engine.symbols.get(sym)[..],
            SeqRef::List(_) => &[],
        }
    }

    fn length(self, engine: &Engine) -> usize {
        match self {
            SeqRef::List(_) => self.items(engine).length(),
            _ => self.bytes(engine).length(),
        }
    }

    /// List elements come back as they are, string bytes as one character strings.
    fn elem(self, engine: &mut Engine, i: usize) -> Result<Value, OutOfRange> {
        match self {
            SeqRef::List(_) => self.items(engine).elem(i),
            _ => {
                let c = self.bytes(engine).elem(i)?;
                Ok(engine.new_str(vec![c]))
            },
        }
    }

    fn slice(self, engine: &mut Engine, s: usize, e: usize) -> Result<Value, OutOfRange> {
        match self {
            SeqRef::List(_) => {
                let list = self.items(engine).slice(s, e)?;
                Ok(engine.alloc(Obj::List(list)))
            },
            _ => {
                let s = self.bytes(engine).slice(s, e)?;
                Ok(engine.alloc(Obj::Str(s)))
            },
        }
    }
}

fn items_of(engine: &Engine, r: HeapRef) -> &[Value] {
    engine.heap.get(r).as_list().map_or(&[][..], |list| &list[..])
}

fn seq_arg(engine: &mut Engine, env: HeapRef, val: Value) -> Result<SeqRef, ExecError> {
    match SeqRef::of(engine, val) {
        Some(seq) => Ok(seq),
        None => Err(engine.raise(env, ErrorKind::Type, "not a sequence", val)),
    }
}

fn index_error(engine: &mut Engine, env: HeapRef, val: Value) -> ExecError {
    engine.raise(env, ErrorKind::Index, "index out of bounds", val)
}

// Negative iteration bounds count back from one past the end, so `-1` names the length.
fn resolve(len: usize, n: i64) -> i64 {
    if n < 0 {
        len as i64 + n + 1
    } else {
        n
    }
}

fn within(engine: &mut Engine, env: HeapRef, val: Value, n: i64, end: usize) -> Result<usize, ExecError> {
    if (0..=end as i64).contains(&n) {
        Ok(n as usize)
    } else {
        Err(index_error(engine, env, val))
    }
}

/// An element index in `[0, len)`.
fn elem_index(engine: &mut Engine, env: HeapRef, val: Value, len: usize) -> Result<usize, ExecError> {
    let n = engine.num_arg(env, val)?;
    match len.checked_sub(1) {
        Some(last) => within(engine, env, val, n, last),
        None => Err(index_error(engine, env, val)),
    }
}

/// A slice bound in `[0, len]`.
fn bound(engine: &mut Engine, env: HeapRef, val: Value, len: usize) -> Result<usize, ExecError> {
    let n = engine.num_arg(env, val)?;
    within(engine, env, val, n, len)
}

/// A bound for `each!`, `some!` and `partition`, which also accept negative bounds.
fn sweep_bound(engine: &mut Engine, env: HeapRef, val: Value, len: usize) -> Result<usize, ExecError> {
    let n = resolve(len, engine.num_arg(env, val)?);
    within(engine, env, val, n, len)
}

pub fn list(engine: &mut Engine, _env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    Ok(engine.new_list(args.to_vec()))
}

/// `(push list form...)`
pub fn push(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, None)?;
    let r = engine.list_ref_arg(env, args[0])?;
    if let Some(list) = engine.heap.get_mut(r).as_list_mut() {
        list.0.extend_from_slice(&args[1..]);
    }
    Ok(args[0])
}

pub fn pop(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let r = engine.list_ref_arg(env, args[0])?;
    let last = engine.heap.get_mut(r).as_list_mut().and_then(|list| list.0.pop());
    Ok(last.unwrap_or_else(|| engine.nil()))
}

pub fn length(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let seq = seq_arg(engine, env, args[0])?;
    Ok(Value::Num(seq.length(engine) as i64))
}

/// `(elem index seq)`
pub fn elem(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let seq = seq_arg(engine, env, args[1])?;
    let len = seq.length(engine);
    let i = elem_index(engine, env, args[0], len)?;
    match seq.elem(engine, i) {
        Ok(val) => Ok(val),
        Err(OutOfRange) => Err(index_error(engine, env, args[0])),
    }
}

/// `(elem-set index list value)`
pub fn elem_set(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 3, Some(3))?;
    let r = engine.list_ref_arg(env, args[1])?;
    let len = items_of(engine, r).len();
    let i = elem_index(engine, env, args[0], len)?;
    if let Some(list) = engine.heap.get_mut(r).as_list_mut() {
        list[i] = args[2];
    }
    Ok(args[2])
}

/// `(slice start end seq)`
pub fn slice(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 3, Some(3))?;
    let seq = seq_arg(engine, env, args[2])?;
    let len = seq.length(engine);
    let s = bound(engine, env, args[0], len)?;
    let e = bound(engine, env, args[1], len)?;
    match seq.slice(engine, s, e) {
        Ok(val) => Ok(val),
        Err(OutOfRange) => {
            let got = engine.new_list(args[..2].to_vec());
            Err(index_error(engine, env, got))
        },
    }
}

/// Lists join into a list, strings and symbols into a string. Mixing the two is a type
/// error.
pub fn cat(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, None)?;
    let seqs = args
        .iter()
        .map(|arg| seq_arg(engine, env, *arg))
        .collect::<Result<Vec<_>, _>>()?;

    let lists = seqs.iter().filter(|seq| matches!(seq, SeqRef::List(_))).count();
    if lists == seqs.len() {
        let joined = {
            let parts = seqs.iter().map(|seq| seq.items(engine)).collect::<Vec<_>>();
            <[Value]>::cat(&parts)
        };
        Ok(engine.alloc(Obj::List(joined)))
    } else if lists == 0 {
        let joined = {
            let parts = seqs.iter().map(|seq| seq.bytes(engine)).collect::<Vec<_>>();
            <[u8]>::cat(&parts)
        };
        Ok(engine.alloc(Obj::Str(joined)))
    } else {
        let got = engine.new_list(args.to_vec());
        Err(engine.raise(env, ErrorKind::Type, "cannot cat lists with strings", got))
    }
}

/// `(clear list...)` empties each list, returning the last.
pub fn clear(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, None)?;
    for arg in args {
        let r = engine.list_ref_arg(env, *arg)?;
        if let Some(list) = engine.heap.get_mut(r).as_list_mut() {
            list.0.clear();
        }
    }
    Ok(args[args.len() - 1])
}

// Every reachable list gets one empty copy first; the copies are then filled with
// their originals' items redirected to copies. Shared sublists stay shared and cycles
// stay cycles, at any depth.
fn deep_copy(engine: &mut Engine, val: Value) -> Value {
    let mut copies = HashMap::new();
    let mut pending = vec![val];
    while let Some(val) = pending.pop() {
        let r = match val {
            Value::Ref(r) if !copies.contains_key(&r) => r,
            _ => continue,
        };
        let items = match engine.heap.get(r).as_list() {
            Some(list) => list.to_vec(),
            None => continue,
        };
        copies.insert(r, engine.heap.insert(Obj::List(List::default())));
        pending.extend(items);
    }

    let redirect = |val: Value| match val {
        Value::Ref(r) => Value::Ref(*copies.get(&r).unwrap_or(&r)),
        _ => val,
    };
    for (&orig, &copy) in &copies {
        let items: Vec<Value> = items_of(engine, orig).iter().map(|item| redirect(*item)).collect();
        if let Some(list) = engine.heap.get_mut(copy).as_list_mut() {
            list.0 = items;
        }
    }
    redirect(val)
}

pub fn copy(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    Ok(deep_copy(engine, args[0]))
}

/// `(find elem seq)`: the index of the first match, or `nil`.
pub fn find(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let seq = seq_arg(engine, env, args[1])?;
    let pos = match seq {
        SeqRef::List(_) => seq
            .items(engine)
            .iter()
            .position(|item| is_eql(engine, *item, args[0])),
        _ => {
            let needle = engine.bytes_arg(env, args[0])?;
            needle
                .first()
                .and_then(|c| seq.bytes(engine).iter().position(|b| b == c))
        },
    };
    Ok(pos.map_or_else(|| engine.nil(), |i| Value::Num(i as i64)))
}

/// `(merge-sym dlist slist)` appends the members of `slist` not already in `dlist`.
pub fn merge_sym(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let dst = engine.list_ref_arg(env, args[0])?;
    let src = engine.list_arg(env, args[1])?;
    if let Some(list) = engine.heap.get_mut(dst).as_list_mut() {
        for item in src {
            if !list.contains(&item) {
                list.0.push(item);
            }
        }
    }
    Ok(args[0])
}

/// `(split str separators)`: the non-empty runs between any of the separator bytes.
pub fn split(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let text = engine.bytes_arg(env, args[0])?;
    let seps = engine.bytes_arg(env, args[1])?;
    let parts = text
        .split(|c| seps.contains(c))
        .filter(|part| !part.is_empty())
        .map(|part| engine.new_str(part))
        .collect();
    Ok(engine.new_list(parts))
}

/// `(match? list pattern)`: equal length, and every element matches or the pattern has `_`.
pub fn is_match(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let items = engine.list_arg(env, args[0])?;
    let pattern = engine.list_arg(env, args[1])?;
    let wild = Value::Sym(engine.syms.underscore);
    let matched = items.len() == pattern.len()
        && items
            .iter()
            .zip(&pattern)
            .all(|(item, pat)| *pat == wild || is_eql(engine, *item, *pat));
    Ok(engine.bool(matched))
}

/// The sequences and index order shared by `some!` and `each!`.
fn sweep(engine: &mut Engine, env: HeapRef, start: Value, end: Value, seqs: Value) -> Result<(Vec<SeqRef>, Vec<usize>), ExecError> {
    let seqs = engine
        .list_arg(env, seqs)?
        .into_iter()
        .map(|seq| seq_arg(engine, env, seq))
        .collect::<Result<Vec<_>, _>>()?;
    let len = seqs.iter().map(|seq| seq.length(engine)).min().unwrap_or(0);
    let start = sweep_bound(engine, env, start, len)?;
    let end = sweep_bound(engine, env, end, len)?;
    let order = if start <= end {
        (start..end).collect()
    } else {
        (end..start).rev().collect()
    };
    Ok((seqs, order))
}

/// Call `func` with element `i` of every sequence, with `_` bound to `i`.
fn visit(engine: &mut Engine, env: HeapRef, func: Value, seqs: &[SeqRef], i: usize) -> Result<Value, ExecError> {
    let mut args = Vec::with_capacity(seqs.len());
    for seq in seqs {
        match seq.elem(engine, i) {
            Ok(val) => args.push(val),
            Err(OutOfRange) => return Err(index_error(engine, env, Value::Num(i as i64))),
        }
    }
    let underscore = engine.syms.underscore;
    env::insert(&mut engine.heap, env, underscore, Value::Num(i as i64));
    engine.apply(env, func, &args)
}

/// `(some! start end mode fn seqs)`
///
/// With a `nil` mode iteration stops at the first result that is not `nil`; otherwise it
/// stops at the first `nil`. Yields the last result, or `mode` if nothing was visited.
pub fn some(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 5, Some(5))?;
    let (seqs, order) = sweep(engine, env, args[0], args[1], args[4])?;
    let stop_on_nil = !engine.is_nil(args[2]);
    let mut last = args[2];
    for i in order {
        last = visit(engine, env, args[3], &seqs, i)?;
        if engine.is_nil(last) == stop_on_nil {
            break;
        }
    }
    Ok(last)
}

/// `(each! start end fn seqs)` yields the last result, or `nil`.
pub fn each(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 4, Some(4))?;
    let (seqs, order) = sweep(engine, env, args[0], args[1], args[3])?;
    let mut last = engine.nil();
    for i in order {
        last = visit(engine, env, args[2], &seqs, i)?;
    }
    Ok(last)
}

fn swap(engine: &mut Engine, r: HeapRef, a: usize, b: usize) {
    if let Some(list) = engine.heap.get_mut(r).as_list_mut() {
        if a < list.len() && b < list.len() {
            list.swap(a, b);
        }
    }
}

/// `(partition fn list start end)`
///
/// Moves the elements of `[start, end)` that `fn` orders before the first one (a negative
/// result) ahead of it, and returns the index the first element ends up at.
pub fn partition(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 4, Some(4))?;
    let func = args[0];
    let r = engine.list_ref_arg(env, args[1])?;
    let len = items_of(engine, r).len();
    let start = sweep_bound(engine, env, args[2], len)?;
    let end = sweep_bound(engine, env, args[3], len)?;
    if start >= end {
        return Ok(Value::Num(start as i64));
    }

    let pivot = items_of(engine, r)[start];
    let mut store = start;
    for i in start + 1..end {
        let item = match items_of(engine, r).get(i) {
            Some(item) => *item,
            None => break,
        };
        let order = engine.apply(env, func, &[item, pivot])?;
        if engine.num_arg(env, order)? < 0 {
            store += 1;
            swap(engine, r, store, i);
        }
    }
    swap(engine, r, start, store);
    Ok(Value::Num(store as i64))
}

pub fn cmp(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 2, Some(2))?;
    let a = engine.bytes_arg(env, args[0])?;
    let b = engine.bytes_arg(env, args[1])?;
    Ok(Value::Num(crate::object::seq::cmp(&a, &b)))
}

/// `(code str [index])`: the byte at `index` (default 0).
pub fn code(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(2))?;
    let bytes = engine.bytes_arg(env, args[0])?;
    let i = match args.get(1) {
        Some(val) => elem_index(engine, env, *val, bytes.len())?,
        None if bytes.is_empty() => return Err(index_error(engine, env, Value::Num(0))),
        None => 0,
    };
    Ok(Value::Num(bytes[i] as i64))
}

/// `(char num)`: a one character string.
pub fn lchar(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let c = engine.byte_arg(env, args[0])?;
    Ok(engine.new_str(vec![c]))
}

/// `(str form)`: the display rendering, or everything written to a string stream.
pub fn str(engine: &mut Engine, env: HeapRef, args: &[Value]) -> Result<Value, ExecError> {
    engine.arity(env, args, 1, Some(1))?;
    let written = match args[0] {
        Value::Ref(r) => match engine.heap.get(r) {
            Obj::OStream(stream) => stream.borrow().contents().map(|bytes| bytes.to_vec()),
            _ => None,
        },
        _ => None,
    };
    let bytes = match written {
        Some(bytes) => bytes,
        None => engine.display(args[0]).into_bytes(),
    };
    Ok(engine.new_str(bytes))
}

#[cfg(test)]
mod tests {
    use super::resolve;

    #[test]
    fn negative_sweep_bounds_count_from_the_end() {
        assert_eq!(resolve(5, -1), 5);
        assert_eq!(resolve(5, -2), 4);
        assert_eq!(resolve(5, -6), 0);
        assert_eq!(resolve(5, 3), 3);
        assert!(resolve(5, -7) < 0);
    }
}
