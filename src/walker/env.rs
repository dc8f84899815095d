//! Lexical environments.
//!
//! An [`Env`] lives in the heap and points at its parent, forming a chain that lookups walk
//! from the innermost scope outwards. Defining a binding only ever touches the environment
//! it is given; updating one rewrites whichever environment in the chain already owns it.

use std::collections::HashMap;
use crate::object::{Obj, Symbol, Value};
use super::heap::{Heap, HeapRef};

#[derive(Clone, Debug, Default)]
pub struct Env {
    map: HashMap<Symbol, Value>,
    parent: Option<HeapRef>,
}

impl Env {
    pub fn new(parent: Option<HeapRef>) -> Self {
        Self {
            map: HashMap::new(),
            parent,
        }
    }

    pub fn parent(&self) -> Option<HeapRef> {
        self.parent
    }

    pub fn insert(&mut self, sym: Symbol, val: Value) -> Option<Value> {
        self.map.insert(sym, val)
    }

    pub fn remove(&mut self, sym: Symbol) -> Option<Value> {
        self.map.remove(&sym)
    }

    pub fn local(&self, sym: Symbol) -> Option<Value> {
        self.map.get(&sym).copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.map.values()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (Symbol, Value)> + '_ {
        self.map.iter().map(|(sym, val)| (*sym, *val))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The binding a lookup resolved to: the environment that owns it and its name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub env: HeapRef,
    pub sym: Symbol,
}

fn env_at(heap: &Heap<Obj>, r: HeapRef) -> Option<&Env> {
    heap.get(r).as_env()
}

pub fn get_parent(heap: &Heap<Obj>, env: HeapRef) -> Option<HeapRef> {
    env_at(heap, env)?.parent
}

/// Re-parent `env`. Refused (returning `false`) if it would make the chain circular.
pub fn set_parent(heap: &mut Heap<Obj>, env: HeapRef, parent: Option<HeapRef>) -> bool {
    let mut cur = parent;
    while let Some(r) = cur {
        if r == env {
            return false;
        }
        cur = get_parent(heap, r);
    }

    match heap.get_mut(env).as_env_mut() {
        Some(e) => {
            e.parent = parent;
            true
        },
        None => false,
    }
}

pub fn find(heap: &Heap<Obj>, env: HeapRef, sym: Symbol) -> Option<Slot> {
    let mut cur = Some(env);
    while let Some(r) = cur {
        let e = env_at(heap, r)?;
        if e.map.contains_key(&sym) {
            return Some(Slot { env: r, sym });
        }
        cur = e.parent;
    }
    None
}

pub fn get(heap: &Heap<Obj>, env: HeapRef, sym: Symbol) -> Option<Value> {
    let slot = find(heap, env, sym)?;
    env_at(heap, slot.env)?.local(sym)
}

/// Update an existing binding wherever it lives in the chain. Never creates one.
pub fn set(heap: &mut Heap<Obj>, env: HeapRef, sym: Symbol, val: Value) -> Option<Slot> {
    let slot = find(heap, env, sym)?;
    heap.get_mut(slot.env).as_env_mut()?.insert(sym, val);
    Some(slot)
}

/// Bind `sym` in `env` itself, shadowing any outer binding.
pub fn insert(heap: &mut Heap<Obj>, env: HeapRef, sym: Symbol, val: Value) -> bool {
    match heap.get_mut(env).as_env_mut() {
        Some(e) => {
            e.insert(sym, val);
            true
        },
        None => false,
    }
}
