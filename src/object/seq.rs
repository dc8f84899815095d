use std::ops::{Deref, DerefMut};
use super::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutOfRange;

/// Operations shared by every sequence kind.
///
/// Indices are zero based and slices are half open: `slice(s, e)` covers `[s, e)`.
pub trait Seq {
    type Elem;
    type Owned;

    fn length(&self) -> usize;

    /// Fails unless `i` lies in `[0, length)`.
    fn elem(&self, i: usize) -> Result<Self::Elem, OutOfRange>;

    /// Fails if `s > e` or either bound lies outside `[0, length]`.
    fn slice(&self, s: usize, e: usize) -> Result<Self::Owned, OutOfRange>;

    /// Join `parts` into a single new sequence of the same kind.
    fn cat(parts: &[&Self]) -> Self::Owned;
}

fn check_slice(len: usize, s: usize, e: usize) -> Result<(), OutOfRange> {
    if s <= e && e <= len {
        Ok(())
    } else {
        Err(OutOfRange)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct List(pub Vec<Value>);

impl Deref for List {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl DerefMut for List {
    fn deref_mut(&mut self) -> &mut [Value] {
        &mut self.0
    }
}

impl Seq for [Value] {
    type Elem = Value;
    type Owned = List;

    fn length(&self) -> usize {
        self.len()
    }

    fn elem(&self, i: usize) -> Result<Value, OutOfRange> {
        self.get(i).copied().ok_or(OutOfRange)
    }

    fn slice(&self, s: usize, e: usize) -> Result<List, OutOfRange> {
        check_slice(self.len(), s, e)?;
        Ok(List(self[s..e].to_vec()))
    }

    fn cat(parts: &[&Self]) -> List {
        let total = parts.iter().map(|part| part.len()).sum();
        let mut items = Vec::with_capacity(total);
        for part in parts {
            items.extend_from_slice(part);
        }
        List(items)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Str(pub Vec<u8>);

impl Deref for Str {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Str {
    fn from(s: &str) -> Self {
        Str(s.as_bytes().to_vec())
    }
}

impl Seq for [u8] {
    type Elem = u8;
    type Owned = Str;

    fn length(&self) -> usize {
        self.len()
    }

    fn elem(&self, i: usize) -> Result<u8, OutOfRange> {
        self.get(i).copied().ok_or(OutOfRange)
    }

    fn slice(&self, s: usize, e: usize) -> Result<Str, OutOfRange> {
        check_slice(self.len(), s, e)?;
        Ok(Str(self[s..e].to_vec()))
    }

    fn cat(parts: &[&Self]) -> Str {
        let total = parts.iter().map(|part| part.len()).sum();
        let mut bytes = Vec::with_capacity(total);
        for part in parts {
            bytes.extend_from_slice(part);
        }
        Str(bytes)
    }
}

/// Byte-wise comparison: the first differing byte decides, otherwise the shorter string
/// is less.
pub fn cmp(a: &[u8], b: &[u8]) -> i64 {
    for (x, y) in a.iter().zip(b.iter()) {
        let c = *x as i64 - *y as i64;
        if c != 0 {
            return c;
        }
    }
    a.len() as i64 - b.len() as i64
}
