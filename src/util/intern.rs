use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// A handle to an item stored in an [`InternTable`].
///
/// Two handles from the same table are equal if and only if they were produced from equal
/// items, so comparison and hashing never look at the item itself.
pub struct Interned<T>(u32, PhantomData<fn() -> T>);

impl<T> Interned<T> {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl<T> Copy for Interned<T> {}
impl<T> Clone for Interned<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Interned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for Interned<T> {}

impl<T> Hash for Interned<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> fmt::Debug for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct InternTable<T: Eq + Hash> {
    items: Vec<T>,
    index: HashMap<T, Interned<T>>,
}

impl<T: Eq + Hash> Default for InternTable<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> InternTable<T> {
    pub fn get(&self, key: Interned<T>) -> &T {
        self.items.get(key.index()).expect("Cannot locate interned item")
    }

    pub fn intern(&mut self, item: impl Into<T>) -> Interned<T> {
        let item = item.into();

        if let Some(key) = self.index.get(&item) {
            return *key;
        }

        let key = Interned(self.items.len() as u32, PhantomData);
        self.index.insert(item.clone(), key);
        self.items.push(item);
        key
    }

    /// Look an item up without registering it.
    pub fn find<Q>(&self, item: &Q) -> Option<Interned<T>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(item).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
