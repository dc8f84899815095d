const BIN_LEN_LOG2: usize = 8;
const BIN_LEN: usize = 1 << BIN_LEN_LOG2;

/// A handle to a value stored in a [`Heap`].
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct HeapRef(u32);

impl HeapRef {
    fn new(bin: usize, offset: usize) -> Self {
        Self((bin << BIN_LEN_LOG2 | offset) as u32)
    }

    fn bin(&self) -> usize {
        (self.0 as usize) >> BIN_LEN_LOG2
    }

    fn offset(&self) -> usize {
        (self.0 as usize) & (BIN_LEN - 1)
    }
}

pub trait HeapValue {
    type ChildIter: Iterator<Item = HeapRef>;

    fn children(&self) -> Self::ChildIter;
}

struct Slot<T> {
    access: u8,
    item: Option<T>,
}

struct Bin<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Bin<T> {
    fn has_space(&self) -> bool {
        self.slots.len() < BIN_LEN
    }

    fn insert(&mut self, item: T, access: u8) -> usize {
        let idx = self.slots.len();
        self.slots.push(Slot {
            access,
            item: Some(item),
        });
        idx
    }
}

/// An arena of values addressed by [`HeapRef`], reclaimed by mark and sweep.
///
/// Values may refer to each other in any shape, cycles included. Nothing is reclaimed
/// until [`Heap::clean`] is called with the full set of roots.
pub struct Heap<T> {
    bins: Vec<Bin<T>>,
    free: Vec<HeapRef>,
    last_access: u8,
    since_clean: usize,
}

impl<T: HeapValue> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HeapValue> Heap<T> {
    pub fn new() -> Self {
        Self {
            bins: Vec::with_capacity(16),
            free: Vec::new(),
            last_access: 0,
            since_clean: 0,
        }
    }

    fn make_space_mut(&mut self) -> (usize, &mut Bin<T>) {
        let needs_bin = self.bins.last().map_or(true, |bin| !bin.has_space());
        if needs_bin {
            self.bins.push(Bin {
                slots: Vec::with_capacity(BIN_LEN),
            });
        }
        let idx = self.bins.len() - 1;
        (idx, &mut self.bins[idx])
    }

    pub fn insert(&mut self, item: T) -> HeapRef {
        self.since_clean += 1;
        let access = self.last_access;

        if let Some(r) = self.free.pop() {
            let slot = &mut self.bins[r.bin()].slots[r.offset()];
            slot.access = access;
            slot.item = Some(item);
            return r;
        }

        let (bin_idx, bin) = self.make_space_mut();
        let offset = bin.insert(item, access);
        HeapRef::new(bin_idx, offset)
    }

    fn slot(&self, r: HeapRef) -> Option<&Slot<T>> {
        self.bins.get(r.bin())?.slots.get(r.offset())
    }

    pub fn contains(&self, r: HeapRef) -> bool {
        self.slot(r).map_or(false, |slot| slot.item.is_some())
    }

    pub fn get(&self, r: HeapRef) -> &T {
        self.slot(r)
            .and_then(|slot| slot.item.as_ref())
            .expect("Dangling heap reference")
    }

    pub fn get_mut(&mut self, r: HeapRef) -> &mut T {
        self.bins
            .get_mut(r.bin())
            .and_then(|bin| bin.slots.get_mut(r.offset()))
            .and_then(|slot| slot.item.as_mut())
            .expect("Dangling heap reference")
    }

    /// Allocations made since the last collection.
    pub fn pending(&self) -> usize {
        self.since_clean
    }

    /// Free everything not reachable from `roots`, returning how many values were freed.
    pub fn clean(&mut self, roots: impl IntoIterator<Item = HeapRef>) -> usize {
        let new_access = if self.last_access == 0 { 1 } else { 0 };

        // Mark
        let mut pending: Vec<HeapRef> = roots.into_iter().collect();
        while let Some(r) = pending.pop() {
            let slot = match self
                .bins
                .get_mut(r.bin())
                .and_then(|bin| bin.slots.get_mut(r.offset()))
            {
                Some(slot) => slot,
                None => continue,
            };
            if slot.access == new_access {
                continue;
            }
            slot.access = new_access;
            if let Some(item) = &slot.item {
                pending.extend(item.children());
            }
        }

        // Sweep
        let mut freed = 0;
        for (bin_idx, bin) in self.bins.iter_mut().enumerate() {
            for (offset, slot) in bin.slots.iter_mut().enumerate() {
                if slot.item.is_some() && slot.access != new_access {
                    slot.item = None;
                    self.free.push(HeapRef::new(bin_idx, offset));
                    freed += 1;
                }
            }
        }

        self.last_access = new_access;
        self.since_clean = 0;
        freed
    }

    pub fn stats(&self) -> Stats {
        let total_values = self.bins
            .iter()
            .map(|bin| bin.slots.iter().filter(|slot| slot.item.is_some()).count())
            .sum();
        Stats {
            total_bins: self.bins.len(),
            full_bins: self.bins
                .iter()
                .filter(|bin| !bin.has_space())
                .count(),
            total_values,
            free_slots: self.free.len(),
            capacity: self.bins.len() * BIN_LEN,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    pub total_bins: usize,
    pub full_bins: usize,
    pub total_values: usize,
    pub free_slots: usize,
    pub capacity: usize,
}
