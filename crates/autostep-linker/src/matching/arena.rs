//! Generational slot arena backing tree nodes and definition entries.
//!
//! Removed slots are recycled through a free list. Each reuse bumps the
//! slot's generation so stale keys stop resolving.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ArenaKey {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, value: T) -> ArenaKey {
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index) {
                slot.value = Some(value);
                self.len += 1;
                return ArenaKey {
                    index,
                    generation: slot.generation,
                };
            }
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.len += 1;
        ArenaKey {
            index,
            generation: 0,
        }
    }

    pub(crate) fn get(&self, key: ArenaKey) -> Option<&T> {
        let slot = self.slots.get(key.index)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: ArenaKey) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.index)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.value.as_mut()
    }

    pub(crate) fn remove(&mut self, key: ArenaKey) -> Option<T> {
        let slot = self.slots.get_mut(key.index)?;
        if slot.generation != key.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len = self.len.saturating_sub(1);
        Some(value)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ArenaKey, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.value.as_ref()?;
            Some((
                ArenaKey {
                    index,
                    generation: slot.generation,
                },
                value,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Arena;

    #[test]
    fn reuses_slots_with_new_generation() {
        let mut arena = Arena::default();
        let first = arena.insert("alpha");
        assert_eq!(arena.remove(first), Some("alpha"));
        assert!(arena.get(first).is_none());
        assert!(arena.remove(first).is_none());

        let second = arena.insert("beta");
        assert_ne!(first, second);
        assert_eq!(arena.get(second), Some(&"beta"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn iterates_live_values_only() {
        let mut arena = Arena::default();
        let a = arena.insert(1);
        let _b = arena.insert(2);
        arena.remove(a);
        if let Some(value) = arena.iter().next().map(|(_, v)| *v) {
            assert_eq!(value, 2);
        }
        assert_eq!(arena.iter().count(), 1);
    }
}
