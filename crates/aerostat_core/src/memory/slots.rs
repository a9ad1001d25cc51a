//! # Fixed Slots
//!
//! Fixed-capacity array of slots, each carrying a liveness flag.

/// A fixed-capacity array of slots with a liveness flag per slot.
///
/// Unlike a free-list pool, nothing is ever moved or dropped: a dead slot
/// keeps its value and its index. Instanced renderers rely on this, since
/// slot `i` always maps to instance `i` of the GPU buffer and a dead slot is
/// simply drawn at zero scale.
///
/// # Thread Safety
///
/// Not thread-safe. Owned by a single particle system.
///
/// # Example
///
/// ```rust
/// use aerostat_core::FixedSlots;
///
/// let mut slots: FixedSlots<u32> = FixedSlots::new(3, |i| i as u32);
/// assert_eq!(slots.live_count(), 0);
///
/// *slots.revive(1) += 10;
/// assert!(slots.is_live(1));
/// assert_eq!(slots.get(1), Some(&11));
///
/// slots.retire(1);
/// assert!(!slots.is_live(1));
/// assert_eq!(slots.get(1), Some(&11)); // value survives retirement
/// ```
pub struct FixedSlots<T> {
    /// Slot values, never reallocated.
    values: Box<[T]>,
    /// Liveness per slot.
    live: Box<[bool]>,
    /// Number of live slots.
    live_count: usize,
}

impl<T> FixedSlots<T> {
    /// Creates `capacity` dead slots, each initialized by `init(index)`.
    ///
    /// All memory is allocated here, once.
    #[must_use]
    pub fn new(capacity: usize, init: impl FnMut(usize) -> T) -> Self {
        let values: Vec<T> = (0..capacity).map(init).collect();
        Self {
            values: values.into_boxed_slice(),
            live: vec![false; capacity].into_boxed_slice(),
            live_count: 0,
        }
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Returns the number of live slots.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Returns true if slot `index` is live. Out-of-range indices are dead.
    #[inline]
    #[must_use]
    pub fn is_live(&self, index: usize) -> bool {
        self.live.get(index).copied().unwrap_or(false)
    }

    /// Marks slot `index` live and returns its value for re-initialization.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    pub fn revive(&mut self, index: usize) -> &mut T {
        if !self.live[index] {
            self.live[index] = true;
            self.live_count += 1;
        }
        &mut self.values[index]
    }

    /// Marks slot `index` dead. The value is kept in place.
    ///
    /// Returns true if the slot was live.
    pub fn retire(&mut self, index: usize) -> bool {
        match self.live.get_mut(index) {
            Some(flag) if *flag => {
                *flag = false;
                self.live_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Gets a slot value regardless of liveness.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Gets a mutable slot value regardless of liveness.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.values.get_mut(index)
    }

    /// All slot values in index order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Iterates `(index, is_live, value)` over every slot.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool, &T)> {
        self.values
            .iter()
            .zip(self.live.iter())
            .enumerate()
            .map(|(index, (value, &live))| (index, live, value))
    }

    /// Iterates live slots only.
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &T)> {
        self.iter().filter_map(|(index, live, value)| live.then_some((index, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_start_dead() {
        let slots: FixedSlots<u8> = FixedSlots::new(8, |_| 0);
        assert_eq!(slots.capacity(), 8);
        assert_eq!(slots.live_count(), 0);
        assert!((0..8).all(|i| !slots.is_live(i)));
    }

    #[test]
    fn test_revive_is_idempotent() {
        let mut slots: FixedSlots<u8> = FixedSlots::new(2, |_| 0);
        slots.revive(0);
        slots.revive(0);
        assert_eq!(slots.live_count(), 1);
    }

    #[test]
    fn test_retire_keeps_index_and_value() {
        let mut slots: FixedSlots<u32> = FixedSlots::new(4, |i| i as u32 * 100);
        slots.revive(3);
        assert!(slots.retire(3));
        assert!(!slots.retire(3));
        assert_eq!(slots.get(3), Some(&300));
        assert_eq!(slots.as_slice().len(), 4);
    }

    #[test]
    fn test_out_of_range_is_dead() {
        let mut slots: FixedSlots<u8> = FixedSlots::new(1, |_| 0);
        assert!(!slots.is_live(5));
        assert!(!slots.retire(5));
        assert!(slots.get(5).is_none());
    }

    #[test]
    fn test_iter_live_skips_dead() {
        let mut slots: FixedSlots<u8> = FixedSlots::new(5, |_| 7);
        slots.revive(1);
        slots.revive(4);
        let live: Vec<usize> = slots.iter_live().map(|(i, _)| i).collect();
        assert_eq!(live, vec![1, 4]);

        assert!(slots.retire(1));
        assert_eq!(slots.live_count(), 1);
        assert_eq!(slots.iter_live().map(|(i, _)| i).collect::<Vec<_>>(), vec![4]);
    }
}
