// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational arena of realized and recycled containers.

use alloc::vec::Vec;
use hashbrown::HashMap;
use kurbo::Size;

/// Handle of a container slot (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ContainerId(u32, u32);

impl ContainerId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-container state tracked by the pool.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ContainerFlags: u8 {
        /// The container has been measured since it was last bound.
        const MEASURED = 0b0000_0001;
        /// The container hosts a nested group and receives group constraints.
        const GROUP    = 0b0000_0010;
    }
}

#[derive(Clone, Debug)]
struct Slot<C> {
    generation: u32,
    container: C,
    bound: Option<usize>,
    desired_size: Size,
    flags: ContainerFlags,
}

/// Arena owning every container created by a panel.
///
/// A container is either *realized* (bound to exactly one item index) or
/// *recycled* (unbound and waiting for reuse). Bindings are unique: at most
/// one realized container exists per item index.
pub struct ContainerPool<C> {
    slots: Vec<Option<Slot<C>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    by_index: HashMap<usize, ContainerId>,
    recycled: Vec<ContainerId>,
}

impl<C> core::fmt::Debug for ContainerPool<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContainerPool")
            .field("slots_total", &self.slots.len())
            .field("realized", &self.by_index.len())
            .field("recycled", &self.recycled.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<C> Default for ContainerPool<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ContainerPool<C> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            by_index: HashMap::new(),
            recycled: Vec::new(),
        }
    }

    /// Number of realized (bound) containers.
    #[must_use]
    pub fn realized_len(&self) -> usize {
        self.by_index.len()
    }

    /// Number of recycled (unbound) containers.
    #[must_use]
    pub fn recycled_len(&self) -> usize {
        self.recycled.len()
    }

    /// Returns `true` if `id` refers to a live slot.
    #[must_use]
    pub fn is_alive(&self, id: ContainerId) -> bool {
        self.slot(id).is_some()
    }

    /// Container bound to `index`, if realized.
    #[must_use]
    pub fn id_for(&self, index: usize) -> Option<ContainerId> {
        self.by_index.get(&index).copied()
    }

    /// Item index `id` is bound to.
    #[must_use]
    pub fn bound_index(&self, id: ContainerId) -> Option<usize> {
        self.slot(id).and_then(|s| s.bound)
    }

    /// Shared access to a container.
    #[must_use]
    pub fn get(&self, id: ContainerId) -> Option<&C> {
        self.slot(id).map(|s| &s.container)
    }

    /// Mutable access to a container.
    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut C> {
        self.slot_mut(id).map(|s| &mut s.container)
    }

    /// Last desired size recorded for `id`.
    #[must_use]
    pub fn desired_size(&self, id: ContainerId) -> Option<Size> {
        self.slot(id)
            .filter(|s| s.flags.contains(ContainerFlags::MEASURED))
            .map(|s| s.desired_size)
    }

    /// Flags of `id`.
    #[must_use]
    pub fn flags(&self, id: ContainerId) -> ContainerFlags {
        self.slot(id).map(|s| s.flags).unwrap_or_default()
    }

    /// Records a measurement for `id`.
    pub fn set_desired_size(&mut self, id: ContainerId, size: Size) {
        if let Some(s) = self.slot_mut(id) {
            s.desired_size = size;
            s.flags |= ContainerFlags::MEASURED;
        }
    }

    /// Forgets every recorded measurement so realized containers are measured again.
    pub fn invalidate_measurements(&mut self) {
        for s in self.slots.iter_mut().flatten() {
            s.flags.remove(ContainerFlags::MEASURED);
        }
    }

    /// Marks `id` as hosting a nested group.
    pub fn set_group(&mut self, id: ContainerId, group: bool) {
        if let Some(s) = self.slot_mut(id) {
            s.flags.set(ContainerFlags::GROUP, group);
        }
    }

    /// Inserts a freshly created container bound to `index`.
    ///
    /// Any container already bound to `index` must have been unbound first.
    pub fn insert(&mut self, container: C, index: usize) -> ContainerId {
        debug_assert!(
            !self.by_index.contains_key(&index),
            "index {index} is already bound"
        );
        let slot = |generation| Slot {
            generation,
            container,
            bound: Some(index),
            desired_size: Size::ZERO,
            flags: ContainerFlags::empty(),
        };
        let id = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(slot(generation));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ContainerId uses 32-bit indices by design."
            )]
            ContainerId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(slot(generation)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ContainerId uses 32-bit indices by design."
            )]
            ContainerId::new((self.slots.len() - 1) as u32, generation)
        };
        self.by_index.insert(index, id);
        id
    }

    /// Pops a recycled container for reuse. It stays unbound until [`Self::bind`].
    pub fn pop_recycled(&mut self) -> Option<ContainerId> {
        while let Some(id) = self.recycled.pop() {
            if self.is_alive(id) {
                return Some(id);
            }
        }
        None
    }

    /// Binds an unbound container to `index`.
    pub fn bind(&mut self, id: ContainerId, index: usize) {
        debug_assert!(
            !self.by_index.contains_key(&index),
            "index {index} is already bound"
        );
        let Some(s) = self.slot_mut(id) else {
            return;
        };
        debug_assert!(s.bound.is_none(), "container {id:?} is still bound");
        s.bound = Some(index);
        s.flags.remove(ContainerFlags::MEASURED);
        self.by_index.insert(index, id);
    }

    /// Clears the binding of `id` and parks it on the recycle stack.
    /// Returns the container so the host can reset it.
    pub fn recycle(&mut self, id: ContainerId) -> Option<&mut C> {
        let bound = self.slot(id)?.bound;
        if let Some(index) = bound {
            self.by_index.remove(&index);
            self.recycled.push(id);
        }
        let s = self.slot_mut(id)?;
        s.bound = None;
        s.flags = ContainerFlags::empty();
        Some(&mut s.container)
    }

    /// Removes `id` from the pool entirely and returns its container.
    pub fn discard(&mut self, id: ContainerId) -> Option<C> {
        let slot = self.slots.get_mut(id.idx())?.take_if(|s| s.generation == id.1)?;
        if let Some(index) = slot.bound {
            self.by_index.remove(&index);
        }
        self.recycled.retain(|r| *r != id);
        self.free_list.push(id.idx());
        Some(slot.container)
    }

    /// Iterates `(index, id)` over every realized container, in no particular order.
    pub fn realized(&self) -> impl Iterator<Item = (usize, ContainerId)> + '_ {
        self.by_index.iter().map(|(i, id)| (*i, *id))
    }

    /// Realized item indices in ascending order.
    #[must_use]
    pub fn realized_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.by_index.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Recycled container ids, most recently recycled last.
    #[must_use]
    pub fn recycled_ids(&self) -> &[ContainerId] {
        &self.recycled
    }

    /// Rebinds every realized container through `map`.
    ///
    /// `map` must be injective over the currently bound indices.
    pub fn remap(&mut self, mut map: impl FnMut(usize) -> usize) {
        let old = core::mem::take(&mut self.by_index);
        for (index, id) in old {
            let new_index = map(index);
            if let Some(s) = self.slot_mut(id) {
                s.bound = Some(new_index);
            }
            let previous = self.by_index.insert(new_index, id);
            debug_assert!(previous.is_none(), "remap produced a duplicate index {new_index}");
        }
    }

    fn slot(&self, id: ContainerId) -> Option<&Slot<C>> {
        self.slots
            .get(id.idx())
            .and_then(Option::as_ref)
            .filter(|s| s.generation == id.1)
    }

    fn slot_mut(&mut self, id: ContainerId) -> Option<&mut Slot<C>> {
        self.slots
            .get_mut(id.idx())
            .and_then(Option::as_mut)
            .filter(|s| s.generation == id.1)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContainerFlags, ContainerPool};
    use alloc::vec;
    use kurbo::Size;

    #[test]
    fn insert_bind_and_lookup() {
        let mut pool = ContainerPool::new();
        let a = pool.insert("a", 3);
        let b = pool.insert("b", 4);
        assert_eq!(pool.realized_len(), 2);
        assert_eq!(pool.id_for(3), Some(a));
        assert_eq!(pool.bound_index(b), Some(4));
        assert_eq!(pool.get(a), Some(&"a"));
        assert_eq!(pool.realized_indices(), vec![3, 4]);
    }

    #[test]
    fn recycle_unbinds_and_reuses() {
        let mut pool = ContainerPool::new();
        let a = pool.insert(0_u32, 3);
        pool.set_desired_size(a, Size::new(5.0, 5.0));
        *pool.recycle(a).unwrap() = 99;

        assert_eq!(pool.realized_len(), 0);
        assert_eq!(pool.recycled_len(), 1);
        assert_eq!(pool.bound_index(a), None);
        assert_eq!(pool.desired_size(a), None);

        let reused = pool.pop_recycled().unwrap();
        assert_eq!(reused, a);
        pool.bind(reused, 10);
        assert_eq!(pool.id_for(10), Some(a));
        assert_eq!(pool.get(a), Some(&99));
        assert_eq!(pool.recycled_len(), 0);
    }

    #[test]
    fn discard_frees_slot_with_new_generation() {
        let mut pool = ContainerPool::new();
        let a = pool.insert('a', 0);
        assert_eq!(pool.discard(a), Some('a'));
        assert!(!pool.is_alive(a));
        assert_eq!(pool.discard(a), None);

        let b = pool.insert('b', 0);
        assert_ne!(a, b, "generation must increase on reuse");
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.get(b), Some(&'b'));
    }

    #[test]
    fn discarding_recycled_container_removes_it_from_stack() {
        let mut pool = ContainerPool::new();
        let a = pool.insert((), 0);
        pool.recycle(a);
        pool.discard(a);
        assert_eq!(pool.recycled_len(), 0);
        assert_eq!(pool.pop_recycled(), None);
    }

    #[test]
    fn remap_shifts_bindings() {
        let mut pool = ContainerPool::new();
        let a = pool.insert((), 1);
        let b = pool.insert((), 5);
        pool.set_group(b, true);
        pool.remap(|i| if i >= 3 { i + 2 } else { i });
        assert_eq!(pool.id_for(1), Some(a));
        assert_eq!(pool.id_for(7), Some(b));
        assert_eq!(pool.id_for(5), None);
        assert!(pool.flags(b).contains(ContainerFlags::GROUP));
    }
}
