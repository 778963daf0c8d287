//! Slot table — the binding half of the probe pipeline.
//!
//! `N` logical probe channels exist for the life of the firmware; a rescan
//! is the only thing that binds or clears them. The table lives entirely in
//! the acquisition context — the register-serving side learns identities
//! from drained [`Reading`](super::Reading)s, never from here.

use super::DeviceId;

/// Fixed registry of logical probe slots.
#[derive(Debug)]
pub struct SlotTable<const N: usize> {
    bindings: [Option<DeviceId>; N],
}

impl<const N: usize> SlotTable<N> {
    pub const fn new() -> Self {
        Self {
            bindings: [None; N],
        }
    }

    /// Detach every slot. A rescan always starts here.
    pub fn clear_all(&mut self) {
        self.bindings = [None; N];
    }

    /// Bind `id` to `slot`. Out-of-range indices are ignored — the scanner
    /// only binds indices returned by [`first_empty`](Self::first_empty).
    pub fn bind(&mut self, slot: usize, id: DeviceId) {
        if let Some(entry) = self.bindings.get_mut(slot) {
            *entry = Some(id);
        }
    }

    /// Lowest-indexed unbound slot, if any.
    pub fn first_empty(&self) -> Option<usize> {
        self.bindings.iter().position(Option::is_none)
    }

    /// Identity bound to `slot`, if any.
    pub fn binding(&self, slot: usize) -> Option<DeviceId> {
        self.bindings.get(slot).copied().flatten()
    }

    /// Number of currently bound slots.
    pub fn bound_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_some()).count()
    }

    /// Iterate `(slot, id)` over bound slots in index order.
    pub fn iter_bound(&self) -> impl Iterator<Item = (usize, DeviceId)> + '_ {
        self.bindings
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.map(|id| (i, id)))
    }
}

impl<const N: usize> Default for SlotTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
