//! Scoped replacement of thread-local slots.
//!
//! A slot holds at most one value per thread. [`Restore::replace`] swaps a new value in and
//! hands back a guard; dropping the guard puts the previous value back, on normal return as
//! well as on early return through `?` or unwinding.

use std::{cell::RefCell, thread::LocalKey};

pub type Slot<T> = LocalKey<RefCell<Option<T>>>;

/// Restores the previous content of a slot when dropped.
#[must_use]
pub struct Restore<T: 'static> {
    slot: &'static Slot<T>,
    prev: Option<T>,
}

impl<T: 'static> Restore<T> {
    /// Replace the content of `slot` until the guard is dropped.
    pub fn replace(slot: &'static Slot<T>, value: Option<T>) -> Self {
        let prev = swap(slot, value);
        Restore { slot, prev }
    }
}

impl<T: 'static> Drop for Restore<T> {
    fn drop(&mut self) {
        let prev = self.prev.take();
        // the slot may already be gone if the thread is exiting
        let _ = self.slot.try_with(|cell| *cell.borrow_mut() = prev);
    }
}

/// Put `value` into the slot and return what was there.
pub fn swap<T: 'static>(slot: &'static Slot<T>, value: Option<T>) -> Option<T> {
    slot.with(|cell| std::mem::replace(&mut *cell.borrow_mut(), value))
}

/// Clone the current content of the slot.
pub fn peek<T: Clone + 'static>(slot: &'static Slot<T>) -> Option<T> {
    slot.with(|cell| cell.borrow().clone())
}
