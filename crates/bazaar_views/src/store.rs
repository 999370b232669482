//! # State Container
//!
//! Per-page UI state with subscriber notification. All mutation funnels
//! through one cell, so a renderer (or a test) observes a consistent
//! snapshot and hears about every change.
//!
//! Overlapping writers are allowed - polling and user actions are not
//! coordinated - and the last write wins, exactly like the page state it
//! replaces.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

/// A shared, observable piece of view state.
pub struct StateCell<T> {
    value: RwLock<T>,
    subscribers: Mutex<Vec<Sender<()>>>,
}

impl<T: Clone> StateCell<T> {
    /// Creates a cell holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Replaces the state and notifies subscribers.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
        self.notify();
    }

    /// Mutates the state in place and notifies subscribers.
    pub fn update(&self, mutate: impl FnOnce(&mut T)) {
        mutate(&mut self.value.write());
        self.notify();
    }

    /// Registers a change listener.
    ///
    /// Each notification is a unit tick; subscribers re-read the cell for
    /// the new snapshot. Dropped receivers are pruned on the next notify.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<()> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    fn notify(&self) {
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(()).is_ok());
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_update() {
        let cell = StateCell::new(1u32);
        assert_eq!(cell.get(), 1);
        cell.update(|v| *v += 10);
        assert_eq!(cell.get(), 11);
    }

    #[test]
    fn test_subscribers_hear_every_change() {
        let cell = StateCell::new(0u32);
        let rx = cell.subscribe();
        cell.set(1);
        cell.update(|v| *v = 2);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let cell = StateCell::new(0u32);
        drop(cell.subscribe());
        cell.set(1); // must not fail or leak the dead sender
        assert_eq!(cell.subscribers.lock().len(), 0);
    }
}
