use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Status of a hook's load cycle.
///
/// Only the error case carries a payload, so a ready hook can never hold a
/// stale load error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Ready,
    Error(String),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Ticket handed out when a load cycle starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoadTicket(u64);

struct Slot<S> {
    value: S,
    generation: u64,
    mounted: bool,
}

/// Shared state behind a hook handle.
///
/// Every load cycle takes a ticket; a completion is written only if its
/// ticket is still the latest and the hook has not been unmounted. The lock
/// is never held across an `.await`.
pub(crate) struct HookState<S> {
    slot: Arc<Mutex<Slot<S>>>,
}

impl<S> Clone for HookState<S> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S: Clone> HookState<S> {
    pub(crate) fn new(value: S) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value,
                generation: 0,
                mounted: true,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<S>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> S {
        self.lock().value.clone()
    }

    /// Read a piece of the current value without cloning all of it
    pub(crate) fn read<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.lock().value)
    }

    /// Start a new load cycle, invalidating any cycle still in flight
    pub(crate) fn begin_load(&self, f: impl FnOnce(&mut S)) -> LoadTicket {
        let mut slot = self.lock();
        slot.generation += 1;
        f(&mut slot.value);
        LoadTicket(slot.generation)
    }

    /// Write the outcome of a load cycle; returns false when it was discarded
    pub(crate) fn finish_load(&self, ticket: LoadTicket, f: impl FnOnce(&mut S)) -> bool {
        let mut slot = self.lock();
        if !slot.mounted || slot.generation != ticket.0 {
            return false;
        }
        f(&mut slot.value);
        true
    }

    /// Write the outcome of a mutation; discarded after unmount
    pub(crate) fn update(&self, f: impl FnOnce(&mut S)) -> bool {
        let mut slot = self.lock();
        if !slot.mounted {
            return false;
        }
        f(&mut slot.value);
        true
    }

    pub(crate) fn unmount(&self) {
        self.lock().mounted = false;
    }

    #[cfg(test)]
    pub(crate) fn is_mounted(&self) -> bool {
        self.lock().mounted
    }
}
