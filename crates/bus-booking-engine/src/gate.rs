//! Reader/writer gate around shared booking state
//!
//! Scans run concurrently with each other but never overlap a mutation, and a
//! mutation runs alone. Acquiring and marking the gate is a single step of the
//! underlying [`RwLock`], so there is no window between testing the gate and
//! entering it. Guards are released on every exit path, including unwinding,
//! and `parking_lot` locks are not poisoned by a panicking holder.

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::debug;

/// Multiple-readers/single-writer access to a value of type `T`
#[derive(Debug, Default)]
pub struct Gate<T> {
    state: RwLock<T>,
}

impl<T> Gate<T> {
    /// Create a new [`Gate`] owning `state`.
    pub fn new(state: T) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Run `f` with shared access.
    ///
    /// Blocks while a mutation is in flight.
    pub fn scan<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.state.read();
        debug!("gate entered for scan");
        f(&*guard)
    }

    /// Run `f` with exclusive access.
    ///
    /// Blocks until all in-flight scans and mutations have left the gate.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.state.write();
        debug!("gate entered for mutation");
        f(&mut *guard)
    }

    /// Run `check` with shared access and, if it succeeds, `act` with
    /// exclusive access, with no other mutation in between.
    ///
    /// Plain scans may run alongside `check`; they are drained before `act`
    /// starts. Only one caller at a time can be between `check` and `act`.
    pub fn check_then_mutate<C, R, E>(
        &self,
        check: impl FnOnce(&T) -> Result<C, E>,
        act: impl FnOnce(&mut T, C) -> Result<R, E>,
    ) -> Result<R, E> {
        let guard = self.state.upgradable_read();
        debug!("gate entered for check");
        let checked = check(&*guard)?;
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        debug!("gate upgraded for mutation");
        act(&mut *guard, checked)
    }

    /// Whether a mutation currently holds the gate
    pub fn is_mutating(&self) -> bool {
        self.state.is_locked_exclusive()
    }

    /// Take the state out of the gate.
    pub fn into_inner(self) -> T {
        self.state.into_inner()
    }
}
