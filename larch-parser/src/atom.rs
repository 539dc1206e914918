// larch-parser - Atom reference cells
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Atoms: single-slot, lock-free mutable references.
//!
//! The slot points at an immutable `{version, value}` node. Every successful
//! write installs a fresh node with the next version using one
//! compare-and-swap; replaced nodes are reclaimed through crossbeam's epoch
//! collector once no pinned thread can still see them. A node is never
//! reused while observable, so comparing pointers cannot suffer ABA.

use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam::epoch::{self, Atomic, Owned};
use crossbeam::utils::Backoff;

use crate::value::LarchVal;

struct Slot {
    version: u64,
    value: LarchVal,
}

struct AtomCell {
    slot: Atomic<Slot>,
    meta: Option<LarchVal>,
    validator: Option<LarchVal>,
}

impl Drop for AtomCell {
    fn drop(&mut self) {
        // SAFETY: `&mut self` guarantees no other handle to this cell exists,
        // so nothing can load the current slot concurrently.
        unsafe {
            let guard = epoch::unprotected();
            let slot = self.slot.load(Ordering::Relaxed, guard);
            if !slot.is_null() {
                drop(slot.into_owned());
            }
        }
    }
}

/// A mutable reference cell for application state.
///
/// Cloning shares the cell. Equality, ordering and hashing are by identity.
#[derive(Clone)]
pub struct LarchAtom(Arc<AtomCell>);

impl LarchAtom {
    /// Create a new atom with an initial value.
    pub fn new(value: LarchVal) -> Self {
        Self::with_options(value, None, None)
    }

    /// Create an atom carrying metadata and a validator. Both are stored for
    /// later inspection; neither is consulted on mutation.
    pub fn with_options(
        value: LarchVal,
        meta: Option<LarchVal>,
        validator: Option<LarchVal>,
    ) -> Self {
        LarchAtom(Arc::new(AtomCell {
            slot: Atomic::new(Slot { version: 0, value }),
            meta,
            validator,
        }))
    }

    /// Current value.
    pub fn deref(&self) -> LarchVal {
        self.snapshot().1
    }

    /// Number of successful writes so far.
    pub fn version(&self) -> u64 {
        self.snapshot().0
    }

    pub fn meta(&self) -> Option<&LarchVal> {
        self.0.meta.as_ref()
    }

    pub fn validator(&self) -> Option<&LarchVal> {
        self.0.validator.as_ref()
    }

    fn snapshot(&self) -> (u64, LarchVal) {
        let guard = epoch::pin();
        let current = self.0.slot.load(Ordering::Acquire, &guard);
        // SAFETY: the slot is non-null from construction until drop, and the
        // guard keeps the node alive while we clone out of it.
        match unsafe { current.as_ref() } {
            Some(slot) => (slot.version, slot.value.clone()),
            None => (0, LarchVal::Nil),
        }
    }

    /// Apply `f` to the current value until the result is installed.
    ///
    /// `f` runs unpinned and may run several times under contention, so it
    /// must be free of side effects. An error from `f` aborts the update and
    /// leaves the atom untouched. Returns `(old, new)`.
    pub fn update<F, E>(&self, mut f: F) -> Result<(LarchVal, LarchVal), E>
    where
        F: FnMut(&LarchVal) -> Result<LarchVal, E>,
    {
        let backoff = Backoff::new();
        loop {
            let (version, old) = self.snapshot();
            let new = f(&old)?;

            let guard = epoch::pin();
            let current = self.0.slot.load(Ordering::Acquire, &guard);
            // SAFETY: as in `snapshot`.
            let unchanged = unsafe { current.as_ref() }.is_some_and(|s| s.version == version);
            if unchanged {
                let next = Owned::new(Slot {
                    version: version + 1,
                    value: new.clone(),
                });
                if self
                    .0
                    .slot
                    .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire, &guard)
                    .is_ok()
                {
                    // SAFETY: `current` is now unreachable from the slot.
                    unsafe { guard.defer_destroy(current) };
                    return Ok((old, new));
                }
            }
            backoff.spin();
        }
    }

    /// Unconditionally install `value`. Returns `(old, new)`.
    pub fn reset(&self, value: LarchVal) -> (LarchVal, LarchVal) {
        match self.update(|_| Ok::<_, Infallible>(value.clone())) {
            Ok(pair) => pair,
            Err(never) => match never {},
        }
    }

    /// Single attempt: install `new` iff the current value equals `expected`.
    pub fn compare_and_set(&self, expected: &LarchVal, new: LarchVal) -> bool {
        let guard = epoch::pin();
        let current = self.0.slot.load(Ordering::Acquire, &guard);
        // SAFETY: as in `snapshot`.
        let version = match unsafe { current.as_ref() } {
            Some(slot) if slot.value == *expected => slot.version,
            _ => return false,
        };
        let next = Owned::new(Slot {
            version: version + 1,
            value: new,
        });
        match self
            .0
            .slot
            .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire, &guard)
        {
            Ok(_) => {
                // SAFETY: `current` is now unreachable from the slot.
                unsafe { guard.defer_destroy(current) };
                true
            }
            Err(_) => false,
        }
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for LarchAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Atom: {:?}>", self.deref())
    }
}

impl fmt::Display for LarchAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Atom: {}>", self.deref())
    }
}

impl PartialEq for LarchAtom {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for LarchAtom {}

impl PartialOrd for LarchAtom {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LarchAtom {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.addr().cmp(&other.addr())
    }
}

impl Hash for LarchAtom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}
