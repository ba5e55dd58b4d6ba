use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, Ordering};

/// Storage for the value produced by a coroutine.
///
/// The slot holds at most one `T`. Writing into a full slot drops the previous
/// value first, which is what allows a generator to reuse the same storage for
/// every value it yields. The occupancy flag is published with release ordering
/// and observed with acquire ordering, so a consumer resumed later always sees
/// a fully written value.
///
/// Reading from an empty slot is a bug in the driver, not a runtime condition,
/// so [`take`](ResultSlot::take) and [`peek`](ResultSlot::peek) panic instead of
/// returning an error.
pub struct ResultSlot<T> {
    value: MaybeUninit<T>,
    full: AtomicBool,
}

impl<T> ResultSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        ResultSlot {
            value: MaybeUninit::uninit(),
            full: AtomicBool::new(false),
        }
    }

    /// Returns `true` if the slot currently holds a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.full.load(Ordering::Acquire)
    }

    /// Stores `value`, dropping the value that was previously stored, if any.
    pub fn write(&mut self, value: T) {
        self.clear();
        self.value.write(value);
        self.full.store(true, Ordering::Release);
    }

    /// Stores a clone of `value`.
    ///
    /// The old value is dropped before cloning. If `T::clone` panics the slot
    /// is left empty, never half written.
    pub fn write_cloned(&mut self, value: &T)
    where
        T: Clone,
    {
        self.clear();
        let value = value.clone();
        self.value.write(value);
        self.full.store(true, Ordering::Release);
    }

    /// Moves the stored value out, leaving the slot empty.
    ///
    /// # Panics
    /// Panics if the slot is empty.
    #[track_caller]
    pub fn take(&mut self) -> T {
        let was_full = self.full.swap(false, Ordering::AcqRel);
        assert!(was_full, "attempted to take a value out of an empty result slot.");
        // Safety: the flag was set, so the value is initialized, and clearing
        // the flag transfers ownership of it to the caller.
        unsafe { self.value.assume_init_read() }
    }

    /// Returns a reference to the stored value without emptying the slot.
    ///
    /// # Panics
    /// Panics if the slot is empty.
    #[track_caller]
    pub fn peek(&self) -> &T {
        assert!(self.has_value(), "attempted to read an empty result slot.");
        // Safety: the flag is set, so the value is initialized.
        unsafe { self.value.assume_init_ref() }
    }

    /// Mutable counterpart of [`peek`](ResultSlot::peek).
    ///
    /// # Panics
    /// Panics if the slot is empty.
    #[track_caller]
    pub fn peek_mut(&mut self) -> &mut T {
        assert!(self.has_value(), "attempted to read an empty result slot.");
        // Safety: the flag is set, so the value is initialized.
        unsafe { self.value.assume_init_mut() }
    }

    /// Drops the stored value, if any.
    pub fn clear(&mut self) {
        // The flag goes down before the value is dropped, so a panicking
        // destructor still leaves the slot empty.
        if self.full.swap(false, Ordering::AcqRel) {
            // Safety: the flag was set, so the value is initialized and
            // nobody else will read it now that the flag is cleared.
            unsafe { self.value.assume_init_drop() };
        }
    }
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        ResultSlot::new()
    }
}

impl<T> Drop for ResultSlot<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for ResultSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ResultSlot");
        if self.has_value() {
            s.field("value", self.peek());
        } else {
            s.field("value", &format_args!("<empty>"));
        }
        s.finish()
    }
}
