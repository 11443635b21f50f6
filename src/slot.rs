//! Publish-once storage backing [`LazyPacker`](crate::LazyPacker).
//!
//! A [`Slot<T>`] is either empty or holds exactly one value for the rest of
//! its life. The value sits in an `UnsafeCell<MaybeUninit<T>>` next to its
//! [`Gate`]; it is written once while the gate is held and read without any
//! locking after the gate publishes it.

use core::cell::UnsafeCell;
use core::{fmt, mem};

use crate::gate::{Finalizer, Gate};

pub(crate) struct Slot<T> {
   value: UnsafeCell<mem::MaybeUninit<T>>,
   gate: Gate,
}

impl<T> Slot<T> {
   #[inline]
   pub(crate) const fn new() -> Self {
      Self {
         value: UnsafeCell::new(mem::MaybeUninit::uninit()),
         gate: Gate::new(),
      }
   }

   #[inline]
   pub(crate) const fn with_value(value: T) -> Self {
      Self {
         value: UnsafeCell::new(mem::MaybeUninit::new(value)),
         gate: Gate::finalized(),
      }
   }

   /// Never blocks.
   #[inline]
   pub(crate) fn is_finalized(&self) -> bool {
      self.gate.is_finalized()
   }

   /// Returns the published value, or `None` while the slot is empty or
   /// being finalized. Never blocks.
   #[inline]
   pub(crate) fn get(&self) -> Option<&T> {
      if self.is_finalized() {
         // SAFETY: the Acquire load saw FINALIZED, so the write is visible
         // and will never happen again.
         Some(unsafe { self.get_unchecked() })
      } else {
         None
      }
   }

   /// # Safety
   ///
   /// The slot must be finalized.
   #[inline]
   unsafe fn get_unchecked(&self) -> &T {
      debug_assert!(self.is_finalized(), "read from an empty slot");
      unsafe { (*self.value.get()).assume_init_ref() }
   }

   /// Writes `value` and publishes it through `finalizer`.
   #[inline]
   fn finalize(&self, finalizer: Finalizer<'_>, value: T) -> &T {
      // SAFETY: the finalizer is the only write access there is, and the
      // slot cannot be finalized yet or `enter` would have returned `None`.
      unsafe { (*self.value.get()).write(value) };
      finalizer.publish();
      // SAFETY: just published.
      unsafe { self.get_unchecked() }
   }

   /// Returns the published value, running `f` to produce it if the slot is
   /// empty. Concurrent callers block on the gate; at most one `f` runs.
   #[inline]
   pub(crate) fn get_or_finalize<F>(&self, f: F) -> &T
   where
      F: FnOnce() -> T,
   {
      if let Some(value) = self.get() {
         return value;
      }
      self.finalize_slow(f)
   }

   #[cold]
   fn finalize_slow<F>(&self, f: F) -> &T
   where
      F: FnOnce() -> T,
   {
      match self.gate.enter() {
         Some(finalizer) => self.finalize(finalizer, f()),
         // SAFETY: `enter` only returns `None` for a finalized slot.
         None => unsafe { self.get_unchecked() },
      }
   }

   /// Async flavour of [`get_or_finalize`](Self::get_or_finalize); suspends
   /// the task rather than the thread while another caller finalizes.
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   pub(crate) async fn get_or_finalize_async<F>(&self, f: F) -> &T
   where
      F: FnOnce() -> T,
   {
      if let Some(value) = self.get() {
         return value;
      }
      match self.gate.enter_async().await {
         Some(finalizer) => self.finalize(finalizer, f()),
         // SAFETY: `enter_async` only returns `None` for a finalized slot.
         None => unsafe { self.get_unchecked() },
      }
   }

   /// Stores `value` if the slot is still empty, blocking while another
   /// thread finalizes it. Hands `value` back if someone else won.
   #[inline]
   pub(crate) fn try_finalize(&self, value: T) -> Result<&T, T> {
      if self.is_finalized() {
         return Err(value);
      }
      match self.gate.enter() {
         Some(finalizer) => Ok(self.finalize(finalizer, value)),
         None => Err(value),
      }
   }

   /// Consumes the slot, returning its value if it was finalized.
   #[inline]
   pub(crate) fn into_inner(self) -> Option<T> {
      let mut this = mem::ManuallyDrop::new(self);
      if this.is_finalized() {
         // SAFETY: finalized, owned, and `Drop` will not run for `this`.
         Some(unsafe { this.value.get_mut().assume_init_read() })
      } else {
         None
      }
   }
}

// SAFETY: the value is written once under the gate and only shared after the
// Release publish, so `&Slot<T>` hands out `&T` across threads (`T: Sync`)
// and may move a `T` produced on one thread to another (`T: Send`).
unsafe impl<T: Sync + Send> Sync for Slot<T> {}
// SAFETY: owning the slot owns the `T`.
unsafe impl<T: Send> Send for Slot<T> {}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self.get() {
         Some(v) => fmt::Debug::fmt(v, f),
         None => f.write_str("<empty>"),
      }
   }
}

impl<T> Drop for Slot<T> {
   #[inline]
   fn drop(&mut self) {
      if self.is_finalized() {
         // SAFETY: finalized and exclusively borrowed for the last time.
         unsafe { self.value.get_mut().assume_init_drop() };
      }
   }
}
