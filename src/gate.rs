//! The gate serializing the one empty-to-finalized transition of a slot.
//!
//! A gate is in one of three phases, kept in an `AtomicU8`:
//!
//! ```text
//!   EMPTY ──enter──▶ FINALIZING ──publish──▶ FINALIZED
//!     ▲                  │
//!     └─────abandon──────┘
//! ```
//!
//! FINALIZING hands out a single [`Finalizer`]. Threads that find the gate
//! FINALIZING set the `PARKED` flag and sleep on the state word through
//! `parking_lot_core`; tasks register with a `tokio::sync::Notify` instead, so
//! an async caller never blocks its worker. Every return of the finalizer,
//! publish or abandon, clears `PARKED` and wakes both kinds of waiter, which
//! then try to enter again.
//!
//! Readers only check for FINALIZED with an `Acquire` load, which pairs with
//! the `Release` store in [`Finalizer::publish`].

use core::mem;
use core::sync::atomic::{AtomicU8, Ordering};

use parking_lot_core::{DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};

const EMPTY: u8 = 0;
const FINALIZING: u8 = 1;
const FINALIZED: u8 = 2;
/// Set while FINALIZING when at least one thread sleeps on the word.
const PARKED: u8 = 4;

enum Entry<'a> {
   Finalized,
   Entered(Finalizer<'a>),
   /// Another finalizer is out; the payload is the state to sleep on.
   Busy(u8),
}

pub(crate) struct Gate {
   state: AtomicU8,
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   tasks: tokio::sync::Notify,
}

impl Gate {
   const fn with_state(state: u8) -> Self {
      Self {
         state: AtomicU8::new(state),
         #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
         tasks: tokio::sync::Notify::const_new(),
      }
   }

   /// A gate for an empty slot.
   #[inline]
   pub(crate) const fn new() -> Self {
      Self::with_state(EMPTY)
   }

   /// A gate for a slot that is born finalized.
   #[inline]
   pub(crate) const fn finalized() -> Self {
      Self::with_state(FINALIZED)
   }

   #[inline]
   pub(crate) fn is_finalized(&self) -> bool {
      self.state.load(Ordering::Acquire) == FINALIZED
   }

   /// One attempt at taking the finalizer.
   fn try_enter(&self) -> Entry<'_> {
      let mut state = self.state.load(Ordering::Acquire);
      loop {
         let next = match state {
            FINALIZED => return Entry::Finalized,
            EMPTY => FINALIZING,
            s if s & PARKED != 0 => return Entry::Busy(s),
            s => s | PARKED,
         };
         match self
            .state
            .compare_exchange_weak(state, next, Ordering::Acquire, Ordering::Acquire)
         {
            Ok(_) if next == FINALIZING => return Entry::Entered(Finalizer { gate: self }),
            Ok(_) => return Entry::Busy(next),
            Err(actual) => state = actual,
         }
      }
   }

   /// Takes the finalizer, sleeping while someone else holds it.
   ///
   /// Returns `None` once the gate is finalized.
   pub(crate) fn enter(&self) -> Option<Finalizer<'_>> {
      loop {
         match self.try_enter() {
            Entry::Finalized => return None,
            Entry::Entered(finalizer) => return Some(finalizer),
            Entry::Busy(observed) => self.sleep(observed),
         }
      }
   }

   /// Async [`enter`](Self::enter). Suspends the task instead of the thread,
   /// so it works the same on current-thread and multi-thread runtimes.
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   pub(crate) async fn enter_async(&self) -> Option<Finalizer<'_>> {
      loop {
         let woken = self.tasks.notified();
         let mut woken = std::pin::pin!(woken);
         // Registered before the state is checked, so a release between the
         // check and the await still wakes this task.
         woken.as_mut().enable();
         match self.try_enter() {
            Entry::Finalized => return None,
            Entry::Entered(finalizer) => return Some(finalizer),
            Entry::Busy(_) => woken.await,
         }
      }
   }

   fn sleep(&self, observed: u8) {
      let key = self.key();
      // SAFETY: the validate and timed-out callbacks do not panic or call
      // back into parking_lot.
      unsafe {
         parking_lot_core::park(
            key,
            || self.state.load(Ordering::Acquire) == observed,
            || {},
            |_, _| {},
            DEFAULT_PARK_TOKEN,
            None,
         );
      }
   }

   /// Ends the FINALIZING phase and wakes everyone waiting on it.
   fn release(&self, to: u8) {
      let previous = self.state.swap(to, Ordering::Release);
      debug_assert_eq!(previous & !PARKED, FINALIZING, "finalizer released twice");
      if previous & PARKED != 0 {
         // SAFETY: the key is this gate's address, which is what sleepers
         // park on.
         unsafe {
            parking_lot_core::unpark_all(self.key(), DEFAULT_UNPARK_TOKEN);
         }
      }
      #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
      self.tasks.notify_waiters();
   }

   #[inline]
   fn key(&self) -> usize {
      &self.state as *const AtomicU8 as usize
   }
}

/// Exclusive right to finalize a slot.
///
/// Consumed by [`publish`](Self::publish). Dropping it instead (for example
/// while a panic unwinds) puts the gate back to empty.
#[must_use = "dropping a finalizer abandons the gate"]
pub(crate) struct Finalizer<'a> {
   gate: &'a Gate,
}

impl Finalizer<'_> {
   /// Marks the slot finalized. The value must already be written.
   #[inline]
   pub(crate) fn publish(self) {
      let gate = self.gate;
      mem::forget(self);
      gate.release(FINALIZED);
   }
}

impl Drop for Finalizer<'_> {
   #[cold]
   fn drop(&mut self) {
      tracing::debug!("slot finalizer abandoned, waiters retry");
      self.gate.release(EMPTY);
   }
}
