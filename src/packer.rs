//! The lazy memoization slot.
//!
//! A [`LazyPacker<T, P, M>`] holds at most one finalized [`Outcome<T>`]. The
//! first caller that finds it empty runs the producer `M` under the gate;
//! everyone racing with it waits on the gate and then reads the same stored
//! outcome. Once finalized, reads are a single atomic load.
//!
//! Failures finalize the slot just like values do. A failed packer stays
//! failed; callers that want another attempt need a fresh packer.

use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use crate::context::Context;
use crate::fault::catch_fault;
use crate::optional::Optional;
use crate::outcome::Outcome;
use crate::producer::Producer;
use crate::slot::Slot;

/// A thread-safe slot that produces its value at most once.
///
/// The slot moves from empty to finalized exactly once, either by running the
/// producer ([`pack`](Self::pack), [`touch`](Self::touch)) or by injection
/// ([`set`](Self::set)). Whichever gets there first wins; the other never
/// happens. Panics raised by the producer are stored as failures and never
/// reach the caller.
///
/// `LazyPacker` is deliberately not `Clone`: a copy would be a second,
/// unrelated memoization domain. Share it by reference, in a `static`, or
/// behind an `Arc`.
pub struct LazyPacker<T, P, M> {
   slot: Slot<Outcome<T>>,
   _producer: PhantomData<fn(P) -> M>,
}

impl<T, P, M> LazyPacker<T, P, M> {
   /// Creates an empty packer.
   #[inline]
   #[must_use]
   pub const fn new() -> Self {
      Self {
         slot: Slot::new(),
         _producer: PhantomData,
      }
   }

   /// Creates a packer that is already finalized with `value`.
   #[inline]
   #[must_use]
   pub const fn with_value(value: T) -> Self {
      Self::with_outcome(Outcome::of_value(value))
   }

   /// Creates a packer that is already finalized with `outcome`.
   #[inline]
   #[must_use]
   pub const fn with_outcome(outcome: Outcome<T>) -> Self {
      Self {
         slot: Slot::with_value(outcome),
         _producer: PhantomData,
      }
   }

   /// Whether the outcome has been stored. Never blocks.
   #[inline]
   pub fn is_finalized(&self) -> bool {
      self.slot.is_finalized()
   }

   /// Returns the stored outcome, or an empty [`Optional`] if there is none
   /// yet. Never blocks and never runs the producer.
   #[inline]
   pub fn try_get_result(&self) -> Optional<&Outcome<T>> {
      Optional::from_option(self.slot.get())
   }

   /// Injects `value` as a successful outcome if nothing has been stored yet.
   ///
   /// Returns `false` without touching the packer if it is already finalized,
   /// or if another caller finalizes it while this one waits for the gate;
   /// `value` is dropped in that case.
   pub fn set(&self, value: T) -> bool {
      match self.slot.try_finalize(Outcome::of_value(value)) {
         Ok(_) => {
            tracing::trace!("packer finalized by injection");
            true
         }
         Err(_) => false,
      }
   }

   /// Consumes the packer, returning its outcome if it was finalized.
   #[inline]
   pub fn into_outcome(self) -> Optional<Outcome<T>> {
      Optional::from_option(self.slot.into_inner())
   }
}

impl<T, P, M: Producer<T, P>> LazyPacker<T, P, M> {
   /// Returns the stored outcome, producing it first if needed.
   ///
   /// If the packer is finalized this is a lock-free read. Otherwise the
   /// caller takes the gate, checks again, and if the slot is still empty
   /// runs `M::produce(ctx, param)` and stores whatever it returns, or the
   /// failure it panicked with. Callers arriving meanwhile block on the gate
   /// and return the same outcome.
   ///
   /// `ctx` is only forwarded; the packer never interrupts a running
   /// producer.
   #[inline]
   pub fn pack(&self, ctx: &Context, param: P) -> &Outcome<T> {
      self.slot.get_or_finalize(|| Self::produce(ctx, param))
   }

   /// Async version of [`pack`](Self::pack).
   ///
   /// Waits for a concurrent production by suspending the task instead of
   /// parking the thread, so it is safe on a current-thread runtime. The
   /// producer itself still runs inline on the polling task.
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   pub async fn pack_async(&self, ctx: &Context, param: P) -> &Outcome<T> {
      self
         .slot
         .get_or_finalize_async(|| Self::produce(ctx, param))
         .await
   }

   fn produce(ctx: &Context, param: P) -> Outcome<T> {
      let outcome = catch_fault(|| M::produce(ctx, param));
      tracing::trace!(failed = outcome.is_failure(), "producer finished");
      outcome
   }
}

impl<T, P, M> LazyPacker<T, P, M>
where
   T: Send + Sync + 'static,
   P: Send + 'static,
   M: Producer<T, P> + 'static,
{
   /// Starts production in the background and returns immediately.
   ///
   /// Does nothing if the packer is already finalized. Otherwise the work is
   /// handed to the tokio blocking pool when called inside a runtime, or to
   /// a detached thread. The background work is exactly a [`pack`](Self::pack)
   /// call; its outcome is only observable through the packer afterwards.
   pub fn touch(self: &Arc<Self>, ctx: Context, param: P) {
      if self.is_finalized() {
         return;
      }
      let packer = Arc::clone(self);
      spawn_detached(move || {
         packer.pack(&ctx, param);
      });
   }
}

fn spawn_detached<F>(work: F)
where
   F: FnOnce() + Send + 'static,
{
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   {
      if let Ok(handle) = tokio::runtime::Handle::try_current() {
         tracing::debug!("touch scheduled on the blocking pool");
         drop(handle.spawn_blocking(work));
         return;
      }
   }

   match std::thread::Builder::new()
      .name("lazy-packer-touch".into())
      .spawn(work)
   {
      Ok(_) => tracing::debug!("touch scheduled on a detached thread"),
      // Nothing is lost: the next `pack` produces inline.
      Err(error) => tracing::warn!(%error, "failed to spawn touch thread"),
   }
}

impl<T, P, M> Default for LazyPacker<T, P, M> {
   #[inline]
   fn default() -> Self {
      Self::new()
   }
}

impl<T, P, M> From<Outcome<T>> for LazyPacker<T, P, M> {
   #[inline]
   fn from(outcome: Outcome<T>) -> Self {
      Self::with_outcome(outcome)
   }
}

impl<T: fmt::Debug, P, M> fmt::Debug for LazyPacker<T, P, M> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_tuple("LazyPacker").field(&self.slot).finish()
   }
}
