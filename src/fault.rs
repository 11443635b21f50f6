//! Turning producer panics into ordinary failures.
//!
//! [`catch_fault`] runs a producer under `catch_unwind` and converts a panic
//! into a failed [`Outcome`] carrying a [`PanicFailure`]. The backtrace is
//! taken at the panic site by a process-wide panic hook that is installed on
//! first use and forwards every panic outside a guarded scope to whatever
//! hook was there before. Guarded panics are not printed; they are logged
//! through `tracing` once recovered.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use thiserror::Error;

use crate::failure::{Failure, MessageFailure};
use crate::outcome::Outcome;

thread_local! {
   /// Number of `catch_fault` frames active on this thread.
   static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
   /// Backtrace left behind by the last guarded panic on this thread.
   static FAULT_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
   HOOK.call_once(|| {
      let previous = panic::take_hook();
      panic::set_hook(Box::new(move |info| {
         let guarded = GUARD_DEPTH.try_with(|depth| depth.get() > 0).unwrap_or(false);
         if !guarded {
            previous(info);
            return;
         }
         let trace = Backtrace::force_capture().to_string();
         let _ = FAULT_TRACE.try_with(|slot| *slot.borrow_mut() = Some(trace));
      }));
   });
}

/// Marks the current thread as running guarded code until dropped.
struct FaultScope(());

impl FaultScope {
   fn enter() -> Self {
      GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
      Self(())
   }

   fn take_trace(&self) -> Option<String> {
      FAULT_TRACE.with(|slot| slot.borrow_mut().take())
   }
}

impl Drop for FaultScope {
   fn drop(&mut self) {
      let depth = GUARD_DEPTH.with(|depth| {
         let remaining = depth.get() - 1;
         depth.set(remaining);
         remaining
      });
      if depth == 0 {
         // A panic caught by someone else's catch_unwind inside the scope
         // leaves its trace behind.
         FAULT_TRACE.with(|slot| slot.borrow_mut().take());
      }
   }
}

/// A panic raised by a producer, recovered as a failure.
///
/// Renders as `panic [recovered]: <payload>` followed by the backtrace taken
/// where the panic happened. When the panic payload was itself an error
/// (a [`Failure`] passed to [`std::panic::panic_any`], or a boxed error), that
/// error is this failure's [`source`](StdError::source).
#[derive(Debug, Error)]
#[error("panic [recovered]: {message}\n{trace}")]
pub struct PanicFailure {
   message: String,
   trace: String,
   #[source]
   cause: Option<Failure>,
}

impl PanicFailure {
   /// Builds a failure from a `catch_unwind` payload and a rendered trace.
   pub fn new(payload: Box<dyn Any + Send>, trace: String) -> Self {
      let (message, cause) = describe(payload);
      Self {
         message,
         trace,
         cause,
      }
   }

   /// The panic payload, rendered.
   pub fn message(&self) -> &str {
      &self.message
   }

   /// The backtrace captured where the panic happened.
   pub fn trace(&self) -> &str {
      &self.trace
   }

   /// The error the panic was raised with, if it was raised with one.
   pub fn cause(&self) -> Option<&Failure> {
      self.cause.as_ref()
   }

   /// Converts into a [`Failure`], joined ahead of `prior` if there is one.
   pub fn into_failure(self, prior: Option<Failure>) -> Failure {
      let fault = Failure::new(self);
      match prior {
         Some(prior) => Failure::join(fault, prior),
         None => fault,
      }
   }
}

/// Hands the payload back unless it is one of `$ty`, rendered with `Display`.
macro_rules! render_displayable {
   ($payload:ident: $($ty:ty),+ $(,)?) => {
      $(
         let $payload = match $payload.downcast::<$ty>() {
            Ok(value) => return (value.to_string(), None),
            Err(payload) => payload,
         };
      )+
   };
}

fn describe(payload: Box<dyn Any + Send>) -> (String, Option<Failure>) {
   let payload = match payload.downcast::<&'static str>() {
      Ok(message) => return ((*message).to_owned(), None),
      Err(payload) => payload,
   };
   let payload = match payload.downcast::<String>() {
      Ok(message) => return (*message, None),
      Err(payload) => payload,
   };
   let payload = match payload.downcast::<Failure>() {
      Ok(failure) => return (failure.to_string(), Some(*failure)),
      Err(payload) => payload,
   };
   let payload = match payload.downcast::<Box<dyn StdError + Send + Sync + 'static>>() {
      Ok(error) => {
         let failure = Failure::from_boxed(*error);
         return (failure.to_string(), Some(failure));
      }
      Err(payload) => payload,
   };
   // Not `Sync`, so it cannot be kept as a cause; its text is.
   let payload = match payload.downcast::<Box<dyn StdError + Send + 'static>>() {
      Ok(error) => {
         let message = error.to_string();
         return (message.clone(), Some(Failure::new(MessageFailure(message))));
      }
      Err(payload) => payload,
   };
   render_displayable!(payload:
      i8, i16, i32, i64, i128, isize,
      u8, u16, u32, u64, u128, usize,
      f32, f64, bool, char,
   );
   drop(payload);
   ("Box<dyn Any>".to_owned(), None)
}

/// Stores `fault` in a failure slot.
///
/// An empty slot receives the fault alone. A slot that already holds a
/// failure ends up with a [`JoinedFailure`](crate::JoinedFailure) of the
/// fault followed by the earlier failure.
pub fn record_fault(slot: &mut Option<Failure>, fault: PanicFailure) {
   let prior = slot.take();
   *slot = Some(fault.into_failure(prior));
}

/// Runs `f`, turning a panic into a failed outcome.
///
/// Nothing `f` panics with escapes this call.
pub fn catch_fault<T, F>(f: F) -> Outcome<T>
where
   F: FnOnce() -> Outcome<T>,
{
   install_hook();
   let scope = FaultScope::enter();
   match panic::catch_unwind(AssertUnwindSafe(f)) {
      Ok(outcome) => outcome,
      Err(payload) => {
         let trace = scope
            .take_trace()
            .unwrap_or_else(|| Backtrace::force_capture().to_string());
         drop(scope);
         let fault = PanicFailure::new(payload, trace);
         tracing::warn!(payload = %fault.message(), "recovered panic in producer");
         Outcome::of_failure(fault.into_failure(None))
      }
   }
}
