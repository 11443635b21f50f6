//! A thread-safe lazy memoization slot.
//!
//! [`LazyPacker<T, P, M>`] computes a value on demand by calling the producer
//! `M` with a parameter `P`, and remembers the [`Outcome`] forever after:
//!
//! - **At most once**: however many threads call [`pack`](LazyPacker::pack)
//!   at the same time, the producer runs at most once and all of them get the
//!   same stored outcome.
//! - **Failures stick**: a failed production is stored like a success and
//!   returned to every later caller. There is no retry.
//! - **Panics are contained**: a producer that panics leaves a
//!   [`PanicFailure`] behind instead of unwinding into the caller.
//! - **Injection**: [`set`](LazyPacker::set) stores a value directly if no
//!   production has happened, and then production never will.
//! - **Warm-up**: [`touch`](LazyPacker::touch) starts production in the
//!   background without waiting for it.
//!
//! Reading a finalized packer is a single atomic load. Threads that lose the
//! race to finalize park on a futex via `parking_lot_core` until the winner
//! publishes.
//!
//! # Features
//!
//! - `async-tokio`: adds [`pack_async`](LazyPacker::pack_async) and runs
//!   [`touch`](LazyPacker::touch) on the tokio blocking pool when a runtime is
//!   available.
//! - `async-tokio-mt` (default): `async-tokio` with the multi-threaded
//!   runtime enabled. `pack_async` behaves the same on either runtime flavor:
//!   a task waiting for another caller's production is suspended, never
//!   blocked.
//!
//! # Example
//!
//! ```rust
//! use lazy_packer::{Context, LazyPacker, Outcome, Producer};
//!
//! struct ParsePort;
//!
//! impl Producer<u16, &'static str> for ParsePort {
//!    fn produce(_ctx: &Context, raw: &'static str) -> Outcome<u16> {
//!       raw.parse::<u16>().into()
//!    }
//! }
//!
//! static PORT: LazyPacker<u16, &'static str, ParsePort> = LazyPacker::new();
//!
//! let ctx = Context::background();
//! assert_eq!(PORT.pack(&ctx, "8080").value(), Some(&8080));
//! // The first outcome is permanent; the new parameter is never looked at.
//! assert_eq!(PORT.pack(&ctx, "not a port").value(), Some(&8080));
//! assert!(!PORT.set(9090));
//! ```

/// Cancellation tokens forwarded to producers.
mod context;

/// Cloneable, chainable failures.
mod failure;

/// Panic-to-failure conversion.
mod fault;

/// Internal synchronization state.
mod gate;

/// Present-or-absent values.
mod optional;

/// Value-or-failure results.
mod outcome;

/// The memoization slot.
mod packer;

/// The producer interface.
mod producer;

/// Publish-once storage.
mod slot;

pub use context::{Cancelled, Canceller, Context};
pub use failure::{Failure, JoinedFailure, MessageFailure};
pub use fault::{catch_fault, record_fault, PanicFailure};
pub use optional::Optional;
pub use outcome::Outcome;
pub use packer::LazyPacker;
pub use producer::Producer;
