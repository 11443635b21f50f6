//! The producer interface a [`LazyPacker`](crate::LazyPacker) drives.

use crate::context::Context;
use crate::outcome::Outcome;

/// Computes the value a [`LazyPacker`](crate::LazyPacker) memoizes.
///
/// The producer is chosen at the type level and never instantiated by the
/// packer, so it cannot carry state from one production to the next; whatever
/// a production needs arrives through `param`.
///
/// `produce` runs while the packer's gate is held. It must not call the
/// blocking operations (`pack`, `set`) of the packer it is producing for;
/// that deadlocks.
///
/// ```
/// use lazy_packer::{Context, LazyPacker, Outcome, Producer};
///
/// struct Length;
///
/// impl Producer<usize, &'static str> for Length {
///    fn produce(_ctx: &Context, param: &'static str) -> Outcome<usize> {
///       Outcome::of_value(param.len())
///    }
/// }
///
/// let packer = LazyPacker::<usize, &'static str, Length>::new();
/// assert_eq!(packer.pack(&Context::background(), "four").value(), Some(&4));
/// ```
pub trait Producer<T, P> {
   fn produce(ctx: &Context, param: P) -> Outcome<T>;
}
