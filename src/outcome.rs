//! The outcome of a single production: a value or a failure.

use core::fmt;
use std::error::Error as StdError;

use crate::failure::Failure;

/// The result of one operation that either produced a `T` or failed.
///
/// When a failure is recorded it takes precedence over any value that is
/// also present. An `Outcome` is immutable once built.
#[derive(Clone)]
pub struct Outcome<T>(Inner<T>);

#[derive(Clone)]
enum Inner<T> {
   Value(T),
   Failed { partial: Option<T>, failure: Failure },
}

impl<T> Outcome<T> {
   #[inline]
   pub const fn of_value(value: T) -> Self {
      Self(Inner::Value(value))
   }

   #[inline]
   pub const fn of_failure(failure: Failure) -> Self {
      Self(Inner::Failed {
         partial: None,
         failure,
      })
   }

   /// A failed outcome that still carries a partial value.
   ///
   /// The value stays reachable through [`into_parts`](Self::into_parts) but
   /// every other accessor treats the outcome as failed.
   #[inline]
   pub const fn with_failure(value: T, failure: Failure) -> Self {
      Self(Inner::Failed {
         partial: Some(value),
         failure,
      })
   }

   #[inline]
   pub const fn is_failure(&self) -> bool {
      matches!(self.0, Inner::Failed { .. })
   }

   #[inline]
   pub const fn failure(&self) -> Option<&Failure> {
      match &self.0 {
         Inner::Value(_) => None,
         Inner::Failed { failure, .. } => Some(failure),
      }
   }

   /// The value, if the outcome succeeded.
   #[inline]
   pub const fn value(&self) -> Option<&T> {
      match &self.0 {
         Inner::Value(value) => Some(value),
         Inner::Failed { .. } => None,
      }
   }

   /// The value, or `default` if the outcome failed.
   #[inline]
   pub fn value_or(self, default: T) -> T {
      match self.0 {
         Inner::Value(value) => value,
         Inner::Failed { .. } => default,
      }
   }

   /// Splits into the raw value (`T::default()` if none was recorded) and
   /// the failure, if any.
   #[inline]
   pub fn into_parts(self) -> (T, Option<Failure>)
   where
      T: Default,
   {
      match self.0 {
         Inner::Value(value) => (value, None),
         Inner::Failed { partial, failure } => (partial.unwrap_or_default(), Some(failure)),
      }
   }

   #[inline]
   pub const fn as_result(&self) -> Result<&T, &Failure> {
      match &self.0 {
         Inner::Value(value) => Ok(value),
         Inner::Failed { failure, .. } => Err(failure),
      }
   }

   #[inline]
   pub fn into_result(self) -> Result<T, Failure> {
      match self.0 {
         Inner::Value(value) => Ok(value),
         Inner::Failed { failure, .. } => Err(failure),
      }
   }

   /// Copies a successful value into `target`; leaves it alone on failure.
   #[inline]
   pub fn assign_to(&self, target: &mut T) -> bool
   where
      T: Clone,
   {
      match self.value() {
         Some(value) => {
            target.clone_from(value);
            true
         }
         None => false,
      }
   }
}

impl<T, E> From<Result<T, E>> for Outcome<T>
where
   E: StdError + Send + Sync + 'static,
{
   fn from(result: Result<T, E>) -> Self {
      match result {
         Ok(value) => Self::of_value(value),
         Err(error) => Self::of_failure(Failure::new(error)),
      }
   }
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self.as_result() {
         Ok(value) => f.debug_tuple("Success").field(value).finish(),
         Err(failure) => f.debug_tuple("Error").field(failure).finish(),
      }
   }
}

impl<T: fmt::Display> fmt::Display for Outcome<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self.as_result() {
         Ok(value) => write!(f, "Success({value})"),
         Err(failure) => write!(f, "Error({failure})"),
      }
   }
}

/// Successful outcomes compare by value. Failed outcomes are equal only when
/// they share the same [`Failure`] and the same partial value.
impl<T: PartialEq> PartialEq for Outcome<T> {
   fn eq(&self, other: &Self) -> bool {
      match (&self.0, &other.0) {
         (Inner::Value(a), Inner::Value(b)) => a == b,
         (
            Inner::Failed {
               partial: pa,
               failure: fa,
            },
            Inner::Failed {
               partial: pb,
               failure: fb,
            },
         ) => fa.ptr_eq(fb) && pa == pb,
         _ => false,
      }
   }
}
