//! The failure half of an [`Outcome`](crate::Outcome).
//!
//! A [`Failure`] is a shared, type-erased handle to any error. Cloning it is
//! a reference count bump, so a finalized outcome can hand the very same
//! failure to every caller. Causes stay reachable through
//! [`std::error::Error::source`] and [`Failure::chain`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A cloneable, chainable failure value.
#[derive(Clone)]
pub struct Failure(Arc<dyn StdError + Send + Sync + 'static>);

impl Failure {
   /// Wraps any error.
   pub fn new<E>(error: E) -> Self
   where
      E: StdError + Send + Sync + 'static,
   {
      Self(Arc::new(error))
   }

   /// Takes over an already boxed error without wrapping it again.
   pub fn from_boxed(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
      Self(Arc::from(error))
   }

   /// A failure that is nothing but a message.
   pub fn msg(message: impl Into<String>) -> Self {
      Self::new(MessageFailure(message.into()))
   }

   /// Joins two failures, keeping both causes. Nested joins are flattened.
   pub fn join(first: Failure, second: Failure) -> Self {
      let mut failures = Vec::with_capacity(2);
      for failure in [first, second] {
         match failure.downcast_ref::<JoinedFailure>() {
            Some(joined) => failures.extend(joined.failures.iter().cloned()),
            None => failures.push(failure),
         }
      }
      Self::new(JoinedFailure { failures })
   }

   /// Returns the wrapped error if it has type `E`.
   pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
      self.0.downcast_ref::<E>()
   }

   /// Whether the wrapped error has type `E`.
   pub fn is<E: StdError + 'static>(&self) -> bool {
      self.0.is::<E>()
   }

   /// The wrapped error followed by its chain of sources.
   pub fn chain(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
      let head: &(dyn StdError + 'static) = &*self.0;
      std::iter::successors(Some(head), |&e| e.source())
   }

   /// Whether both handles point at the same failure.
   pub fn ptr_eq(&self, other: &Self) -> bool {
      Arc::ptr_eq(&self.0, &other.0)
   }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for Failure {
   fn from(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
      Self::from_boxed(error)
   }
}

impl fmt::Display for Failure {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      fmt::Display::fmt(&*self.0, f)
   }
}

impl fmt::Debug for Failure {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      fmt::Debug::fmt(&*self.0, f)
   }
}

impl StdError for Failure {
   fn source(&self) -> Option<&(dyn StdError + 'static)> {
      self.0.source()
   }
}

/// A failure carrying only text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MessageFailure(pub String);

/// Several failures reported as one, in order.
///
/// Rendered one cause per line. [`source`](StdError::source) yields the
/// first cause; [`failures`](Self::failures) yields all of them.
#[derive(Debug, Clone)]
pub struct JoinedFailure {
   failures: Vec<Failure>,
}

impl JoinedFailure {
   /// Every joined cause, in order.
   pub fn failures(&self) -> &[Failure] {
      &self.failures
   }
}

impl fmt::Display for JoinedFailure {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      for (i, failure) in self.failures.iter().enumerate() {
         if i > 0 {
            f.write_str("\n")?;
         }
         fmt::Display::fmt(failure, f)?;
      }
      Ok(())
   }
}

impl StdError for JoinedFailure {
   fn source(&self) -> Option<&(dyn StdError + 'static)> {
      self.failures.first().map(|f| f as &(dyn StdError + 'static))
   }
}
