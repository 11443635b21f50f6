//! Advisory cancellation passed through to producers.
//!
//! A [`LazyPacker`](crate::LazyPacker) never looks at the context it is
//! handed; it only forwards it. Producers that run long may poll
//! [`Context::is_cancelled`] or [`Context::check`], or await
//! [`Context::cancelled`], and bail out with a failure of their own.

use std::future::{self, Future};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Returned by [`Context::check`] once the context is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("context cancelled")]
pub struct Cancelled;

/// A cheaply cloneable cancellation handle built on a
/// [`CancellationToken`].
///
/// The background context has no token and can never be cancelled. Contexts
/// derived with [`with_cancel`](Self::with_cancel) hold a child token: their
/// [`Canceller`] cancels them and their descendants, and the cancellation of
/// any ancestor reaches them too.
#[derive(Debug, Clone, Default)]
pub struct Context {
   token: Option<CancellationToken>,
}

impl Context {
   /// The root context.
   #[inline]
   pub const fn background() -> Self {
      Self { token: None }
   }

   /// Derives a child context together with the handle that cancels it.
   pub fn with_cancel(&self) -> (Self, Canceller) {
      let token = match &self.token {
         Some(parent) => parent.child_token(),
         None => CancellationToken::new(),
      };
      let canceller = Canceller {
         token: token.clone(),
      };
      (Self { token: Some(token) }, canceller)
   }

   #[inline]
   pub fn is_cancelled(&self) -> bool {
      self.token.as_ref().is_some_and(CancellationToken::is_cancelled)
   }

   /// `Err(Cancelled)` once the context is cancelled.
   #[inline]
   pub fn check(&self) -> Result<(), Cancelled> {
      if self.is_cancelled() {
         Err(Cancelled)
      } else {
         Ok(())
      }
   }

   /// Resolves once the context is cancelled. Never resolves for the
   /// background context.
   pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
      let token = self.token.clone();
      async move {
         match token {
            Some(token) => token.cancelled_owned().await,
            None => future::pending().await,
         }
      }
   }

   /// The underlying token, for handing to code that speaks tokio-util.
   /// `None` for the background context.
   #[inline]
   pub fn token(&self) -> Option<&CancellationToken> {
      self.token.as_ref()
   }
}

/// Cancels the context it was created with, and every context derived from it.
///
/// Dropping a `Canceller` does not cancel anything.
#[derive(Debug)]
pub struct Canceller {
   token: CancellationToken,
}

impl Canceller {
   pub fn cancel(&self) {
      self.token.cancel();
   }
}
