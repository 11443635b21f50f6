//! A value that may or may not be present.

use core::fmt;

/// A value of type `T` that may be absent.
///
/// `Optional` is a plain value: clones are independent, and the mutating
/// methods take `&mut self`, so a change is only ever seen by the holder that
/// made it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Optional<T>(Option<T>);

impl<T> Optional<T> {
   /// Wraps an `Option`, present iff it is `Some`.
   #[inline]
   pub const fn from_option(value: Option<T>) -> Self {
      Self(value)
   }

   #[inline]
   pub const fn of(value: T) -> Self {
      Self(Some(value))
   }

   #[inline]
   pub const fn empty() -> Self {
      Self(None)
   }

   #[inline]
   pub const fn is_present(&self) -> bool {
      self.0.is_some()
   }

   /// Splits into the value (`T::default()` when absent) and a presence flag.
   #[inline]
   pub fn into_parts(self) -> (T, bool)
   where
      T: Default,
   {
      match self.0 {
         Some(value) => (value, true),
         None => (T::default(), false),
      }
   }

   /// The value, or `T::default()` when absent.
   #[inline]
   pub fn value(self) -> T
   where
      T: Default,
   {
      self.0.unwrap_or_default()
   }

   #[inline]
   pub fn value_or(self, default: T) -> T {
      self.0.unwrap_or(default)
   }

   #[inline]
   pub const fn get(&self) -> Option<&T> {
      self.0.as_ref()
   }

   #[inline]
   pub const fn as_ref(&self) -> Optional<&T> {
      Optional(self.0.as_ref())
   }

   #[inline]
   pub fn into_option(self) -> Option<T> {
      self.0
   }

   #[inline]
   pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Optional<U> {
      Optional(self.0.map(f))
   }

   /// Makes this holder present with `value`.
   #[inline]
   pub fn set(&mut self, value: T) {
      self.0 = Some(value);
   }

   /// Makes this holder absent.
   #[inline]
   pub fn clear(&mut self) {
      self.0 = None;
   }

   /// Copies the value into `target` when present. Returns whether it did.
   #[inline]
   pub fn assign_to(&self, target: &mut T) -> bool
   where
      T: Clone,
   {
      match &self.0 {
         Some(value) => {
            target.clone_from(value);
            true
         }
         None => false,
      }
   }
}

impl<T: Clone> Optional<&T> {
   #[inline]
   pub fn cloned(self) -> Optional<T> {
      Optional(self.0.cloned())
   }
}

impl<T> Default for Optional<T> {
   #[inline]
   fn default() -> Self {
      Self::empty()
   }
}

impl<T> From<Option<T>> for Optional<T> {
   #[inline]
   fn from(value: Option<T>) -> Self {
      Self::from_option(value)
   }
}

impl<T> From<Optional<T>> for Option<T> {
   #[inline]
   fn from(value: Optional<T>) -> Self {
      value.0
   }
}

impl<T: fmt::Display> fmt::Display for Optional<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match &self.0 {
         Some(value) => write!(f, "Ok({value})"),
         None => f.write_str("Nil"),
      }
   }
}
