use std::num::ParseIntError;

use lazy_packer::{Failure, MessageFailure, Outcome};

#[test]
fn test_of_value() {
   let outcome = Outcome::of_value(4);
   assert!(!outcome.is_failure());
   assert!(outcome.failure().is_none());
   assert_eq!(outcome.value(), Some(&4));
   assert!(matches!(outcome.as_result(), Ok(&4)));
   assert_eq!(outcome.clone().value_or(0), 4);
   assert_eq!(outcome.into_parts().0, 4);
}

#[test]
fn test_of_failure() {
   let outcome: Outcome<i32> = Outcome::of_failure(Failure::msg("bad"));
   assert!(outcome.is_failure());
   assert_eq!(outcome.value(), None);
   assert_eq!(outcome.failure().unwrap().to_string(), "bad");
   assert_eq!(outcome.clone().value_or(9), 9);

   let (value, failure) = outcome.into_parts();
   assert_eq!(value, 0);
   assert!(failure.unwrap().is::<MessageFailure>());
}

#[test]
fn test_failure_takes_precedence() {
   let outcome = Outcome::with_failure(5, Failure::msg("partial"));
   assert!(outcome.is_failure());
   assert_eq!(outcome.value(), None);
   assert_eq!(outcome.clone().value_or(1), 1);
   assert!(outcome.as_result().is_err());

   // The partial value is still there for whoever asks for the raw parts.
   let (value, failure) = outcome.into_parts();
   assert_eq!(value, 5);
   assert!(failure.is_some());
}

#[test]
fn test_from_result() {
   let ok: Outcome<i32> = "12".parse::<i32>().into();
   assert_eq!(ok.into_result().unwrap(), 12);

   let err: Outcome<i32> = "x".parse::<i32>().into();
   let failure = err.into_result().unwrap_err();
   assert!(failure.downcast_ref::<ParseIntError>().is_some());
}

#[test]
fn test_assign_to() {
   let mut target = String::from("old");
   let failed: Outcome<String> = Outcome::of_failure(Failure::msg("no"));
   assert!(!failed.assign_to(&mut target));
   assert_eq!(target, "old");

   assert!(Outcome::of_value(String::from("new")).assign_to(&mut target));
   assert_eq!(target, "new");
}

#[test]
fn test_eq() {
   assert_eq!(Outcome::of_value(1), Outcome::of_value(1));
   assert_ne!(Outcome::of_value(1), Outcome::of_value(2));

   let failure = Failure::msg("same");
   let a: Outcome<i32> = Outcome::of_failure(failure.clone());
   let b: Outcome<i32> = Outcome::of_failure(failure);
   assert_eq!(a, b);
   // Equal text is not the same failure.
   assert_ne!(a, Outcome::of_failure(Failure::msg("same")));
   assert_ne!(a, Outcome::of_value(0));
}

#[test]
fn test_display_and_debug() {
   assert_eq!(Outcome::of_value(3).to_string(), "Success(3)");
   let failed: Outcome<i32> = Outcome::of_failure(Failure::msg("oops"));
   assert_eq!(failed.to_string(), "Error(oops)");
   assert_eq!(format!("{:?}", Outcome::of_value(3)), "Success(3)");
}
