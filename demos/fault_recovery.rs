use lazy_packer::{Context, LazyPacker, Outcome, PanicFailure, Producer};

struct Divide;

impl Producer<i64, (i64, i64)> for Divide {
   fn produce(_ctx: &Context, (a, b): (i64, i64)) -> Outcome<i64> {
      // Panics when `b` is zero.
      Outcome::of_value(a / b)
   }
}

fn main() {
   let ctx = Context::background();
   let packer = LazyPacker::<i64, (i64, i64), Divide>::new();

   // The panic is stored as a failure instead of unwinding into main.
   let outcome = packer.pack(&ctx, (1, 0));
   let failure = outcome.failure().expect("division by zero must fail");
   let panic = failure
      .downcast_ref::<PanicFailure>()
      .expect("failure comes from a recovered panic");
   println!("Caught: {}", panic.message());

   // Failures are permanent; a valid parameter does not trigger a retry.
   let again = packer.pack(&ctx, (10, 2));
   assert!(again.is_failure());
   println!("Still failed: {}", again.is_failure());

   // A fresh packer is the only way to try again.
   let retry = LazyPacker::<i64, (i64, i64), Divide>::new();
   println!("Fresh packer: {}", retry.pack(&ctx, (10, 2)));
}
