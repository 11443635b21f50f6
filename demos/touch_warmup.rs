use std::sync::Arc;
use std::time::{Duration, Instant};

use lazy_packer::{Context, Failure, LazyPacker, Outcome, Producer};

struct SlowSquare;

impl Producer<u64, u64> for SlowSquare {
   fn produce(ctx: &Context, n: u64) -> Outcome<u64> {
      for _ in 0..10 {
         if let Err(cancelled) = ctx.check() {
            return Outcome::of_failure(Failure::new(cancelled));
         }
         std::thread::sleep(Duration::from_millis(10));
      }
      Outcome::of_value(n * n)
   }
}

#[tokio::main]
async fn main() {
   let packer: Arc<LazyPacker<u64, u64, SlowSquare>> = Arc::new(LazyPacker::new());

   let started = Instant::now();
   packer.touch(Context::background(), 12);
   println!("touch returned after {:?}", started.elapsed());
   println!("peek right away: {}", packer.try_get_result());

   // Meanwhile, do other work...
   tokio::time::sleep(Duration::from_millis(30)).await;

   let outcome = packer.pack_async(&Context::background(), 12).await;
   println!("pack returned {outcome} after {:?}", started.elapsed());
   assert_eq!(outcome.value(), Some(&144));
}
