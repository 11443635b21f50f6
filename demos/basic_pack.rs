use std::sync::atomic::{AtomicUsize, Ordering};

use lazy_packer::{Context, LazyPacker, Outcome, Producer};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

struct Greeting;

impl Producer<String, &'static str> for Greeting {
   fn produce(_ctx: &Context, name: &'static str) -> Outcome<String> {
      // This runs only once
      COUNTER.fetch_add(1, Ordering::Relaxed);
      println!("Producing greeting...");
      std::thread::sleep(std::time::Duration::from_millis(50));
      Outcome::of_value(format!("Hello, {name}"))
   }
}

static GREETING: LazyPacker<String, &'static str, Greeting> = LazyPacker::new();

fn main() {
   let threads: Vec<_> = ["alice", "bob", "carol", "dave", "erin"]
      .into_iter()
      .map(|name| {
         std::thread::spawn(move || {
            let outcome = GREETING.pack(&Context::background(), name);
            println!("{name} sees: {outcome}");
         })
      })
      .collect();

   for t in threads {
      t.join().unwrap();
   }

   assert_eq!(COUNTER.load(Ordering::Relaxed), 1); // Producer ran only once
   assert!(!GREETING.set("too late".to_string()));
   println!("Final: {}", GREETING.try_get_result().cloned());
}
