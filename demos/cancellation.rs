use func_pool::FuncPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();
  info!("--- Cancellation Example ---");

  // The pool imposes no timeout; a deadline is just a parent token cancelled by a timer.
  let parent = CancellationToken::new();
  let deadline = parent.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(300)).await;
    info!("Deadline reached, cancelling parent context.");
    deadline.cancel();
  });

  let pool = FuncPool::new(parent, 3, 3, Handle::current(), "cancellation_pool");
  pool.start().expect("Pool start failed");

  let cancelled = Arc::new(AtomicUsize::new(0));
  for i in 0..3u64 {
    let cancelled = cancelled.clone();
    let task = Arc::new(move |ctx: CancellationToken| {
      let cancelled = cancelled.clone();
      async move {
        tokio::select! {
          _ = ctx.cancelled() => {
            info!("Task {} observed cancellation.", i);
            cancelled.fetch_add(1, Ordering::SeqCst);
          }
          _ = tokio::time::sleep(Duration::from_secs(10 + i)) => {
            info!("Task {} ran to completion.", i);
          }
        }
      }
    });
    pool.submit(task).await.expect("Submit failed");
  }

  while pool.has_results() {
    pool.recv_result().await.expect("Result channel closed");
  }
  pool.stop().await.expect("Pool stop failed");

  info!("{} of 3 tasks were cancelled.", cancelled.load(Ordering::SeqCst));
  info!("--- Cancellation Example End ---");
}
