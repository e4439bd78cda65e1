use func_pool::FuncPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;

async fn my_task_fn(id: usize, delay_ms: u64) {
  info!("Task {} starting, will sleep for {}ms", id, delay_ms);
  tokio::time::sleep(Duration::from_millis(delay_ms)).await;
  info!("Task {} finished after {}ms", id, delay_ms);
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();

  info!("--- Basic Usage Example ---");

  let pool = FuncPool::new(
    CancellationToken::new(),
    2,  // Workers
    10, // Result buffer
    Handle::current(),
    "basic_pool",
  );
  pool.start().expect("Pool start failed");

  for i in 0..5usize {
    let sleep_duration: u64 = 500 + (i as u64 % 3 * 250);
    let task = Arc::new(move |_ctx: CancellationToken| my_task_fn(i, sleep_duration));
    match pool.submit(task).await {
      Ok(()) => info!("Submitted task {}", i),
      Err(e) => tracing::error!("Failed to submit task {}: {:?}", i, e),
    }
  }

  info!("All tasks submitted. Draining completions...");
  let mut completions = 0;
  while pool.has_results() {
    pool.recv_result().await.expect("Result channel closed");
    completions += 1;
    info!("Completion {} received. Stats: {:?}", completions, pool.stats());
  }

  pool.stop().await.expect("Pool stop failed");
  info!("Pool stopped after {} completions.", completions);
  info!("--- Basic Usage Example End ---");
}
