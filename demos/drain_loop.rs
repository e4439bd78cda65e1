use func_pool::{FuncPool, PoolConfig, PoolTask, TaskFuture};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;

// Records its own outcome; the pool never sees it.
#[derive(Debug, Default)]
struct ParityCheck {
  value: u64,
  outcome: Mutex<Option<Result<&'static str, String>>>,
}

impl PoolTask for ParityCheck {
  fn call(&self, _ctx: CancellationToken) -> TaskFuture<'_> {
    Box::pin(async move {
      let outcome = if self.value % 2 == 0 {
        Ok("even")
      } else {
        Err(format!("{} is odd", self.value))
      };
      *self.outcome.lock() = Some(outcome);
    })
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .with_target(false)
    .init();
  info!("--- Drain Loop Example ---");

  let size = 1_000u64;
  let config = PoolConfig::default()
    .with_name("drain_loop_pool")
    .with_result_buffer(size as usize);
  let pool = FuncPool::with_config(CancellationToken::new(), config, Handle::current());
  pool.start().expect("Pool start failed");

  let mut checks = Vec::with_capacity(size as usize);
  for value in 0..size {
    let check = Arc::new(ParityCheck {
      value,
      ..Default::default()
    });
    pool.submit(check.clone()).await.expect("Submit failed");
    checks.push(check);
  }

  let mut drained = 0;
  while pool.has_results() {
    pool.recv_result().await.expect("Result channel closed");
    drained += 1;
  }
  pool.stop().await.expect("Pool stop failed");

  let failed = checks
    .iter()
    .filter(|c| matches!(*c.outcome.lock(), Some(Err(_))))
    .count();
  info!(
    "Drained {} completions on {} workers: {} succeeded, {} failed.",
    drained,
    pool.worker_count(),
    drained - failed,
    failed
  );
  info!("--- Drain Loop Example End ---");
}
