use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::stats::PoolStats;
use crate::task::{Completion, PoolTask};

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use futures::future::{self, FutureExt};
use kanal::{AsyncReceiver, AsyncSender};
use parking_lot::Mutex;
use tokio::runtime::Handle as TokioHandle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, trace, warn, Instrument};

type SharedTask = Arc<dyn PoolTask>;

/// A fixed set of workers fed through a rendezvous channel.
///
/// Lifecycle: [`new`](Self::new), [`start`](Self::start) once, any number of
/// [`submit`](Self::submit) calls, then [`stop`](Self::stop) once. Every task
/// that runs publishes exactly one [`Completion`] which the caller takes with
/// [`recv_result`](Self::recv_result). The usual pattern is submit-then-drain:
///
/// ```text
/// while pool.has_results() {
///   pool.recv_result().await?;
/// }
/// ```
pub struct FuncPool {
  pool_name: Arc<String>,
  ctx: CancellationToken,
  workers: usize,
  result_capacity: usize,
  tokio_handle: TokioHandle,
  // `None` once stopped. Dropping the last sender is what ends the worker loops.
  intake_tx: Mutex<Option<AsyncSender<SharedTask>>>,
  intake_rx: AsyncReceiver<SharedTask>,
  results_tx: AsyncSender<Completion>,
  results_rx: AsyncReceiver<Completion>,
  stats: Arc<Mutex<PoolStats>>,
  started: AtomicBool,
  worker_join_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for FuncPool {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FuncPool")
      .field("pool_name", &self.pool_name)
      .field("workers", &self.workers)
      .field("result_capacity", &self.result_capacity)
      .field("started", &self.is_started())
      .field("stopped", &self.is_stopped())
      .field("stats", &self.stats())
      .finish_non_exhaustive()
  }
}

impl FuncPool {
  /// Creates a pool of `workers` workers whose result buffer holds
  /// `result_buffer` completion tokens. No worker runs until [`start`](Self::start).
  ///
  /// `ctx` is the parent of every per-task token: cancelling it cancels every
  /// task currently running.
  pub fn new(
    ctx: CancellationToken,
    workers: usize,
    result_buffer: usize,
    tokio_handle: TokioHandle,
    pool_name: &str,
  ) -> Arc<Self> {
    Self::with_config(ctx, PoolConfig::new(pool_name, workers, result_buffer), tokio_handle)
  }

  pub fn with_config(ctx: CancellationToken, config: PoolConfig, tokio_handle: TokioHandle) -> Arc<Self> {
    let (intake_tx, intake_rx) = kanal::bounded_async::<SharedTask>(0);
    let (results_tx, results_rx) = kanal::bounded_async::<Completion>(config.result_buffer);

    if config.workers == 0 {
      warn!(pool_name = %config.name, "Pool created with zero workers. Submitted tasks will never run.");
    }
    debug!(
      pool_name = %config.name,
      workers = config.workers,
      result_buffer = config.result_buffer,
      "Pool created."
    );

    Arc::new(Self {
      pool_name: Arc::new(config.name),
      ctx,
      workers: config.workers,
      result_capacity: config.result_buffer,
      tokio_handle,
      intake_tx: Mutex::new(Some(intake_tx)),
      intake_rx,
      results_tx,
      results_rx,
      stats: Arc::new(Mutex::new(PoolStats::default())),
      started: AtomicBool::new(false),
      worker_join_handles: Mutex::new(Vec::new()),
    })
  }

  pub fn name(&self) -> &str {
    &self.pool_name
  }

  pub fn worker_count(&self) -> usize {
    self.workers
  }

  pub fn result_capacity(&self) -> usize {
    self.result_capacity
  }

  /// The parent token every task context is derived from.
  pub fn context(&self) -> &CancellationToken {
    &self.ctx
  }

  pub fn is_started(&self) -> bool {
    self.started.load(AtomicOrdering::Acquire)
  }

  pub fn is_stopped(&self) -> bool {
    self.intake_tx.lock().is_none()
  }

  /// Returns a snapshot of the pool's counters.
  pub fn stats(&self) -> PoolStats {
    *self.stats.lock()
  }

  /// Returns the number of completion tokens currently sitting in the result buffer.
  pub fn queued_results(&self) -> usize {
    self.results_rx.len()
  }

  /// Spawns the worker loops on the pool's runtime handle.
  ///
  /// # Errors
  /// Returns `PoolError::AlreadyStarted` on a second call and
  /// `PoolError::PoolStopped` if the pool was already stopped.
  pub fn start(&self) -> Result<(), PoolError> {
    if self.is_stopped() {
      warn!(pool_name = %*self.pool_name, "Start: Pool already stopped, refusing to spawn workers.");
      return Err(PoolError::PoolStopped);
    }
    if self.started.swap(true, AtomicOrdering::AcqRel) {
      warn!(pool_name = %*self.pool_name, "Start: Workers already started.");
      return Err(PoolError::AlreadyStarted);
    }

    let mut handles = self.worker_join_handles.lock();
    for worker_id in 0..self.workers {
      let worker_loop = Self::run_worker_loop(
        self.pool_name.clone(),
        self.intake_rx.clone(),
        self.results_tx.clone(),
        self.stats.clone(),
        self.ctx.clone(),
      )
      .instrument(info_span!("func_pool_worker", pool_name = %*self.pool_name, worker_id));
      handles.push(self.tokio_handle.spawn(worker_loop));
    }

    info!(
      pool_name = %*self.pool_name,
      workers = self.workers,
      result_buffer = self.result_capacity,
      "Pool started."
    );
    Ok(())
  }

  /// Hands `task` to a free worker, waiting until one takes it.
  ///
  /// Tasks submitted from one sequence reach the workers in that order. They
  /// may finish in any order.
  ///
  /// The task is counted before the handoff. Dropping the returned future
  /// before it resolves leaves the task counted but never run, so the pool
  /// will keep reporting pending results.
  ///
  /// # Errors
  /// Returns `PoolError::PoolStopped` if [`stop`](Self::stop) has been called.
  /// The counters are left untouched in that case.
  pub async fn submit(&self, task: Arc<dyn PoolTask>) -> Result<(), PoolError> {
    let intake_tx = self.intake_tx.lock().clone();
    let intake_tx = match intake_tx {
      Some(tx) => tx,
      None => {
        warn!(pool_name = %*self.pool_name, "Submit: Attempted to submit task to a stopped pool.");
        return Err(PoolError::PoolStopped);
      }
    };

    let submitted = {
      let mut stats = self.stats.lock();
      stats.submitted += 1;
      stats.submitted
    };
    trace!(pool_name = %*self.pool_name, submitted, "Submit: Task counted, waiting for a free worker.");

    if let Err(send_error) = intake_tx.send(task).await {
      error!(
        pool_name = %*self.pool_name,
        submitted,
        "Submit: Failed to hand task to a worker: {:?}",
        send_error
      );
      return Err(PoolError::PoolStopped);
    }
    Ok(())
  }

  /// Reports whether any submitted task's completion token is still to be consumed,
  /// either because it sits in the result buffer or because the task has not
  /// published it yet.
  ///
  /// This is a snapshot. It is only a reliable "drained" signal when nothing is
  /// submitting concurrently.
  pub fn has_results(&self) -> bool {
    // Tokens are counted as they are taken out, so a drainer that consumed the
    // last token ahead of the worker's `completed` increment still sees `false`.
    self.stats.lock().has_pending()
  }

  /// Waits for one completion token.
  ///
  /// # Errors
  /// Returns `PoolError::ResultChannelClosed` if the result channel was torn down.
  pub async fn recv_result(&self) -> Result<Completion, PoolError> {
    match self.results_rx.recv().await {
      Ok(token) => {
        self.count_received();
        Ok(token)
      }
      Err(receive_error) => {
        error!(pool_name = %*self.pool_name, "Result receive error: {:?}", receive_error);
        Err(PoolError::ResultChannelClosed)
      }
    }
  }

  /// Takes one completion token if one is buffered, without waiting.
  pub fn try_recv_result(&self) -> Result<Option<Completion>, PoolError> {
    match self.results_rx.try_recv() {
      Ok(Some(token)) => {
        self.count_received();
        Ok(Some(token))
      }
      Ok(None) => Ok(None),
      Err(receive_error) => {
        error!(pool_name = %*self.pool_name, "Result try_recv error: {:?}", receive_error);
        Err(PoolError::ResultChannelClosed)
      }
    }
  }

  fn count_received(&self) {
    let received = {
      let mut stats = self.stats.lock();
      stats.received += 1;
      stats.received
    };
    trace!(pool_name = %*self.pool_name, received, "Completion token consumed.");
  }

  /// Closes the task intake and waits for every worker loop to exit.
  ///
  /// Workers finish the task they hold before exiting. Completion tokens that
  /// were already published stay available through [`recv_result`](Self::recv_result).
  /// A worker blocked on a full result buffer keeps `stop` waiting until that
  /// token is consumed.
  ///
  /// # Errors
  /// Returns `PoolError::AlreadyStopped` on a second call.
  pub async fn stop(&self) -> Result<(), PoolError> {
    let intake_tx = self.intake_tx.lock().take();
    match intake_tx {
      Some(tx) => {
        info!(pool_name = %*self.pool_name, "Stopping pool: closing task intake.");
        drop(tx);
      }
      None => {
        warn!(pool_name = %*self.pool_name, "Stop: Pool already stopped.");
        return Err(PoolError::AlreadyStopped);
      }
    }

    let handles = std::mem::take(&mut *self.worker_join_handles.lock());
    info!(pool_name = %*self.pool_name, workers = handles.len(), "Waiting for worker loops to join.");
    for handle in handles {
      if let Err(join_error) = handle.await {
        error!(pool_name = %*self.pool_name, "Error joining worker loop during stop: {:?}", join_error);
      }
    }

    let stats = self.stats();
    info!(
      pool_name = %*self.pool_name,
      submitted = stats.submitted,
      completed = stats.completed,
      unconsumed = stats.unconsumed(),
      "Pool stopped."
    );
    Ok(())
  }

  async fn run_worker_loop(
    pool_name: Arc<String>,
    intake_rx: AsyncReceiver<SharedTask>,
    results_tx: AsyncSender<Completion>,
    stats: Arc<Mutex<PoolStats>>,
    parent_ctx: CancellationToken,
  ) {
    debug!(pool_name = %*pool_name, "Worker loop started.");

    while let Ok(task) = intake_rx.recv().await {
      let task_ctx = parent_ctx.child_token();
      trace!(pool_name = %*pool_name, "Received task, invoking.");

      // `call` itself runs inside the guarded future so a panic while building
      // the task's future is caught too.
      let call_ctx = task_ctx.clone();
      let outcome = AssertUnwindSafe(future::lazy(|_| task.call(call_ctx)).flatten())
        .catch_unwind()
        .await;
      task_ctx.cancel();
      drop(task);

      if outcome.is_err() {
        error!(pool_name = %*pool_name, "Task panicked during execution.");
      }

      if let Err(send_error) = results_tx.send(Completion).await {
        warn!(
          pool_name = %*pool_name,
          "Result receiver dropped, completion token lost: {:?}",
          send_error
        );
        continue;
      }

      let completed = {
        let mut stats = stats.lock();
        stats.completed += 1;
        stats.completed
      };
      debug!(pool_name = %*pool_name, completed, "Task finished, completion published.");
    }

    debug!(pool_name = %*pool_name, "Task intake closed. Worker loop stopped.");
  }
}

impl Drop for FuncPool {
  fn drop(&mut self) {
    if let Some(tx) = self.intake_tx.get_mut().take() {
      info!(
        pool_name = %*self.pool_name,
        "FuncPool dropped without stop. Closing task intake; workers will exit on their own."
      );
      drop(tx);
    } else {
      trace!(pool_name = %*self.pool_name, "Drop: Pool already stopped.");
    }
  }
}
