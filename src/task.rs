use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

/// The future returned by a [`PoolTask`] invocation.
/// It must be `Send` and may borrow the task for the duration of the call.
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// A unit of work executed by a [`FuncPool`](crate::FuncPool).
///
/// The pool observes no return value. A task that needs to report an outcome
/// records it in its own state (behind a mutex or atomics) and the submitter,
/// which keeps its own `Arc` to the task, reads it once the completion token
/// for the task has been consumed.
///
/// `ctx` is a child of the pool's parent token, created for this invocation
/// only and cancelled as soon as the returned future completes. Tasks that run
/// for a while should watch it; the pool never interrupts a task on its own.
pub trait PoolTask: Send + Sync + 'static {
  fn call(&self, ctx: CancellationToken) -> TaskFuture<'_>;
}

impl<F, Fut> PoolTask for F
where
  F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = ()> + Send + 'static,
{
  fn call(&self, ctx: CancellationToken) -> TaskFuture<'_> {
    Box::pin(self(ctx))
  }
}

/// Content-free marker published once per finished task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Completion;
