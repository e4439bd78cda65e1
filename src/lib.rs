//! A Tokio-based pool of a fixed number of workers, fed through a rendezvous
//! channel, running each task under its own cancellable context and
//! publishing one completion token per finished task.
//!
//! ```
//! use std::sync::Arc;
//! use func_pool::FuncPool;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), func_pool::PoolError> {
//! let pool = FuncPool::new(CancellationToken::new(), 2, 16, tokio::runtime::Handle::current(), "docs");
//! pool.start()?;
//!
//! for i in 0..4u64 {
//!   pool.submit(Arc::new(move |_ctx: CancellationToken| async move {
//!     let _ = i * 2;
//!   })).await?;
//! }
//!
//! while pool.has_results() {
//!   pool.recv_result().await?;
//! }
//! pool.stop().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod pool;
mod stats;
mod task;

pub use config::PoolConfig;
pub use error::PoolError;
pub use pool::FuncPool;
pub use stats::PoolStats;
pub use task::{Completion, PoolTask, TaskFuture};
