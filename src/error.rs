use thiserror::Error;

/// Errors that can occur within the `func_pool` pool.
///
/// These are all misuse errors reported to the caller at the point of misuse.
/// Failures inside a task are never surfaced here; a task records them in its
/// own state.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum PoolError {
  #[error("Pool has been stopped, cannot accept new tasks")]
  PoolStopped,

  #[error("Pool workers were already started")]
  AlreadyStarted,

  #[error("Pool was already stopped")]
  AlreadyStopped,

  #[error("Pool's result channel was closed unexpectedly")]
  ResultChannelClosed,
}
