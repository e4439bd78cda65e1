/// Construction parameters for a [`FuncPool`](crate::FuncPool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
  /// Name carried by every log event of the pool.
  pub name: String,
  /// Number of worker loops started by `start`. Fixed for the pool's lifetime.
  /// Zero is accepted but leaves the pool unable to run anything.
  pub workers: usize,
  /// Capacity of the completion-token buffer. Zero makes every publish wait
  /// for a receiver.
  pub result_buffer: usize,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      name: "func_pool".to_string(),
      workers: num_cpus::get(),
      result_buffer: 0,
    }
  }
}

impl PoolConfig {
  pub fn new(name: &str, workers: usize, result_buffer: usize) -> Self {
    Self {
      name: name.to_string(),
      workers,
      result_buffer,
    }
  }

  pub fn with_name(mut self, name: &str) -> Self {
    self.name = name.to_string();
    self
  }

  pub fn with_workers(mut self, workers: usize) -> Self {
    self.workers = workers;
    self
  }

  pub fn with_result_buffer(mut self, result_buffer: usize) -> Self {
    self.result_buffer = result_buffer;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::PoolConfig;

  #[test]
  fn default_sizes_workers_from_cpus() {
    let config = PoolConfig::default();
    assert_eq!(config.workers, num_cpus::get());
    assert_eq!(config.result_buffer, 0);
    assert_eq!(config.name, "func_pool");
  }

  #[test]
  fn setters_override_defaults() {
    let config = PoolConfig::default()
      .with_name("ingest")
      .with_workers(3)
      .with_result_buffer(64);
    assert_eq!(config, PoolConfig::new("ingest", 3, 64));
  }
}
