/// Snapshot of a pool's counters.
///
/// All three counters start at zero and only ever grow. At any observation
/// `completed <= submitted` holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
  /// Tasks accepted by `submit`.
  pub submitted: u64,
  /// Tasks whose completion token has been published.
  pub completed: u64,
  /// Completion tokens taken out of the pool by the caller.
  pub received: u64,
}

impl PoolStats {
  /// Tasks submitted but not yet completed.
  pub fn in_flight(&self) -> u64 {
    self.submitted.saturating_sub(self.completed)
  }

  /// Completion tokens published but not yet taken by the caller.
  pub fn unconsumed(&self) -> u64 {
    self.completed.saturating_sub(self.received)
  }

  /// True while at least one submitted task's token has not been consumed.
  pub fn has_pending(&self) -> bool {
    self.received < self.submitted
  }
}

#[cfg(test)]
mod tests {
  use super::PoolStats;

  #[test]
  fn fresh_stats_have_nothing_pending() {
    let stats = PoolStats::default();
    assert_eq!(stats.in_flight(), 0);
    assert_eq!(stats.unconsumed(), 0);
    assert!(!stats.has_pending());
  }

  #[test]
  fn in_flight_and_unconsumed_split_the_pending_work() {
    let stats = PoolStats {
      submitted: 10,
      completed: 7,
      received: 4,
    };
    assert_eq!(stats.in_flight(), 3);
    assert_eq!(stats.unconsumed(), 3);
    assert!(stats.has_pending());
  }

  #[test]
  fn pending_until_every_token_is_received() {
    let mut stats = PoolStats {
      submitted: 2,
      completed: 2,
      received: 1,
    };
    assert_eq!(stats.in_flight(), 0);
    assert!(stats.has_pending());

    stats.received = 2;
    assert!(!stats.has_pending());
  }

  #[test]
  fn received_ahead_of_completed_does_not_underflow() {
    // A drainer can take a token before the publishing worker bumps `completed`.
    let stats = PoolStats {
      submitted: 1,
      completed: 0,
      received: 1,
    };
    assert_eq!(stats.unconsumed(), 0);
    assert_eq!(stats.in_flight(), 1);
    assert!(!stats.has_pending());
  }
}
