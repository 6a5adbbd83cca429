//! Debounced input for search-as-you-type.

use std::time::Duration;
use tokio::time::Instant;

/// Cap for deadlines that would not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Debounced value: keystrokes land in `input`, and `value` catches up
/// once the input has been left alone for `delay`.
///
/// An explicit `submit()` skips the wait.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
  input: T,
  effective: T,
  delay: Duration,
  deadline: Option<Instant>,
}

impl<T: Clone + PartialEq> Debounced<T> {
  pub fn new(initial: T, delay: Duration) -> Self {
    Self {
      input: initial.clone(),
      effective: initial,
      delay,
      deadline: None,
    }
  }

  /// Record a new input. Each change restarts the quiet period.
  pub fn set(&mut self, value: T) {
    if value == self.input {
      return;
    }
    self.input = value;
    self.deadline = if self.input == self.effective {
      None
    } else {
      let now = Instant::now();
      Some(
        now
          .checked_add(self.delay)
          .unwrap_or_else(|| now + FAR_FUTURE),
      )
    };
  }

  /// Latest raw input
  pub fn input(&self) -> &T {
    &self.input
  }

  /// Settled value
  pub fn value(&self) -> &T {
    &self.effective
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  pub fn is_pending(&self) -> bool {
    self.deadline.is_some()
  }

  /// Promote the input once the quiet period has passed.
  ///
  /// Returns true if `value()` changed.
  pub fn poll(&mut self) -> bool {
    match self.deadline {
      Some(deadline) if Instant::now() >= deadline => self.promote(),
      _ => false,
    }
  }

  /// Promote the input right away. Returns true if `value()` changed.
  pub fn submit(&mut self) -> bool {
    self.promote()
  }

  /// Sleep until the pending input settles, then promote it.
  pub async fn settled(&mut self) -> bool {
    match self.deadline {
      Some(deadline) => {
        tokio::time::sleep_until(deadline).await;
        self.promote()
      }
      None => false,
    }
  }

  fn promote(&mut self) -> bool {
    self.deadline = None;
    if self.effective == self.input {
      return false;
    }
    self.effective = self.input.clone();
    true
  }
}
