//! Single-slot deferred execution primitives.
//!
//! The engine is driven by one cooperative loop. These types collapse bursts
//! of triggers into at most one pending execution:
//! - [`DeferredTask`]: a timer armed at most once until it fires
//! - [`FrameRequest`]: a redraw flag consumed once per display tick
//! - [`Interval`]: a fixed-period tick (liveness probe)

use std::time::Duration;

// WASM compat: std::time::Instant panics on wasm32
use web_time::Instant;

/// State of a [`DeferredTask`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskState {
  #[default]
  Idle,
  Armed { due: Instant },
}

/// A timer with at most one in-flight invocation.
///
/// Arming while already armed is a no-op, so the first trigger after each
/// firing decides when the task runs (leading-edge debounce).
#[derive(Clone, Copy, Debug, Default)]
pub struct DeferredTask {
  state: TaskState,
}

impl DeferredTask {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> TaskState {
    self.state
  }

  pub fn is_armed(&self) -> bool {
    matches!(self.state, TaskState::Armed { .. })
  }

  /// Arms the task to fire `delay` after `now`.
  ///
  /// Returns false if the task was already armed.
  pub fn arm(&mut self, now: Instant, delay: Duration) -> bool {
    if self.is_armed() {
      return false;
    }
    self.state = TaskState::Armed { due: now + delay };
    true
  }

  /// Returns true exactly once when the armed deadline has passed, and
  /// returns the task to idle.
  pub fn poll(&mut self, now: Instant) -> bool {
    match self.state {
      TaskState::Armed { due } if now >= due => {
        self.state = TaskState::Idle;
        true
      }
      _ => false,
    }
  }

  /// Returns the task to idle without firing.
  pub fn cancel(&mut self) {
    self.state = TaskState::Idle;
  }
}

/// Frame-coalesced redraw request.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameRequest {
  requested: bool,
}

impl FrameRequest {
  pub fn new() -> Self {
    Self::default()
  }

  /// Requests a paint on the next display tick.
  pub fn request(&mut self) {
    self.requested = true;
  }

  pub fn is_requested(&self) -> bool {
    self.requested
  }

  /// Consumes the request. Returns true if a paint is due.
  pub fn take(&mut self) -> bool {
    std::mem::take(&mut self.requested)
  }
}

/// Fixed-period tick.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
  period: Duration,
  next: Option<Instant>,
}

impl Interval {
  pub fn new(period: Duration) -> Self {
    Self { period, next: None }
  }

  /// Starts ticking; the first tick is one period after `now`.
  pub fn start(&mut self, now: Instant) {
    self.next = Some(now + self.period);
  }

  pub fn stop(&mut self) {
    self.next = None;
  }

  pub fn is_running(&self) -> bool {
    self.next.is_some()
  }

  /// Returns true if a tick is due, scheduling the following one.
  ///
  /// Missed ticks are not replayed.
  pub fn poll(&mut self, now: Instant) -> bool {
    match self.next {
      Some(next) if now >= next => {
        self.next = Some(now + self.period);
        true
      }
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MS: Duration = Duration::from_millis(1);

  #[test]
  fn rearming_while_armed_keeps_first_deadline() {
    let t0 = Instant::now();
    let mut task = DeferredTask::new();
    assert!(task.arm(t0, 200 * MS));
    assert!(!task.arm(t0 + 150 * MS, 200 * MS));

    assert!(!task.poll(t0 + 199 * MS));
    assert!(task.poll(t0 + 200 * MS));
    assert!(!task.poll(t0 + 400 * MS));
    assert!(task.arm(t0 + 400 * MS, 200 * MS));
  }

  #[test]
  fn cancel_prevents_firing() {
    let t0 = Instant::now();
    let mut task = DeferredTask::new();
    task.arm(t0, MS);
    task.cancel();
    assert!(!task.poll(t0 + 10 * MS));
    assert_eq!(task.state(), TaskState::Idle);
  }

  #[test]
  fn frame_request_collapses_triggers() {
    let mut frame = FrameRequest::new();
    frame.request();
    frame.request();
    assert!(frame.take());
    assert!(!frame.take());
  }

  #[test]
  fn interval_ticks_once_per_period() {
    let t0 = Instant::now();
    let mut interval = Interval::new(100 * MS);
    assert!(!interval.poll(t0 + 500 * MS));
    interval.start(t0);
    assert!(!interval.poll(t0 + 99 * MS));
    assert!(interval.poll(t0 + 100 * MS));
    assert!(!interval.poll(t0 + 150 * MS));
    assert!(interval.poll(t0 + 450 * MS));
    interval.stop();
    assert!(!interval.poll(t0 + 10_000 * MS));
  }
}
