//! Lifecycle of a single optimistic mutation.

/// State machine for one mutation invocation.
///
/// A mutation that patches the cache speculatively moves
/// `Idle -> Patched -> Committed | RolledBack`; one that doesn't patch stays
/// `Idle` until it resolves. The captured snapshot leaves the machine exactly
/// once, through `rollback`.
#[derive(Debug)]
pub enum Speculation<S> {
  /// No optimistic patch installed (yet).
  Idle,
  /// Patch installed; the pre-patch snapshot is held for rollback.
  Patched { snapshot: S },
  /// The write succeeded; the snapshot was discarded.
  Committed,
  /// The write failed; the snapshot was handed back for restoration.
  RolledBack,
}

impl<S> Speculation<S> {
  pub fn idle() -> Self {
    Speculation::Idle
  }

  pub fn patched(snapshot: S) -> Self {
    Speculation::Patched { snapshot }
  }

  pub fn is_patched(&self) -> bool {
    matches!(self, Speculation::Patched { .. })
  }

  /// The write was confirmed: drop any held snapshot. The speculative state
  /// already matches what the caller asked for, so this is a no-op on the
  /// cache itself.
  pub fn commit(&mut self) {
    *self = Speculation::Committed;
  }

  /// The write failed: yield the snapshot (if one was captured) so the
  /// caller can restore it. Subsequent calls yield nothing.
  pub fn rollback(&mut self) -> Option<S> {
    match std::mem::replace(self, Speculation::RolledBack) {
      Speculation::Patched { snapshot } => Some(snapshot),
      _ => None,
    }
  }
}
