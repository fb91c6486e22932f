use crate::diagnostics::Cancelled;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() { Err(Cancelled) } else { Ok(()) }
    }
}

/// Polls a token every `interval` ticks during a long scan.
#[derive(Debug)]
pub struct CheckBudget<'a> {
    token: &'a CancellationToken,
    interval: usize,
    ticks: usize,
}

impl<'a> CheckBudget<'a> {
    pub fn new(token: &'a CancellationToken, interval: usize) -> Self {
        Self { token, interval: interval.max(1), ticks: 0 }
    }

    pub fn tick(&mut self) -> Result<(), Cancelled> {
        self.ticks += 1;
        if self.ticks % self.interval == 0 {
            self.token.check()?;
        }
        Ok(())
    }
}
