use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use solana_program::msg;

use crate::error::{VaultError, VaultResult};

/// Whole-call lock shared by every mutating engine operation.
///
/// Clones observe the same flag, so a collaborator holding a clone cannot
/// enter the engine while a call is in flight.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLock {
    held: Arc<AtomicBool>,
}

/// Releases the lock when dropped, on success and error paths alike
#[derive(Debug)]
pub struct ExecutionGuard {
    held: Arc<AtomicBool>,
}

impl ExecutionLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> VaultResult<ExecutionGuard> {
        if self
            .held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            msg!("Re-entrant call rejected");
            return Err(VaultError::ReentrantCall);
        }

        Ok(ExecutionGuard {
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl Drop for ExecutionGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
