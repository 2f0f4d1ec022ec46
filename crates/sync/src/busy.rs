//! Single-flight guard: at most one orchestrated operation at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::HubError;

/// Process-wide busy flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claims the flag, or fails with [`HubError::Busy`] if already held.
    pub fn try_acquire(&self) -> Result<BusyGuard, HubError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| HubError::Busy)?;
        Ok(BusyGuard(self.0.clone()))
    }
}

/// Releases the flag on drop.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
