use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::util::{Result, Status};

/// Caller-side cancellation flag shared between the thread running an
/// operation and whoever wants to stop it.
///
/// Operations check the token before every round trip to the cluster. A
/// cancelled scan releases its cluster-side scanner before reporting
/// [`Status::cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Status::cancelled())
        } else {
            Ok(())
        }
    }
}
