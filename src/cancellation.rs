//! Cooperative cancellation shared between the event loop and helper threads.
//!
//! A token may be derived from a parent with [`CancellationToken::child`]; the
//! child reports cancelled once it or any ancestor is cancelled. The speech
//! engine hands one child per utterance to its watcher thread so that
//! `cancel_all` (parent) and a single-utterance cancel (child) share one path.

use anyhow::{Result, anyhow};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    parent: Option<Box<CancellationToken>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that observes this one's cancellation but can be cancelled alone.
    pub fn child(&self) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            parent: Some(Box::new(self.clone())),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_cancelled())
    }

    pub fn check_cancelled(&self, stage: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(anyhow!("operation cancelled at stage={stage}"));
        }
        Ok(())
    }
}
