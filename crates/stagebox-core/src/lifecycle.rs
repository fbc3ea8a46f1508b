//! Two-phase node construction: a pending state plus a completion event.
//!
//! A node is usable as soon as it is constructed, but its backing unit only
//! exists after the graph's instantiate callback fires. [`AttachmentGate`]
//! tracks that transition and lets callers block until it happens.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::{Error, Result};

/// Attachment phase of a node's backing unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle {
    Constructing,
    Attached,
    Failed(String),
    Detached,
}

#[derive(Debug)]
pub struct AttachmentGate {
    state: Mutex<Lifecycle>,
    changed: Condvar,
}

impl Default for AttachmentGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Lifecycle::Constructing),
            changed: Condvar::new(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lock().clone()
    }

    pub fn is_attached(&self) -> bool {
        matches!(*self.state.lock(), Lifecycle::Attached)
    }

    /// Whether a unit may attach now. A failed instantiation may be retried.
    pub fn check_attachable(&self) -> Result<()> {
        match *self.state.lock() {
            Lifecycle::Constructing | Lifecycle::Failed(_) => Ok(()),
            Lifecycle::Attached => Err(Error::AlreadyAttached),
            Lifecycle::Detached => Err(Error::NodeDetached),
        }
    }

    pub fn mark_attached(&self) -> Result<()> {
        let mut state = self.state.lock();
        match *state {
            Lifecycle::Attached => return Err(Error::AlreadyAttached),
            Lifecycle::Detached => return Err(Error::NodeDetached),
            _ => {}
        }
        *state = Lifecycle::Attached;
        self.changed.notify_all();
        Ok(())
    }

    /// Record a failed instantiation. Ignored unless still constructing.
    pub fn mark_failed(&self, reason: impl Into<String>) {
        let mut state = self.state.lock();
        if *state == Lifecycle::Constructing {
            *state = Lifecycle::Failed(reason.into());
            self.changed.notify_all();
        }
    }

    pub fn mark_detached(&self) {
        *self.state.lock() = Lifecycle::Detached;
        self.changed.notify_all();
    }

    /// Block the calling control thread until the unit attaches, fails, or
    /// `timeout` elapses. Never called from the audio timeline.
    pub fn wait(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        loop {
            match &*state {
                Lifecycle::Attached => return Ok(()),
                Lifecycle::Failed(reason) => return Err(Error::Instantiation(reason.clone())),
                Lifecycle::Detached => return Err(Error::NodeDetached),
                Lifecycle::Constructing => {}
            }

            if self.changed.wait_until(&mut state, deadline).timed_out() {
                return match &*state {
                    Lifecycle::Attached => Ok(()),
                    _ => Err(Error::AttachTimeout),
                };
            }
        }
    }
}
