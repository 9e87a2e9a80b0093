//! Host lifecycle state machine.
//!
//! The host moves through `Starting → Registering → Running → Stopping →
//! Stopped`. A fresh gateway session moves a running host back to
//! `Registering` while commands are registered again. The current state is published on a `watch` channel so any task
//! holding a [`Lifecycle`] handle (or a receiver from [`Lifecycle::subscribe`])
//! can observe it.

use crate::errors::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Lifecycle states of the bot process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostState {
    /// Client is being built and logging in
    Starting,
    /// Gateway is ready, guild commands are being registered
    Registering,
    /// Serving interactions
    Running,
    /// Shutdown requested, shards are closing
    Stopping,
    /// Gateway connection closed
    Stopped,
}

impl HostState {
    /// Whether the host may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Starting, Self::Registering | Self::Stopping)
                | (Self::Registering, Self::Running | Self::Stopping)
                | (Self::Running, Self::Registering | Self::Stopping)
                | (Self::Stopping, Self::Stopped)
        )
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Starting => "Starting",
            Self::Registering => "Registering",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Shared handle to the host state.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: Arc<watch::Sender<HostState>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Creates a lifecycle in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(HostState::Starting);
        Self {
            state: Arc::new(state),
        }
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> HostState {
        *self.state.borrow()
    }

    /// Receiver that is notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HostState> {
        self.state.subscribe()
    }

    /// Moves to `next` if the transition is allowed.
    ///
    /// Illegal transitions leave the state untouched and return
    /// [`Error::Lifecycle`].
    pub fn transition(&self, next: HostState) -> Result<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|current| {
            let from = *current;
            if from.can_transition_to(next) {
                *current = next;
                info!(%from, to = %next, "Host state changed");
                true
            } else {
                warn!(%from, to = %next, "Rejected host state change");
                outcome = Err(Error::Lifecycle { from, to: next });
                false
            }
        });
        outcome
    }
}
