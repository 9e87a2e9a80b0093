//! Shared test utilities for `ping-bot`.
//!
//! Provides a [`RecordingResponder`] that stands in for a Discord interaction
//! and records every reply it is asked to send.

use crate::{
    bot::handlers::interaction::Responder,
    errors::{Error, Result},
};
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

/// A reply captured by [`RecordingResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentReply {
    /// Sent as the initial interaction response
    Initial(String),
    /// Sent as a follow-up message
    FollowUp(String),
}

/// Fake interaction that records replies instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    responded: AtomicBool,
    fail_sends: bool,
    sent: Mutex<Vec<SentReply>>,
}

impl RecordingResponder {
    /// An interaction that has not been answered yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// An interaction whose initial response was already sent.
    pub fn already_responded() -> Self {
        Self {
            responded: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// An interaction whose sends always fail.
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    /// Replies recorded so far.
    pub fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, reply: SentReply) -> Result<()> {
        if self.fail_sends {
            return Err(Error::Unsuccessful("send rejected by test".to_string()));
        }
        self.sent.lock().unwrap().push(reply);
        Ok(())
    }
}

impl Responder for RecordingResponder {
    fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    async fn respond_ephemeral(&self, content: String) -> Result<()> {
        assert!(
            !self.has_responded(),
            "initial response sent twice for one interaction"
        );
        self.record(SentReply::Initial(content))?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn follow_up_ephemeral(&self, content: String) -> Result<()> {
        self.record(SentReply::FollowUp(content))
    }
}
