//! # Attempt State
//!
//! Observable state of the current payment attempt. UI code subscribes to a
//! `watch` channel and re-renders on change.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

/// Snapshot of one payment attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentAttempt {
    /// Endpoint being paid for
    pub endpoint: Option<String>,
    /// A request is in flight
    pub is_loading: bool,
    /// Message of the last failure; cleared when the next attempt starts
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Owns the sending half of the attempt channel
#[derive(Debug)]
pub struct AttemptTracker {
    tx: watch::Sender<PaymentAttempt>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PaymentAttempt::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<PaymentAttempt> {
        self.tx.subscribe()
    }

    /// Current snapshot
    pub fn current(&self) -> PaymentAttempt {
        self.tx.borrow().clone()
    }

    /// Mark a request to `endpoint` as in flight
    pub fn start(&self, endpoint: &str) {
        self.tx.send_replace(PaymentAttempt {
            endpoint: Some(endpoint.to_string()),
            is_loading: true,
            error: None,
            started_at: Some(Utc::now()),
        });
    }

    /// Record a failure for `endpoint` without touching the loading flag
    pub fn reject(&self, endpoint: &str, message: &str) {
        self.tx.send_modify(|attempt| {
            attempt.endpoint = Some(endpoint.to_string());
            attempt.error = Some(message.to_string());
        });
    }

    /// Finish the in-flight request
    pub fn finish(&self, error: Option<&str>) {
        self.tx.send_modify(|attempt| {
            attempt.is_loading = false;
            attempt.error = error.map(String::from);
        });
    }
}

impl Default for AttemptTracker {
    fn default() -> Self {
        Self::new()
    }
}
