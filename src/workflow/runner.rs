//! Single-flight task runner
//!
//! Every workflow step runs through [`TaskRunner::run`], which marks the
//! session busy, clears the previous message, awaits the step and writes its
//! outcome into the single message slot. Busy is released by [`BusyGuard`]'s
//! `Drop`, so it is cleared on success, on failure, on a panic unwinding
//! through the step and when the step's future is dropped mid-flight.

use std::future::Future;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use super::error::WorkflowResult;
use crate::models::{OperationStatus, Severity, StatusMessage};

/// Marks a status busy for as long as it is alive
pub struct BusyGuard<'a> {
    status: &'a mut OperationStatus,
    updates: &'a watch::Sender<OperationStatus>,
}

impl<'a> BusyGuard<'a> {
    /// Set busy and `label`, clear the message and publish the change
    pub fn acquire(
        status: &'a mut OperationStatus,
        updates: &'a watch::Sender<OperationStatus>,
        label: &str,
    ) -> Self {
        status.busy = true;
        status.label = label.to_string();
        status.message = None;
        updates.send_replace(status.clone());
        Self { status, updates }
    }

    /// Store the message reported when the guard is released
    pub fn set_message(&mut self, message: StatusMessage) {
        self.status.message = Some(message);
    }

    /// Current status while held
    pub fn status(&self) -> &OperationStatus {
        &*self.status
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.status.busy = false;
        self.status.label.clear();
        self.updates.send_replace(self.status.clone());
    }
}

/// Runs one labelled operation against a session status
pub struct TaskRunner<'a> {
    status: &'a mut OperationStatus,
    updates: &'a watch::Sender<OperationStatus>,
}

impl<'a> TaskRunner<'a> {
    pub fn new(
        status: &'a mut OperationStatus,
        updates: &'a watch::Sender<OperationStatus>,
    ) -> Self {
        Self { status, updates }
    }

    /// Run `operation` as the single in-flight step.
    ///
    /// A step resolving to `Ok(Some(message))` reports that message;
    /// `Ok(None)` leaves the slot empty. Failures are reported with their
    /// severity and the most specific text available, using `fallback` when
    /// the service gave none.
    ///
    /// Returns whether the step succeeded.
    pub async fn run<Fut>(self, label: &str, fallback: &str, operation: Fut) -> bool
    where
        Fut: Future<Output = WorkflowResult<Option<StatusMessage>>>,
    {
        let mut guard = BusyGuard::acquire(self.status, self.updates, label);
        debug!(label, "Operation started");

        match operation.await {
            Ok(message) => {
                debug!(label, "Operation completed");
                if let Some(message) = message {
                    guard.set_message(message);
                }
                true
            }
            Err(err) => {
                let severity = err.severity();
                let text = err.user_message(fallback);
                match severity {
                    Severity::Warning => warn!(label, reason = %text, "Operation not attempted"),
                    _ => error!(label, error = %err, "Operation failed"),
                }
                guard.set_message(StatusMessage::new(severity, text));
                false
            }
        }
    }
}
