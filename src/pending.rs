// ABOUTME: Sequence-keyed pending-call table shared by concurrent invokers, the response
// ABOUTME: dispatch path, and the timeout sweeper, with at-most-once completion

use crate::message::Response;
use std::collections::HashMap;
use std::io;
use std::time::Instant;
use tokio::sync::{oneshot, Mutex};

/// What a pending call's completion sink eventually delivers.
#[derive(Debug)]
pub enum Outcome {
    /// A matching response arrived before the deadline.
    Response(Response),
    /// The deadline passed with no response (reaped by the sweeper).
    TimedOut,
    /// The send attempt itself failed; no response was ever possible.
    SendFailed(io::Error),
    /// The client was shut down while this call was still outstanding.
    Shutdown,
}

/// A single outstanding client call, awaiting a response, a timeout, or
/// a send failure.
///
/// Whichever of those three happens first calls
/// [`PendingTable::remove`], which atomically hands ownership of this
/// value to exactly one caller — there is no separate "already
/// completed" flag to check because ownership itself is the at-most-once
/// guarantee: only the actor that successfully removed the entry can
/// call [`PendingCall::complete`].
pub struct PendingCall {
    pub sequence: u64,
    pub code: i32,
    pub address: String,
    pub timeout_ms: u64,
    pub deadline: Instant,
    send_succeeded: Option<bool>,
    send_error: Option<io::Error>,
    completion: oneshot::Sender<Outcome>,
}

impl PendingCall {
    pub fn new(
        sequence: u64,
        code: i32,
        address: String,
        timeout_ms: u64,
        deadline: Instant,
        completion: oneshot::Sender<Outcome>,
    ) -> Self {
        PendingCall {
            sequence,
            code,
            address,
            timeout_ms,
            deadline,
            send_succeeded: None,
            send_error: None,
            completion,
        }
    }

    pub fn send_succeeded(&self) -> Option<bool> {
        self.send_succeeded
    }

    pub fn take_send_error(&mut self) -> Option<io::Error> {
        self.send_error.take()
    }

    /// Fire the completion sink. Consumes `self`, so calling this twice
    /// is a compile error rather than a runtime race.
    pub fn complete(self, outcome: Outcome) {
        let _ = self.completion.send(outcome);
    }
}

/// Concurrent-safe `sequence -> pending call` map.
///
/// All three racing producers — response arrival, timeout sweep, and
/// send-failure callback — go through [`PendingTable::remove`] (or the
/// equivalent single-key removal inside [`PendingTable::sweep`]), which
/// serializes on the same lock, so exactly one of them ever obtains the
/// `PendingCall` for a given sequence.
#[derive(Default)]
pub struct PendingTable {
    inner: Mutex<HashMap<u64, PendingCall>>,
}

impl PendingTable {
    pub fn new() -> Self {
        PendingTable::default()
    }

    /// Atomic insert-if-absent. A duplicate sequence is a programmer
    /// error (or astronomically unlikely counter wraparound) and is
    /// reported immediately rather than silently overwriting.
    pub async fn insert(&self, call: PendingCall) -> Result<(), PendingCall> {
        let mut guard = self.inner.lock().await;
        if guard.contains_key(&call.sequence) {
            return Err(call);
        }
        guard.insert(call.sequence, call);
        Ok(())
    }

    /// Atomic take. Returns `None` if another actor already removed
    /// (and is therefore responsible for completing) this sequence.
    pub async fn remove(&self, sequence: u64) -> Option<PendingCall> {
        self.inner.lock().await.remove(&sequence)
    }

    /// Record the outcome of the send attempt for `sequence`.
    ///
    /// On success, just annotates the still-pending entry so a later
    /// timeout can be classified as `TimeoutError` rather than
    /// `SendError`. On failure, removes the entry and returns it so the
    /// caller can complete it with `Outcome::TimedOut` — unless a
    /// response or sweep already won the race, in which case `None` is
    /// returned and this call is a no-op.
    pub async fn mark_send_result(
        &self,
        sequence: u64,
        result: Result<(), io::Error>,
    ) -> Option<PendingCall> {
        let mut guard = self.inner.lock().await;
        let failed = result.is_err();
        if let Some(call) = guard.get_mut(&sequence) {
            call.send_succeeded = Some(!failed);
            if let Err(err) = result {
                call.send_error = Some(err);
            }
        } else {
            return None;
        }
        if failed {
            guard.remove(&sequence)
        } else {
            None
        }
    }

    /// Atomically enumerate and remove every entry whose deadline has
    /// passed. A response that arrives and removes its own entry
    /// concurrently with this scan simply won't be present in the
    /// removal step below — `remove` on an already-removed key is `None`
    /// and is filtered out, so it is never double-completed.
    pub async fn sweep(&self, now: Instant) -> Vec<PendingCall> {
        let mut guard = self.inner.lock().await;
        let expired: Vec<u64> = guard
            .iter()
            .filter(|(_, call)| now >= call.deadline)
            .map(|(sequence, _)| *sequence)
            .collect();

        expired
            .into_iter()
            .filter_map(|sequence| guard.remove(&sequence))
            .collect()
    }

    /// Drain every entry, regardless of deadline. Used on shutdown.
    pub async fn drain(&self) -> Vec<PendingCall> {
        self.inner.lock().await.drain().map(|(_, call)| call).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
