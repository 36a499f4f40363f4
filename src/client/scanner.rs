// ABOUTME: Background timeout sweeper, the in-process stand-in for the external
// ABOUTME: periodic-scheduler collaborator: one task, so sweeps never overlap

use crate::pending::{Outcome, PendingTable};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawn the sweeper loop for one client's pending-call table.
///
/// Ticks no sooner than `initial_delay_ms` after spawning, then roughly
/// every `period_ms` thereafter. Because this is a single task awaiting
/// its own `interval.tick()`, two sweeps can never run concurrently —
/// the non-overlap guarantee the correlation engine relies on comes for
/// free rather than needing a mutex around the sweep body.
pub fn spawn(pending: Arc<PendingTable>, period_ms: u64, initial_delay_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(initial_delay_ms)).await;

        let mut interval = tokio::time::interval(Duration::from_millis(period_ms.max(1)));
        loop {
            interval.tick().await;
            let reaped = pending.sweep(Instant::now()).await;
            if reaped.is_empty() {
                continue;
            }
            debug!(count = reaped.len(), "sweep reaped expired pending calls");
            for call in reaped {
                warn!(
                    sequence = call.sequence,
                    code = call.code,
                    address = %call.address,
                    timeout_ms = call.timeout_ms,
                    "pending call timed out"
                );
                call.complete(Outcome::TimedOut);
            }
        }
    })
}
