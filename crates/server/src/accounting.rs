//! Best-effort usage accounting.
//!
//! Increments run on their own task so a slow or failing counters store
//! never delays or fails the response that triggered them.

use crate::metrics::COUNTER_UPDATE_FAILURES;
use crate::state::AppState;
use hoist_core::Counter;

/// Apply counter increments in the background.
///
/// Zero deltas are skipped. Failures are logged and counted, never retried.
pub fn spawn_increments(state: &AppState, increments: &[(Counter, u64)]) {
    let increments: Vec<(Counter, u64)> = increments
        .iter()
        .copied()
        .filter(|(_, delta)| *delta > 0)
        .collect();
    if increments.is_empty() {
        return;
    }

    let counters = state.counters.clone();
    let limit = state.config.server.storage_timeout();
    tokio::spawn(async move {
        for (counter, delta) in increments {
            let outcome = tokio::time::timeout(limit, counters.increment(counter, delta)).await;
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {}s", limit.as_secs()),
            };
            COUNTER_UPDATE_FAILURES
                .with_label_values(&[counter.as_str()])
                .inc();
            tracing::warn!(
                counter = %counter,
                delta,
                error = %error,
                "Failed to update usage counter"
            );
        }
    });
}
