//! Parallel endpoint validation.
//!
//! Every endpoint gets its own tokio task, owned by a `JoinSet`. A task
//! probes its endpoint under the shared [`Context`], times the call, and
//! writes the outcome into the [`EndpointTable`] by index. The table's mutex
//! is held only for that write. [`validate_endpoints`] returns after every
//! task has finished; dropping its future aborts the tasks.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::client::ClientError;
use crate::context::Context;
use crate::endpoints::EndpointTable;
use crate::model::EndpointStatus;
use crate::probe::{EndpointProbe, ProbeOutcome};

/// Probe every endpoint in `table` concurrently and record the results.
///
/// Endpoint failures are recorded per endpoint. The call itself only fails
/// with [`ClientError::CriticalEndpoint`] when an endpoint flagged critical
/// ends up failed; results for every endpoint are recorded either way.
pub async fn validate_endpoints(
    table: &EndpointTable,
    probe: Arc<dyn EndpointProbe>,
    ctx: &Context,
    verbose: bool,
) -> Result<(), ClientError> {
    let targets = table.snapshot();
    let started = Instant::now();

    if verbose {
        info!(endpoints = targets.len(), "validating endpoints");
    } else {
        debug!(endpoints = targets.len(), "validating endpoints");
    }

    let mut tasks = JoinSet::new();
    for (index, endpoint) in targets.into_iter().enumerate() {
        let table = table.clone();
        let probe = Arc::clone(&probe);
        let ctx = ctx.clone();

        tasks.spawn(async move {
            if verbose {
                info!(method = %endpoint.method(), path = endpoint.path(), "probing endpoint");
            } else {
                debug!(method = %endpoint.method(), path = endpoint.path(), "probing endpoint");
            }

            let start = Instant::now();
            let result = match AssertUnwindSafe(ctx.run(probe.probe(&endpoint)))
                .catch_unwind()
                .await
            {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(panic) => Err(format!("probe task failed: {}", panic_message(&*panic))),
            };
            let latency = start.elapsed();

            match &result {
                Ok(()) if verbose => info!(
                    method = %endpoint.method(),
                    path = endpoint.path(),
                    latency_ms = latency.as_millis() as u64,
                    "endpoint working"
                ),
                Ok(()) => debug!(path = endpoint.path(), "endpoint working"),
                Err(e) if verbose => info!(
                    method = %endpoint.method(),
                    path = endpoint.path(),
                    latency_ms = latency.as_millis() as u64,
                    "endpoint failed: {}",
                    e
                ),
                Err(e) => debug!(path = endpoint.path(), "endpoint failed: {}", e),
            }

            table.record(index, ProbeOutcome { latency, result });
        });
    }

    // Dropping `tasks` aborts every probe still running, so nothing writes
    // into the table once this call is gone.
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!("probe task failed: {}", e);
        }
    }
    table.fail_unrecorded("probe task failed: no result recorded");

    let (working, failed, critical) = table.with(|endpoints| {
        let working = endpoints
            .iter()
            .filter(|e| e.status() == EndpointStatus::Working)
            .count();
        let critical = endpoints
            .iter()
            .find(|e| e.is_critical() && e.status() == EndpointStatus::Failed)
            .map(|e| (e.path().to_string(), e.error().to_string()));
        (working, endpoints.len() - working, critical)
    });

    let elapsed_ms = started.elapsed().as_millis() as u64;
    if verbose {
        info!(working, failed, elapsed_ms, "endpoint validation finished");
    } else {
        debug!(working, failed, elapsed_ms, "endpoint validation finished");
    }

    match critical {
        Some((path, error)) => Err(ClientError::CriticalEndpoint { path, error }),
        None => Ok(()),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
