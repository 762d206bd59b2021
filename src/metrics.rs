//! Prometheus metrics for the relay.
//!
//! The recorder is installed once per process; later calls to [`init`] return
//! the same handle, so several routers (e.g. in tests) can coexist.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder (idempotent) and return its handle.
pub fn init() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                warn!("A global metrics recorder was already installed");
            }
            handle
        })
        .clone()
}

/// Periodically drain histogram samples into their buckets.
///
/// A recorder built with `build_recorder` has no upkeep of its own; without
/// this task histogram samples accumulate until `/metrics` is scraped.
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    debug!("Metrics upkeep every {:?}", period);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}

/// Count one relay response by resource kind and status code.
pub fn record_request(kind: &'static str, status: u16) {
    counter!("relay_requests_total", "kind" => kind, "status" => status.to_string()).increment(1);
}

/// Record time spent until the response head was ready.
pub fn record_duration(kind: &'static str, start: Instant) {
    histogram!("relay_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

/// Count an upstream failure: `network`, `timeout` or `status`.
pub fn record_upstream_error(reason: &'static str) {
    counter!("relay_upstream_errors_total", "reason" => reason).increment(1);
}

pub fn record_lines_rewritten(count: usize) {
    counter!("relay_manifest_lines_rewritten_total").increment(count as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_and_renders() {
        let _first = init();
        let second = init();

        record_request("manifest", 200);
        record_upstream_error("status");

        let rendered = second.render();
        assert!(rendered.contains("relay_requests_total"));
        assert!(rendered.contains("relay_upstream_errors_total"));
    }

    #[tokio::test]
    async fn upkeep_task_keeps_running() {
        let handle = init();
        let upkeep = spawn_upkeep(handle.clone(), Duration::from_millis(5));

        record_duration("segment", Instant::now());
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(!upkeep.is_finished());
        assert!(handle.render().contains("relay_request_duration_seconds"));
        upkeep.abort();
    }
}
