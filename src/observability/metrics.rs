//! Metrics collection and exposition.
//!
//! # Metrics
//! - `election_rpc_calls_total` (counter): RPC calls by method and outcome
//! - `election_submissions_total` (counter): finished submissions by
//!   contract function, outcome (`confirmed` or `failed`) and the last stage
//!   reached (`none` when the request could not be built)
//! - `election_results_aggregated_total` (counter): ranked results built
//! - `election_result_candidates` (histogram): candidates per result
//!
//! Recording is a no-op until a recorder is installed.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::blockchain::TxStage;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one RPC call.
pub fn record_rpc_call(method: &'static str, outcome: &'static str) {
    metrics::counter!("election_rpc_calls_total", "method" => method, "outcome" => outcome)
        .increment(1);
}

/// Count one finished submission.
pub fn record_submission(function: &'static str, outcome: &'static str, last_reached: Option<TxStage>) {
    metrics::counter!(
        "election_submissions_total",
        "function" => function,
        "outcome" => outcome,
        "stage" => last_reached.map_or("none", TxStage::as_str)
    )
    .increment(1);
}

/// Count one aggregated election result.
pub fn record_aggregation(candidates: usize) {
    metrics::counter!("election_results_aggregated_total").increment(1);
    metrics::histogram!("election_result_candidates").record(candidates as f64);
}
