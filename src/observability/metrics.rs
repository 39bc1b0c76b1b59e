//! Metrics collection.
//!
//! # Metrics
//! - `web3_node_requests_total` (counter): node calls by endpoint, outcome
//! - `web3_node_request_duration_seconds` (histogram): node call latency
//! - `web3_send_stage_total` (counter): pipeline transitions by stage
//! - `web3_confirmations_total` (counter): poller verdicts by outcome
//! - `web3_confirmation_rounds` (histogram): rounds waited before a verdict
//! - `web3_network_switches_total` (counter): switches by target network
//!
//! Recording is a no-op until the application installs a recorder.

use std::time::Instant;

use metrics::{counter, histogram};

/// Record one node call.
pub fn record_node_request(endpoint: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("web3_node_requests_total", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
    histogram!("web3_node_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record a pipeline state transition.
pub fn record_send_stage(stage: &'static str) {
    counter!("web3_send_stage_total", "stage" => stage).increment(1);
}

/// Record a terminal poller verdict.
pub fn record_confirmation(outcome: &'static str, rounds_waited: u64) {
    counter!("web3_confirmations_total", "outcome" => outcome).increment(1);
    histogram!("web3_confirmation_rounds", "outcome" => outcome).record(rounds_waited as f64);
}

/// Record a network switch.
pub fn record_network_switch(network: &str) {
    counter!("web3_network_switches_total", "network" => network.to_string()).increment(1);
}
