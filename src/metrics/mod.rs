//! Prometheus metrics for the timer API
//!
//! This module provides metrics tracking for:
//! - API: requests per operation and status, request latency
//! - Storage: calls per operation and outcome, call latency
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

/// Container for all timer API metrics
struct TimerMetrics {
    api_requests: CounterVec,
    api_duration: HistogramVec,
    storage_operations: CounterVec,
    storage_duration: HistogramVec,
}

static TIMER_METRICS: OnceLock<Option<TimerMetrics>> = OnceLock::new();

fn register_metrics() -> Result<TimerMetrics, prometheus::Error> {
    Ok(TimerMetrics {
        api_requests: register_counter_vec!(
            "timerstore_api_requests_total",
            "Total API requests by operation and status",
            &["operation", "status"]
        )?,
        api_duration: register_histogram_vec!(
            "timerstore_api_request_duration_seconds",
            "API request duration in seconds",
            &["operation"],
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
        )?,
        storage_operations: register_counter_vec!(
            "timerstore_storage_operations_total",
            "Total storage calls by operation and outcome",
            &["operation", "outcome"]
        )?,
        storage_duration: register_histogram_vec!(
            "timerstore_storage_duration_seconds",
            "Storage call duration in seconds",
            &["operation"],
            vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
        )?,
    })
}

fn metrics() -> Option<&'static TimerMetrics> {
    TIMER_METRICS.get().and_then(Option::as_ref)
}

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers anything.
/// Concurrent callers wait for that first registration to finish.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    let registered = TIMER_METRICS.get_or_init(|| match register_metrics() {
        Ok(m) => {
            tracing::info!("Prometheus metrics initialized successfully");
            Some(m)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus metrics registration failed");
            None
        }
    });

    if registered.is_some() {
        Ok(())
    } else {
        Err("Timer metrics registration failed".into())
    }
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record API request
pub fn record_api_request(operation: &str, status: u16, duration_secs: f64) {
    let Some(m) = metrics() else {
        return;
    };

    let status_str = status.to_string();
    m.api_requests
        .with_label_values(&[operation, status_str.as_str()])
        .inc();
    m.api_duration
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Record a completed storage call
pub fn record_storage_call(operation: &str, success: bool, duration_secs: f64) {
    let Some(m) = metrics() else {
        return;
    };

    let outcome = if success { "ok" } else { "error" };
    m.storage_operations
        .with_label_values(&[operation, outcome])
        .inc();
    m.storage_duration
        .with_label_values(&[operation])
        .observe(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics() {
        assert!(init_metrics().is_ok());
        // Second call is a no-op
        assert!(init_metrics().is_ok());
        assert!(metrics().is_some());
    }

    #[test]
    fn test_encode_metrics() {
        let _ = init_metrics();
        record_api_request("create", 201, 0.002);
        record_storage_call("insert_one", true, 0.001);

        let text = encode_metrics().unwrap();
        assert!(text.contains("timerstore_api_requests_total"));
        assert!(text.contains("timerstore_storage_operations_total"));
    }

    #[test]
    fn test_recorders_never_panic() {
        record_api_request("list", 404, 0.001);
        record_storage_call("find_all", false, 0.001);
    }
}
