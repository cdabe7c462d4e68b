//! Prometheus metrics setup and metric definitions

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    let buckets = [
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(&buckets)?
        .install_recorder()
}

/// Register metric descriptions and emit initial zero values so Prometheus output
/// includes HELP/TYPE lines from startup.
pub fn describe_metrics() {
    describe_counter!("ecclesia_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "ecclesia_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "ecclesia_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );

    describe_counter!(
        "ecclesia_events_published_total",
        "Domain events handed to the notifications queue, by outcome"
    );
    describe_counter!(
        "ecclesia_cache_operations_total",
        "Tenant cache operations, by outcome"
    );
    describe_counter!("ecclesia_auth_login_total", "Login attempts, by outcome");
    describe_counter!(
        "ecclesia_tenants_created_total",
        "Number of tenants created"
    );

    counter!("ecclesia_events_published_total", "event" => "sermon.published", "result" => "ok")
        .absolute(0);
    counter!("ecclesia_cache_operations_total", "operation" => "get", "result" => "hit")
        .absolute(0);
    counter!("ecclesia_auth_login_total", "result" => "success").absolute(0);
    counter!("ecclesia_tenants_created_total").absolute(0);
    gauge!("ecclesia_http_requests_in_flight").set(0.0);
}
