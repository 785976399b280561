//! OTLP export wiring
//!
//! The exporters connect lazily, so installation succeeds without a
//! collector listening on the endpoint.

use burrow_common::telemetry::{init_telemetry, LogFormat, TelemetryConfig};

/// Story: With an endpoint configured, trace and metric export are wired in
/// alongside JSON logs.
#[tokio::test(flavor = "multi_thread")]
async fn story_otlp_export_installs_with_endpoint() {
    let config = TelemetryConfig {
        service_name: "burrow-test".to_string(),
        otlp_endpoint: Some("http://127.0.0.1:4317".to_string()),
        log_format: LogFormat::Json,
    };

    init_telemetry(config).expect("otlp install should succeed");

    let span = tracing::info_span!("reconcile", broker = "default/my-broker");
    span.in_scope(|| tracing::info!("exported span"));
}
