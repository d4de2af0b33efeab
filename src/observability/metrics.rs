use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Grant metrics
    pub grant_requests: IntCounterVec,
    pub grant_failures: IntCounterVec,

    // Resource metrics
    pub resource_fetch_requests: IntCounterVec,
    pub resource_fetch_failures: IntCounterVec,
    pub resource_fetch_duration: HistogramVec,

    // Caller-facing responses
    pub broker_responses: IntCounterVec,

    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("paragon".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Grants
            grant_requests: IntCounterVec::new(Opts::new("grant_requests_total", "Grant exchanges by grant type"), &["grant"]).unwrap(),
            grant_failures: IntCounterVec::new(Opts::new("grant_failures_total", "Failed grant exchanges by reason"), &["grant", "reason"]).unwrap(),

            // Resources
            resource_fetch_requests: IntCounterVec::new(Opts::new("resource_fetch_requests_total", "Upstream resource fetches"), &["resource"]).unwrap(),
            resource_fetch_failures: IntCounterVec::new(Opts::new("resource_fetch_failures_total", "Failed upstream resource fetches by reason"), &["resource", "reason"]).unwrap(),
            resource_fetch_duration: HistogramVec::new(HistogramOpts::new("resource_fetch_duration_seconds", "Upstream resource fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["resource"]).unwrap(),

            broker_responses: IntCounterVec::new(Opts::new("broker_responses_total", "Responses by endpoint and status"), &["endpoint", "status"]).unwrap(),

            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.grant_requests.clone())).unwrap();
        reg.register(Box::new(metrics.grant_failures.clone())).unwrap();
        reg.register(Box::new(metrics.resource_fetch_requests.clone())).unwrap();
        reg.register(Box::new(metrics.resource_fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.resource_fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.broker_responses.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
