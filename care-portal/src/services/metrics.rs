use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static FACILITY_SEARCHES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static CHAT_MESSAGES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Install the HTTP metrics recorder and register domain counters.
///
/// Call once at startup. Recording functions are no-ops before this runs,
/// which keeps tests free of global setup.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;

    if METRICS_HANDLE.set(handle).is_err() {
        anyhow::bail!("metrics already initialized");
    }

    let registry = Registry::new();

    let searches = IntCounterVec::new(
        Opts::new(
            "facility_searches_total",
            "Completed facility searches by terminal outcome",
        ),
        &["outcome"],
    )?;

    let chat_messages = IntCounterVec::new(
        Opts::new("chat_messages_total", "Chatbot messages by outcome"),
        &["outcome"],
    )?;

    registry.register(Box::new(searches.clone()))?;
    registry.register(Box::new(chat_messages.clone()))?;

    let _ = PROMETHEUS_REGISTRY.set(registry);
    let _ = FACILITY_SEARCHES_TOTAL.set(searches);
    let _ = CHAT_MESSAGES_TOTAL.set(chat_messages);

    Ok(())
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

pub fn record_facility_search(outcome: &str) {
    if let Some(counter) = FACILITY_SEARCHES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_chat_message(outcome: &str) {
    if let Some(counter) = CHAT_MESSAGES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}
