use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and publish the
    /// configured cache TTL as a static gauge.
    pub fn init(ttl_secs: u64) -> anyhow::Result<Self> {
        static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe_all();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();

        gauge!("weather_cache_ttl_secs").set(ttl_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!(
        "weather_fetch_total",
        "Per-city provider fetches, labelled by outcome."
    );
    describe_counter!("weather_cache_hits_total", "Ranking requests served from cache.");
    describe_counter!(
        "weather_cache_misses_total",
        "Ranking requests that ran the full pipeline."
    );
    describe_counter!(
        "weather_cache_store_errors_total",
        "Cache store reads/writes that failed."
    );
    describe_counter!(
        "weather_history_persist_errors_total",
        "Observations that could not be appended to history."
    );
    describe_histogram!(
        "weather_pipeline_duration_ms",
        "Wall time of one uncached pipeline pass in milliseconds."
    );
    describe_gauge!("weather_ranked_cities", "Cities ranked by the last pass.");
    describe_gauge!("weather_cache_ttl_secs", "Configured result cache TTL.");
}
