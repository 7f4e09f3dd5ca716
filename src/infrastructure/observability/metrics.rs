//! Prometheus metrics for the prediction service.
//!
//! All metrics use the `solarcast_` prefix.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Predictions served, by outcome (ok, invalid_input, artifact_failure)
    pub predictions_total: CounterVec,
    /// Wall time of one prediction in seconds
    pub prediction_latency_seconds: Histogram,
    /// Cities in the loaded weather table
    pub cities_loaded: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new("solarcast_predictions_total", "Total predictions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "solarcast_prediction_latency_seconds",
                "Prediction latency in seconds",
            )
            .buckets(vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25]),
        )?;
        registry.register(Box::new(prediction_latency_seconds.clone()))?;

        let cities_loaded = Gauge::with_opts(Opts::new(
            "solarcast_cities_loaded",
            "Cities in the weather reference table",
        ))?;
        registry.register(Box::new(cities_loaded.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "solarcast_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            prediction_latency_seconds,
            cities_loaded,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn record_prediction(&self, outcome: &str, latency: f64) {
        self.predictions_total.with_label_values(&[outcome]).inc();
        self.prediction_latency_seconds.observe(latency);
    }
}
