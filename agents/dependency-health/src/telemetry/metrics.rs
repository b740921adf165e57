//! Prometheus metrics for report requests
//!
//! - `dependency_health_reports_total` (counter) - reports by instance and overall status
//! - `dependency_health_report_failures_total` (counter) - failed reports by instance and kind
//! - `dependency_health_report_duration_seconds` (histogram) - report latency by instance
//! - `dependency_health_component_status` (gauge) - last status per component
//!   (0 healthy, 1 degraded, 2 unhealthy)

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

use super::{Result, TelemetryError};
use crate::contracts::HealthReport;
use crate::error::HealthReportError;

const NAMESPACE: &str = "dependency_health";

/// Report metrics with their own registry
pub struct ReportMetrics {
    registry: Registry,
    reports_total: CounterVec,
    failures_total: CounterVec,
    duration_seconds: HistogramVec,
    component_status: IntGaugeVec,
}

impl ReportMetrics {
    /// Create and register all report metrics
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let reports_total = CounterVec::new(
            Opts::new("reports_total", "Health reports built").namespace(NAMESPACE),
            &["instance", "status"],
        )?;

        let failures_total = CounterVec::new(
            Opts::new("report_failures_total", "Health report requests that failed")
                .namespace(NAMESPACE),
            &["instance", "kind"],
        )?;

        let duration_seconds = HistogramVec::new(
            HistogramOpts::new("report_duration_seconds", "Health report latency in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["instance"],
        )?;

        let component_status = IntGaugeVec::new(
            Opts::new(
                "component_status",
                "Last reported component status (0 healthy, 1 degraded, 2 unhealthy)",
            )
            .namespace(NAMESPACE),
            &["instance", "component"],
        )?;

        registry.register(Box::new(reports_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;
        registry.register(Box::new(component_status.clone()))?;

        Ok(Self {
            registry,
            reports_total,
            failures_total,
            duration_seconds,
            component_status,
        })
    }

    /// Record a successful report under its configured instance name
    pub fn record_report(&self, report: &HealthReport, seconds: f64) {
        let instance = report.monitored_instance.as_str();
        self.reports_total
            .with_label_values(&[instance, report.status.as_str()])
            .inc();
        self.duration_seconds
            .with_label_values(&[instance])
            .observe(seconds);

        for (component, entry) in &report.entries {
            self.component_status
                .with_label_values(&[instance, component.as_str()])
                .set(entry.status.level());
        }
    }

    /// Record a failed report
    pub fn record_failure(&self, instance: &str, error: &HealthReportError, seconds: f64) {
        self.failures_total
            .with_label_values(&[instance, error.kind()])
            .inc();
        self.duration_seconds
            .with_label_values(&[instance])
            .observe(seconds);
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Encoding(e.to_string()))
    }
}
