use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

/// 监控管线自身的指标
pub struct MetricsCollector {
    // 主机指标
    host_cpu_percent: Gauge,
    host_ram_percent: Gauge,

    // 采集管线
    samples_recorded_total: Counter,
    tick_failures_total: CounterVec,

    // 告警
    alerts_dispatched_total: Counter,
    alerts_failed_total: CounterVec,

    // 数据保留
    retention_deleted_rows_total: Counter,

    registry: Registry,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let host_cpu_percent = Gauge::new("dash_host_cpu_percent", "Last sampled CPU usage (0-100)")?;
        registry.register(Box::new(host_cpu_percent.clone()))?;

        let host_ram_percent = Gauge::new("dash_host_ram_percent", "Last sampled RAM usage (0-100)")?;
        registry.register(Box::new(host_ram_percent.clone()))?;

        let samples_recorded_total = Counter::new(
            "dash_samples_recorded_total",
            "Total number of samples persisted",
        )?;
        registry.register(Box::new(samples_recorded_total.clone()))?;

        let tick_failures_total = CounterVec::new(
            Opts::new("dash_tick_failures_total", "Recorder tick failures by stage"),
            &["stage"],
        )?;
        registry.register(Box::new(tick_failures_total.clone()))?;

        let alerts_dispatched_total = Counter::new(
            "dash_alerts_dispatched_total",
            "Total number of alert notifications dispatched",
        )?;
        registry.register(Box::new(alerts_dispatched_total.clone()))?;

        let alerts_failed_total = CounterVec::new(
            Opts::new("dash_alerts_failed_total", "Alert notifications that were not delivered"),
            &["reason"],
        )?;
        registry.register(Box::new(alerts_failed_total.clone()))?;

        let retention_deleted_rows_total = Counter::new(
            "dash_retention_deleted_rows_total",
            "Total number of samples removed by the retention sweeper",
        )?;
        registry.register(Box::new(retention_deleted_rows_total.clone()))?;

        Ok(Self {
            host_cpu_percent,
            host_ram_percent,
            samples_recorded_total,
            tick_failures_total,
            alerts_dispatched_total,
            alerts_failed_total,
            retention_deleted_rows_total,
            registry,
        })
    }

    pub fn set_host_usage(&self, cpu_percent: f64, ram_percent: f64) {
        self.host_cpu_percent.set(cpu_percent);
        self.host_ram_percent.set(ram_percent);
    }

    pub fn record_sample_persisted(&self) {
        self.samples_recorded_total.inc();
    }

    pub fn record_tick_failure(&self, stage: &str) {
        self.tick_failures_total.with_label_values(&[stage]).inc();
    }

    pub fn record_alert_dispatched(&self) {
        self.alerts_dispatched_total.inc();
    }

    pub fn record_alert_failed(&self, reason: &str) {
        self.alerts_failed_total.with_label_values(&[reason]).inc();
    }

    pub fn record_retention_deleted(&self, rows: u64) {
        self.retention_deleted_rows_total.inc_by(rows as f64);
    }

    // 导出指标
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().unwrap();
        assert!(!collector.export().unwrap().is_empty());
    }

    #[test]
    fn test_pipeline_metrics() {
        let collector = MetricsCollector::new().unwrap();

        collector.set_host_usage(85.5, 40.25);
        collector.record_sample_persisted();
        collector.record_tick_failure("store");
        collector.record_alert_dispatched();
        collector.record_alert_failed("delivery_failed");
        collector.record_retention_deleted(12);

        let metrics = collector.export().unwrap();
        assert!(metrics.contains("dash_host_cpu_percent 85.5"));
        assert!(metrics.contains("dash_samples_recorded_total 1"));
        assert!(metrics.contains("stage=\"store\""));
        assert!(metrics.contains("reason=\"delivery_failed\""));
        assert!(metrics.contains("dash_retention_deleted_rows_total 12"));
    }
}
