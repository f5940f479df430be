//! Health check service

use apistack_core::numbers::{bytes_to_mb, format_bytes};
use apistack_core::{now_iso, DomainError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::metrics::{MemoryUsage, MetricsSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Memory figures in megabytes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryReport {
    pub rss: f64,
    pub heap_total: f64,
    pub heap_used: f64,
    pub external: f64,
}

impl From<MemoryUsage> for MemoryReport {
    fn from(usage: MemoryUsage) -> Self {
        Self {
            rss: bytes_to_mb(usage.rss),
            heap_total: bytes_to_mb(usage.heap_total),
            heap_used: bytes_to_mb(usage.heap_used),
            external: bytes_to_mb(usage.external),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: String,
    pub environment: String,
    pub uptime: f64,
    pub memory_usage: MemoryReport,
}

pub struct HealthCheckService {
    environment: String,
    metrics: Arc<dyn MetricsSource>,
}

impl HealthCheckService {
    pub fn new(environment: impl Into<String>, metrics: Arc<dyn MetricsSource>) -> Self {
        Self {
            environment: environment.into(),
            metrics,
        }
    }

    pub fn check_health(&self) -> Result<HealthReport, DomainError> {
        let snapshot = self.metrics.snapshot().map_err(|e| {
            error!(error = %e, "Health check failed");
            DomainError::internal("Failed to perform health check", Some("HEALTH_CHECK_FAILED"))
        })?;

        debug!(
            uptime_secs = snapshot.uptime_secs,
            rss = %format_bytes(snapshot.memory.rss, 2),
            "Health check"
        );

        Ok(HealthReport {
            status: HealthStatus::Healthy,
            timestamp: now_iso(),
            environment: self.environment.clone(),
            uptime: snapshot.uptime_secs,
            memory_usage: snapshot.memory.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricsError, ProcessSnapshot};
    use apistack_core::ErrorKind;

    struct FixedMetrics(Option<ProcessSnapshot>);

    impl MetricsSource for FixedMetrics {
        fn snapshot(&self) -> Result<ProcessSnapshot, MetricsError> {
            self.0.ok_or_else(|| MetricsError::Parse("VmRSS:\tgarbage".to_string()))
        }
    }

    #[test]
    fn test_report_converts_to_megabytes() {
        let metrics = FixedMetrics(Some(ProcessSnapshot {
            uptime_secs: 12.5,
            memory: MemoryUsage {
                rss: 52_428_800,
                heap_total: 1_572_864,
                heap_used: 12_345_678,
                external: 0,
            },
        }));

        let report = HealthCheckService::new("dev", Arc::new(metrics)).check_health().unwrap();

        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.environment, "dev");
        assert_eq!(report.uptime, 12.5);
        assert_eq!(
            report.memory_usage,
            MemoryReport {
                rss: 50.0,
                heap_total: 1.5,
                heap_used: 11.77,
                external: 0.0,
            }
        );
    }

    #[test]
    fn test_report_wire_format() {
        let metrics = FixedMetrics(Some(ProcessSnapshot {
            uptime_secs: 1.0,
            memory: MemoryUsage::default(),
        }));
        let report = HealthCheckService::new("dev", Arc::new(metrics)).check_health().unwrap();
        let value = serde_json::to_value(report).unwrap();

        assert_eq!(value["status"], "healthy");
        assert!(value["memoryUsage"]["heapTotal"].is_number());
        assert!(value["memoryUsage"]["heapUsed"].is_number());
    }

    #[test]
    fn test_metrics_failure_is_internal_error() {
        let error = HealthCheckService::new("dev", Arc::new(FixedMetrics(None)))
            .check_health()
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), "Failed to perform health check");
        assert_eq!(error.code(), Some("HEALTH_CHECK_FAILED"));
    }
}
