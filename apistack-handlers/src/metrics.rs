//! Process metrics for the health check

use std::io;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Memory figures in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Resident set size
    pub rss: u64,
    /// Reserved data segment
    pub heap_total: u64,
    /// Resident anonymous memory
    pub heap_used: u64,
    /// Resident file-backed memory
    pub external: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSnapshot {
    pub uptime_secs: f64,
    pub memory: MemoryUsage,
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed process status line: {0}")]
    Parse(String),
}

/// Supplier of uptime and memory figures
pub trait MetricsSource: Send + Sync {
    fn snapshot(&self) -> Result<ProcessSnapshot, MetricsError>;
}

/// Metrics of the current process.
///
/// Uptime counts from construction. Memory comes from the kernel's status
/// file; on platforms without one all memory figures are zero.
#[derive(Debug, Clone)]
pub struct ProcessMetrics {
    started: Instant,
    status_path: PathBuf,
}

impl Default for ProcessMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessMetrics {
    pub fn new() -> Self {
        Self::with_status_path("/proc/self/status")
    }

    pub fn with_status_path(path: impl Into<PathBuf>) -> Self {
        Self {
            started: Instant::now(),
            status_path: path.into(),
        }
    }

    fn memory(&self) -> Result<MemoryUsage, MetricsError> {
        match std::fs::read_to_string(&self.status_path) {
            Ok(text) => parse_status(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(MemoryUsage::default()),
            Err(source) => Err(MetricsError::Io {
                path: self.status_path.clone(),
                source,
            }),
        }
    }
}

impl MetricsSource for ProcessMetrics {
    fn snapshot(&self) -> Result<ProcessSnapshot, MetricsError> {
        Ok(ProcessSnapshot {
            uptime_secs: self.started.elapsed().as_secs_f64(),
            memory: self.memory()?,
        })
    }
}

/// Parse `VmRSS`, `VmData`, `RssAnon` and `RssFile` (reported in kB)
fn parse_status(text: &str) -> Result<MemoryUsage, MetricsError> {
    let mut usage = MemoryUsage::default();

    for line in text.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key {
            "VmRSS" => &mut usage.rss,
            "VmData" => &mut usage.heap_total,
            "RssAnon" => &mut usage.heap_used,
            "RssFile" => &mut usage.external,
            _ => continue,
        };

        let kib = rest
            .split_whitespace()
            .next()
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(|| MetricsError::Parse(line.to_string()))?;
        *slot = kib * 1024;
    }

    Ok(usage)
}
