// Metrics collection and tracking

use std::sync::OnceLock;
use std::time::Instant;

use serde::Serialize;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record the process start; called once from main.
pub fn mark_start() {
    let _ = START_TIME.get_or_init(Instant::now);
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub cpu_usage_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub memory_usage_percent: f32,
    pub request_count: u64,
    pub uptime_seconds: u64,
    pub system_load: Option<f64>,
}

pub fn snapshot(request_count: u64) -> MetricsResponse {
    let mut system = sysinfo::System::new();
    system.refresh_cpu();
    system.refresh_memory();

    let cpu_usage = system.global_cpu_info().cpu_usage();
    let memory_used = system.used_memory();
    let memory_total = system.total_memory();
    let memory_usage_percent = if memory_total > 0 {
        (memory_used as f64 / memory_total as f64 * 100.0) as f32
    } else {
        0.0
    };

    let uptime = START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0);

    // System load is Unix-only.
    let system_load = {
        #[cfg(unix)]
        {
            use std::fs;
            if let Ok(loadavg) = fs::read_to_string("/proc/loadavg") {
                loadavg
                    .split_whitespace()
                    .next()
                    .and_then(|s| s.parse::<f64>().ok())
            } else {
                None
            }
        }
        #[cfg(not(unix))]
        None
    };

    MetricsResponse {
        cpu_usage_percent: cpu_usage,
        memory_used_mb: memory_used / 1024 / 1024,
        memory_total_mb: memory_total / 1024 / 1024,
        memory_usage_percent,
        request_count,
        uptime_seconds: uptime,
        system_load,
    }
}
