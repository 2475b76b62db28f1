//! Host resource probes: CPU, memory, disk, temperature, uptime,
//! internet reachability.
//!
//! CPU and memory come from a long-lived `sysinfo::System`; successive
//! refreshes across samples are what make the CPU percentage meaningful.
//! Temperature is a best-effort SoC reading and defaults to 0 upstream
//! when the tool is absent.

use parking_lot::Mutex;
use pirouter_core::{ProbeError, Result};
use sysinfo::{Disks, System};

use crate::shell;

const UPTIME_TIMEOUT_SECS: u64 = 10;
const TEMP_TIMEOUT_SECS: u64 = 5;
const PING_TIMEOUT_SECS: u64 = 5;

/// Resource readings from the local host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostStats {
    pub cpu_percent: u32,
    pub memory_percent: u32,
    pub disk_used_gb: f64,
    pub disk_free_gb: f64,
    pub disk_total_gb: f64,
}

/// Samples CPU/memory/disk from the OS.
pub struct SystemProbe {
    sys: Mutex<System>,
}

impl SystemProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Prime the CPU counters so the first real sample has a baseline.
        sys.refresh_cpu_usage();
        Self {
            sys: Mutex::new(sys),
        }
    }

    /// Sample CPU, memory and root-filesystem disk usage.
    pub fn sample_host_stats(&self) -> HostStats {
        let (cpu_percent, memory_percent) = {
            let mut sys = self.sys.lock();
            sys.refresh_cpu_usage();
            sys.refresh_memory();

            let cpu = sys.global_cpu_usage().round() as u32;
            let memory = if sys.total_memory() == 0 {
                0
            } else {
                ((sys.used_memory() as f64 / sys.total_memory() as f64) * 100.0).round() as u32
            };
            (cpu, memory)
        };

        let (disk_used_gb, disk_free_gb, disk_total_gb) = root_disk_usage();

        HostStats {
            cpu_percent,
            memory_percent,
            disk_used_gb,
            disk_free_gb,
            disk_total_gb,
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn root_disk_usage() -> (f64, f64, f64) {
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;

    let disks = Disks::new_with_refreshed_list();
    for disk in disks.list() {
        if disk.mount_point() == std::path::Path::new("/") {
            let total = disk.total_space() as f64 / GB;
            let free = disk.available_space() as f64 / GB;
            return (round1(total - free), round1(free), round1(total));
        }
    }
    (0.0, 0.0, 0.0)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Human-readable uptime text (`uptime -p`).
pub async fn sample_uptime() -> Result<String> {
    let out = shell::run("uptime", &["-p"], UPTIME_TIMEOUT_SECS).await?;
    if out.stdout.is_empty() {
        return Err(ProbeError::Parse("empty uptime output".to_string()));
    }
    Ok(out.stdout)
}

/// SoC temperature in Celsius via `vcgencmd measure_temp`.
pub async fn sample_temperature() -> Result<u32> {
    let out = shell::run("vcgencmd", &["measure_temp"], TEMP_TIMEOUT_SECS).await?;
    parse_temperature(&out.stdout)
        .ok_or_else(|| ProbeError::Parse(format!("unexpected temperature output: {}", out.stdout)))
}

/// Single bounded ping to the configured target.
pub async fn sample_internet_reachable(target: &str) -> Result<bool> {
    let out = shell::run("ping", &["-c", "1", "-W", "2", target], PING_TIMEOUT_SECS).await?;
    Ok(out.success)
}

/// Parse `temp=48.3'C` style output, rounded to whole degrees.
pub fn parse_temperature(output: &str) -> Option<u32> {
    let rest = output.split("temp=").nth(1)?;
    let digits: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().map(|t| t.round() as u32)
}
