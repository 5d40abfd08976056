#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// 單一階段的資源使用量
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
pub struct RunMonitor {
    state: Option<Mutex<MonitorState>>,
    pid: Option<Pid>,
    started: Instant,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid().ok()
        } else {
            None
        };

        if enabled && pid.is_none() {
            tracing::warn!("⚠️ Could not resolve current PID, monitoring disabled");
        }

        let state = pid.map(|_| {
            let mut system = System::new();
            system.refresh_memory();
            Mutex::new(MonitorState {
                system,
                peak_memory_mb: 0,
            })
        });

        Self {
            state,
            pid,
            started: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    pub fn sample(&self, phase: &str) -> Option<PhaseStats> {
        let pid = self.pid?;
        let mut state = self.state.as_ref()?.lock().ok()?;

        state.system.refresh_memory();
        state
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let (cpu_usage, memory_mb) = {
            let process = state.system.process(pid)?;
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };
        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);

        Some(PhaseStats {
            phase: phase.to_string(),
            cpu_usage,
            memory_mb,
            peak_memory_mb: state.peak_memory_mb,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_phase(&self, phase: &str) {
        if let Some(stats) = self.sample(phase) {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                stats.phase,
                stats.cpu_usage,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }

    pub fn log_summary(&self) {
        if let Some(stats) = self.sample("finished") {
            tracing::info!(
                "📊 Run finished in {:?}, peak memory {}MB",
                stats.elapsed,
                stats.peak_memory_mb
            );
        }
    }
}

#[cfg(feature = "cli")]
impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境不收集系統資訊
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct RunMonitor;

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn log_phase(&self, _phase: &str) {}

    pub fn log_summary(&self) {}
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = RunMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.sample("extract").is_none());
    }

    #[test]
    fn test_enabled_monitor_tracks_peak() {
        let monitor = RunMonitor::new(true);
        if let Some(first) = monitor.sample("extract") {
            let second = monitor.sample("load").unwrap();
            assert_eq!(second.phase, "load");
            assert!(second.peak_memory_mb >= first.memory_mb);
        }
    }
}
