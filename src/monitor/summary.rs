use std::fmt;

use crate::monitor::sample::Sample;

/// Aggregated result of one finished (or aborted) run. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub label: String,
    pub duration_secs: u32,
    pub mean_cpu_percent: f32,
    pub mean_memory_mb: f32,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}s - avg CPU {:.2}%, avg RAM {:.2} MB",
            self.label, self.duration_secs, self.mean_cpu_percent, self.mean_memory_mb
        )
    }
}

/// Reduce a run's samples to mean CPU and memory. An empty run averages to
/// zero on both axes.
pub fn summarize(label: &str, duration_secs: u32, samples: &[Sample]) -> RunSummary {
    let mean = |pick: fn(&Sample) -> f32| {
        if samples.is_empty() {
            0.0
        } else {
            samples.iter().map(pick).sum::<f32>() / samples.len() as f32
        }
    };
    RunSummary {
        label: label.to_string(),
        duration_secs,
        mean_cpu_percent: mean(|s| s.cpu_percent),
        mean_memory_mb: mean(|s| s.memory_mb),
    }
}
