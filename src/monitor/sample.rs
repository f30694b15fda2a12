/// One reading taken from the target at a single tick of the sampling loop.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub tick: u32,
    pub cpu_percent: f32,
    pub memory_mb: f32,
}

impl Sample {
    pub(crate) fn new(tick: u32, usage: Usage) -> Self {
        Self {
            tick,
            cpu_percent: usage.cpu_percent,
            memory_mb: usage.memory_mb,
        }
    }
}

/// Raw (CPU %, memory MB) pair produced by a probe, before it is given an
/// ordinal in the run's buffers.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub cpu_percent: f32,
    pub memory_mb: f32,
}
