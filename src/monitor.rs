pub mod history;
pub mod sample;
pub mod session;
pub mod summary;
pub mod target;

pub use history::HistoryStore;
pub use sample::{Sample, Usage};
pub use session::{Monitor, RunOutcome, RunSnapshot, RunState};
pub use summary::{RunSummary, summarize};
pub use target::{Probe, ResolveError, SampleError, TargetHandle, resolve};
