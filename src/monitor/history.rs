use crate::monitor::summary::RunSummary;

/// Ordered record of finished runs, newest last. Lives for the process
/// lifetime only; cleared wholesale on explicit user request.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<RunSummary>,
}

impl HistoryStore {
    pub fn append(&mut self, summary: RunSummary) {
        self.entries.push(summary);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[RunSummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
