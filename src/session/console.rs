use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::LogEntry;

const MAX_ENTRIES: usize = 1000;

/// Browser log transcript shared between the CDP event listeners and the
/// session that reads it on failure.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, dropping the oldest once the buffer is full.
    pub async fn add(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().await;
        if entries.len() >= MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub async fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
