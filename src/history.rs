use std::collections::VecDeque;

use crate::clip::ClipArtifact;

/// How many past clips a session keeps around for re-delivery.
pub const HISTORY_CAPACITY: usize = 3;

/// One produced clip retained for the rest of the session.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub label: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

impl HistoryEntry {
    pub fn new(label: String, artifact: &ClipArtifact) -> Self {
        Self {
            label,
            bytes: artifact.bytes.clone(),
            mime: artifact.mime,
            file_name: artifact.file_name.clone(),
        }
    }
}

/// Bounded most-recent-first buffer of produced clips.
///
/// Purely in-memory, gone with the session. Entries are never deduplicated;
/// two clips with the same file name are kept as distinct entries.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the front, evicting the oldest entry beyond capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Current entries, most-recent-first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str) -> HistoryEntry {
        HistoryEntry {
            label: label.to_owned(),
            bytes: vec![0],
            mime: "video/mp4",
            file_name: format!("{label}.mp4"),
        }
    }

    #[test]
    fn keeps_the_three_most_recent_most_recent_first() {
        let mut history = History::new();
        for label in ["a", "b", "c", "d"] {
            history.push(entry(label));
        }

        let labels: Vec<&str> = history.entries().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["d", "c", "b"]);
    }

    #[test]
    fn duplicate_names_are_kept() {
        let mut history = History::new();
        history.push(entry("same"));
        history.push(entry("same"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn indexed_access() {
        let mut history = History::new();
        history.push(entry("a"));
        history.push(entry("b"));
        assert_eq!(history.get(0).unwrap().label, "b");
        assert_eq!(history.get(1).unwrap().label, "a");
        assert!(history.get(2).is_none());
    }
}
