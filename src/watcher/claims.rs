use std::collections::HashSet;

/// Streams that already have a tailer.
///
/// Entries are never removed: a claimed stream stays claimed for the lifetime
/// of the watcher, even if its tailer stops.
#[derive(Debug, Clone, Default)]
pub struct ClaimedStreams {
    streams: HashSet<String>,
}

impl ClaimedStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `stream`. Returns false if it was already claimed.
    pub fn claim(&mut self, stream: &str) -> bool {
        if self.streams.contains(stream) {
            return false;
        }
        self.streams.insert(stream.to_string())
    }

    pub fn contains(&self, stream: &str) -> bool {
        self.streams.contains(stream)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
