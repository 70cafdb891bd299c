use crate::provider::LogEvent;

/// Events from one fetch of one stream, in the order the provider returned them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBatch {
    pub stream: String,
    pub events: Vec<LogEvent>,
}

impl OutputBatch {
    pub fn new(stream: impl Into<String>, events: Vec<LogEvent>) -> Self {
        Self {
            stream: stream.into(),
            events,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Console rendering: a blank line, a `==> stream <==` header, then one
    /// line per message. Empty batches render to nothing.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let body_len: usize = self.events.iter().map(|e| e.message.len() + 1).sum();
        let mut out = String::with_capacity(self.stream.len() + 10 + body_len);
        out.push('\n');
        out.push_str("==> ");
        out.push_str(&self.stream);
        out.push_str(" <==\n");
        for event in &self.events {
            out.push_str(&event.message);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(message: &str) -> LogEvent {
        LogEvent {
            timestamp: Utc::now(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_render_header_and_messages() {
        let batch = OutputBatch::new("s1", vec![event("hello"), event("world")]);
        assert_eq!(batch.render(), "\n==> s1 <==\nhello\nworld\n");
    }

    #[test]
    fn test_render_empty_batch_is_empty() {
        let batch = OutputBatch::new("s1", Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.render(), "");
    }

    #[test]
    fn test_render_keeps_message_text_verbatim() {
        let batch = OutputBatch::new("app/i-0abc", vec![event("  indented\ttab"), event("")]);
        assert_eq!(batch.render(), "\n==> app/i-0abc <==\n  indented\ttab\n\n");
    }
}
