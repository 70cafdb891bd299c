#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudtail::provider::{
    ContinuationToken, EventPage, LogEvent, LogProvider, ProviderError, StreamSummary,
};
use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// A recorded fetch against the fake provider
#[derive(Debug, Clone)]
pub struct FetchCall {
    pub stream: String,
    pub token: Option<ContinuationToken>,
    pub at: Instant,
}

/// In-memory stand-in for the log service.
///
/// Listings and per-stream pages are replayed in order. An exhausted listing
/// script returns no streams; an exhausted page script answers "no new data"
/// by echoing the request token.
#[derive(Default)]
pub struct FakeProvider {
    listings: Mutex<VecDeque<Result<Vec<StreamSummary>, String>>>,
    pages: Mutex<HashMap<String, VecDeque<Result<EventPage, String>>>>,
    calls: Mutex<Vec<FetchCall>>,
    listing_count: Mutex<usize>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(self, streams: Vec<StreamSummary>) -> Self {
        self.listings.lock().unwrap().push_back(Ok(streams));
        self
    }

    pub fn with_listing_error(self, message: &str) -> Self {
        self.listings.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn with_page(self, stream: &str, page: EventPage) -> Self {
        self.pages
            .lock()
            .unwrap()
            .entry(stream.to_string())
            .or_default()
            .push_back(Ok(page));
        self
    }

    pub fn with_fetch_error(self, stream: &str, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .entry(stream.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, stream: &str) -> Vec<FetchCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.stream == stream)
            .collect()
    }

    pub fn listing_count(&self) -> usize {
        *self.listing_count.lock().unwrap()
    }

    fn next_page(
        &self,
        stream: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<EventPage, ProviderError> {
        self.calls.lock().unwrap().push(FetchCall {
            stream: stream.to_string(),
            token: token.cloned(),
            at: Instant::now(),
        });

        let scripted = self
            .pages
            .lock()
            .unwrap()
            .get_mut(stream)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(ProviderError::Request(message)),
            None => Ok(EventPage {
                events: Vec::new(),
                next_token: token
                    .cloned()
                    .unwrap_or_else(|| ContinuationToken::new("T0")),
            }),
        }
    }
}

#[async_trait]
impl LogProvider for FakeProvider {
    async fn list_recent_streams(&self, _group: &str) -> Result<Vec<StreamSummary>, ProviderError> {
        *self.listing_count.lock().unwrap() += 1;
        match self.listings.lock().unwrap().pop_front() {
            Some(Ok(streams)) => Ok(streams),
            Some(Err(message)) => Err(ProviderError::Request(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_initial(
        &self,
        _group: &str,
        stream: &str,
        _limit: usize,
    ) -> Result<EventPage, ProviderError> {
        self.next_page(stream, None)
    }

    async fn fetch_from(
        &self,
        _group: &str,
        stream: &str,
        token: &ContinuationToken,
        _limit: usize,
    ) -> Result<EventPage, ProviderError> {
        self.next_page(stream, Some(token))
    }
}

pub fn page(messages: &[&str], token: &str) -> EventPage {
    let base = Utc::now();
    EventPage {
        events: messages
            .iter()
            .enumerate()
            .map(|(i, m)| LogEvent {
                timestamp: base + chrono::Duration::milliseconds(i as i64),
                message: m.to_string(),
            })
            .collect(),
        next_token: ContinuationToken::new(token),
    }
}

pub fn stream(name: &str, last_event: DateTime<Utc>) -> StreamSummary {
    StreamSummary {
        name: name.to_string(),
        last_event: Some(last_event),
    }
}

pub fn token(raw: &str) -> Option<ContinuationToken> {
    Some(ContinuationToken::new(raw))
}

/// Console stand-in that can be read after the sink is gone
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.bytes.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
