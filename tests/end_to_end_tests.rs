//! Full sessions: supervisor, watcher, tailers and sink against a fake log
//! service, on a paused clock.

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use cloudtail::config::Config;
use cloudtail::sink::OutputSink;
use cloudtail::supervisor::{Supervisor, Target};
use common::{page, stream, token, FakeProvider, SharedBuffer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_single_stream_prints_initial_batch_then_backs_off() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_page("s1", page(&["hello", "world"], "T1"))
            .with_page("s1", page(&[], "T1")),
    );
    let console = SharedBuffer::default();

    Supervisor::new("g1", provider.clone(), Config::default())
        .run(
            Target::Stream("s1".to_string()),
            OutputSink::new(console.clone()),
            sleep(Duration::from_secs(12)),
        )
        .await
        .unwrap();

    assert_eq!(console.contents(), "\n==> s1 <==\nhello\nworld\n");

    let calls = provider.calls_for("s1");
    let tokens: Vec<_> = calls.iter().map(|c| c.token.clone()).collect();
    assert_eq!(tokens, vec![None, token("T1"), token("T1"), token("T1")]);

    // Initial and first cursor fetch back to back, then one pause per idle answer
    let start = calls[0].at;
    let offsets: Vec<_> = calls.iter().map(|c| c.at - start).collect();
    assert_eq!(
        offsets,
        vec![
            Duration::ZERO,
            Duration::ZERO,
            Duration::from_secs(5),
            Duration::from_secs(10),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_group_mode_skips_streams_outside_activity_window() {
    let now = Utc::now();
    let provider = Arc::new(
        FakeProvider::new()
            .with_listing(vec![
                stream("s1", now),
                stream("s2", now - ChronoDuration::hours(25)),
            ])
            .with_page("s1", page(&["only s1"], "T1")),
    );
    let console = SharedBuffer::default();

    Supervisor::new("g1", provider.clone(), Config::default())
        .run(
            Target::Group,
            OutputSink::new(console.clone()),
            sleep(Duration::from_secs(1)),
        )
        .await
        .unwrap();

    assert!(!provider.calls_for("s1").is_empty());
    assert!(provider.calls_for("s2").is_empty());
    assert_eq!(console.contents(), "\n==> s1 <==\nonly s1\n");
}

#[tokio::test(start_paused = true)]
async fn test_stream_order_preserved_across_fetches() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_page("s1", page(&["1", "2"], "T1"))
            .with_page("s1", page(&["3", "4", "5"], "T2"))
            .with_page("s1", page(&[], "T2"))
            .with_page("s1", page(&["6"], "T3")),
    );
    let console = SharedBuffer::default();

    Supervisor::new("g1", provider, Config::default())
        .run(
            Target::Stream("s1".to_string()),
            OutputSink::new(console.clone()),
            sleep(Duration::from_secs(30)),
        )
        .await
        .unwrap();

    let messages: Vec<String> = console
        .contents()
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with("==>"))
        .map(str::to_string)
        .collect();
    assert_eq!(messages, vec!["1", "2", "3", "4", "5", "6"]);
}

#[tokio::test(start_paused = true)]
async fn test_group_mode_picks_up_streams_on_later_polls() {
    let now = Utc::now();
    let provider = Arc::new(
        FakeProvider::new()
            .with_listing(vec![stream("s1", now)])
            .with_listing(vec![stream("s2", now), stream("s1", now)])
            .with_page("s1", page(&["from s1"], "A1"))
            .with_page("s2", page(&["from s2"], "B1")),
    );
    let console = SharedBuffer::default();

    // Second discovery round runs at 60s
    Supervisor::new("g1", provider.clone(), Config::default())
        .run(
            Target::Group,
            OutputSink::new(console.clone()),
            sleep(Duration::from_secs(61)),
        )
        .await
        .unwrap();

    assert_eq!(provider.listing_count(), 2);
    let initial_fetches = provider
        .calls()
        .into_iter()
        .filter(|c| c.token.is_none())
        .count();
    assert_eq!(initial_fetches, 2);
    assert_eq!(
        console.contents(),
        "\n==> s1 <==\nfrom s1\n\n==> s2 <==\nfrom s2\n"
    );
}
