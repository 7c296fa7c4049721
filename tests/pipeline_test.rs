//! End-to-end runs of the harvester over a scripted site.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{MemorySink, Site, SiteSessions, ORIGIN};
use scrollharvest::crawler::Harvester;
use scrollharvest::domain::Entry;

#[tokio::test]
async fn test_single_entry_with_estimated_votes() {
    let site = Site::default().post("/r/rust/comments/1/first/", 10, 55, "axnu");
    let sink = Arc::new(MemorySink::default());
    let harvester = Harvester::new(SiteSessions::new(site), sink.clone());

    let result = harvester.run(1, 0, 1).await.unwrap();

    assert_eq!(result.entries.len(), 1);
    let entry = &result.entries[0];
    let url = format!("{ORIGIN}/r/rust/comments/1/first/");
    assert_eq!(entry.url(), url);
    assert_eq!(entry.id(), Entry::generate_id(&url));
    assert_eq!(entry.votes(), 100);
    assert_eq!(entry.comments(), 42);
    assert_eq!(entry.category(), "r/rust");
    assert_eq!(entry.author().username, "u/axnu");
    assert_eq!(entry.author().karma, 82_803);
    assert_eq!(entry.author().comment_karma, 215_184);
    assert_eq!(sink.stored(), 1);
}

#[tokio::test]
async fn test_duplicate_reference_counts_once() {
    let site = Site::default()
        .post("/r/rust/comments/1/first/", 10, 55, "axnu")
        .post("/r/rust/comments/1/first/", 10, 55, "axnu");
    let sink = Arc::new(MemorySink::default());
    let harvester = Harvester::new(SiteSessions::new(site), sink.clone());

    let result = harvester.run(2, 0, 2).await.unwrap();

    assert_eq!(result.entries.len(), 1);
    assert_eq!(sink.stored(), 1);
    assert_eq!(sink.submissions(), 2);
}

#[tokio::test]
async fn test_duplicate_reference_keeps_enumerating() {
    let site = Site::default()
        .post("/r/rust/comments/1/first/", 10, 55, "axnu")
        .post("/r/rust/comments/1/first/", 10, 55, "axnu")
        .post("/r/rust/comments/2/second/", 30, 75, "ferris");
    let sink = Arc::new(MemorySink::default());
    let harvester = Harvester::new(SiteSessions::new(site), sink.clone());

    let result = harvester.run(2, 0, 2).await.unwrap();

    assert_eq!(result.entries.len(), 2);
    let mut urls: Vec<_> = result.entries.iter().map(|e| e.url().to_string()).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{ORIGIN}/r/rust/comments/1/first/"),
            format!("{ORIGIN}/r/rust/comments/2/second/"),
        ]
    );
}

#[tokio::test]
async fn test_hidden_author_is_skipped() {
    let site = Site::default()
        .post("/r/rust/comments/1/a/", 10, 55, "axnu")
        .post("/r/rust/comments/2/b/", 10, 55, "hidden")
        .post("/r/rust/comments/3/c/", 10, 55, "ferris")
        .page("/user/hidden/", "<p>You must be 18+ to view this community</p>");
    let sink = Arc::new(MemorySink::default());
    let harvester = Harvester::new(SiteSessions::new(site), sink.clone());

    let result = harvester.run(3, 0, 3).await.unwrap();

    assert_eq!(result.entries.len(), 2);
    assert!(result
        .entries
        .iter()
        .all(|e| e.author().username != "u/hidden"));
}

#[tokio::test]
async fn test_fifty_percent_entry_is_skipped() {
    let site = Site::default()
        .post("/r/rust/comments/1/a/", 10, 50, "axnu")
        .post("/r/rust/comments/2/b/", 10, 55, "ferris");
    let sink = Arc::new(MemorySink::default());
    let harvester = Harvester::new(SiteSessions::new(site), sink.clone());

    let result = harvester.run(5, 0, 1).await.unwrap();

    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].author().username, "u/ferris");
}

#[tokio::test]
async fn test_offset_skips_leading_items() {
    let site = Site::default()
        .post("/r/rust/comments/1/a/", 10, 55, "axnu")
        .post("/r/rust/comments/2/b/", 10, 55, "ferris")
        .post("/r/rust/comments/3/c/", 10, 55, "crab");
    let sink = Arc::new(MemorySink::default());
    let harvester = Harvester::new(SiteSessions::new(site), sink);

    let result = harvester.run(10, 2, 1).await.unwrap();

    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].author().username, "u/crab");
}

#[tokio::test]
async fn test_unreachable_sink_fails_and_closes_every_session() {
    let site = Site::default()
        .post("/r/rust/comments/1/a/", 10, 55, "axnu")
        .post("/r/rust/comments/2/b/", 10, 55, "ferris");
    let sink = Arc::new(MemorySink::unreachable_after(0));
    let sessions = SiteSessions::new(site);
    let closed = sessions.closed.clone();
    let harvester = Harvester::new(sessions, sink);

    let err = harvester.run(2, 0, 2).await.unwrap_err();

    assert!(matches!(
        err,
        scrollharvest::app::HarvestError::SinkUnreachable(_)
    ));
    // One feed session plus two extractor sessions
    assert_eq!(closed.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_overflowing_rating_skips_only_that_entry() {
    let site = Site::default()
        .post("/r/rust/comments/1/a/", 200_000_000_000_000_000, 55, "axnu")
        .post("/r/rust/comments/2/b/", 10, 55, "ferris");
    let sessions = SiteSessions::new(site);
    let closed = sessions.closed.clone();
    let harvester = Harvester::new(sessions, Arc::new(MemorySink::default()));

    let result = harvester.run(2, 0, 2).await.unwrap();

    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].author().username, "u/ferris");
    assert_eq!(closed.load(Ordering::SeqCst), 3);
}
