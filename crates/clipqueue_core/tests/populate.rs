use std::cell::Cell;
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc, Once};

use clipqueue_core::{
    ChannelProgressSink, DiscoveredVideo, FailureKind, ListKey, MemoryListStore, NullProgress,
    ProgressEvent, QueueManager, QueueSettings, ToolError, VideoRecord,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn hit(title: &str, id: &str) -> DiscoveredVideo {
    DiscoveredVideo::new(title, format!("https://www.youtube.com/watch?v={id}"))
}

fn queries(items: &[&str]) -> Vec<String> {
    items.iter().map(|q| q.to_string()).collect()
}

fn manager(store: MemoryListStore) -> QueueManager<MemoryListStore> {
    QueueManager::new(store, QueueSettings::default())
}

#[test]
fn known_urls_are_never_added_again() {
    init_logging();
    let store = MemoryListStore::new()
        .with_list(
            ListKey::Downloaded,
            vec![VideoRecord::downloaded(
                "Samurai duel in the rain",
                "https://www.youtube.com/watch?v=aaa",
                "videos/samurai.mp4".into(),
            )],
        )
        .with_list(
            ListKey::Pending,
            vec![VideoRecord::pending(
                "Ninja ambush at midnight",
                "https://www.youtube.com/watch?v=bbb",
            )],
        );
    let queue = manager(store);

    let discover = |_query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        Ok(vec![
            hit("Completely different wording here", "aaa"),
            hit("Another unrelated caption", "bbb"),
            hit("Kung fu master training montage", "ccc"),
        ])
    };

    let added = queue
        .populate(&queries(&["fight scene"]), 10, &discover, &NullProgress)
        .unwrap();

    assert!(added);
    let pending = queue.store().snapshot(ListKey::Pending);
    assert_eq!(
        pending,
        vec![
            VideoRecord::pending("Ninja ambush at midnight", "https://www.youtube.com/watch?v=bbb"),
            VideoRecord::pending(
                "Kung fu master training montage",
                "https://www.youtube.com/watch?v=ccc"
            ),
        ]
    );
    assert_eq!(queue.store().save_count(ListKey::Pending), 1);
    assert_eq!(queue.store().save_count(ListKey::Downloaded), 0);
}

#[test]
fn similar_titles_are_excluded_and_nothing_is_written() {
    init_logging();
    let store = MemoryListStore::new().with_list(
        ListKey::Downloaded,
        vec![VideoRecord::downloaded(
            "Best Fight Scene",
            "https://www.youtube.com/watch?v=old",
            "videos/best.mp4".into(),
        )],
    );
    let queue = manager(store);
    let discover = |_query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        Ok(vec![hit("Best Fight Scenes", "new")])
    };

    let added = queue
        .populate(&queries(&["best fight"]), 5, &discover, &NullProgress)
        .unwrap();

    assert!(!added);
    assert!(queue.store().snapshot(ListKey::Pending).is_empty());
    assert_eq!(queue.store().save_count(ListKey::Pending), 0);
}

#[test]
fn overlapping_queries_add_each_video_once() {
    init_logging();
    let queue = manager(MemoryListStore::new());
    let discover = |_query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        Ok(vec![
            hit("Samurai duel in the rain", "s1"),
            hit("Ninja ambush at midnight", "n1"),
            hit("Kung fu master training montage", "k1"),
        ])
    };

    let added = queue
        .populate(&queries(&["a", "a"]), 5, &discover, &NullProgress)
        .unwrap();

    assert!(added);
    let urls: Vec<String> = queue
        .store()
        .snapshot(ListKey::Pending)
        .into_iter()
        .map(|record| record.url)
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://www.youtube.com/watch?v=s1",
            "https://www.youtube.com/watch?v=n1",
            "https://www.youtube.com/watch?v=k1",
        ]
    );
    assert_eq!(queue.store().save_count(ListKey::Pending), 1);
}

#[test]
fn duplicates_within_one_result_set_are_suppressed() {
    init_logging();
    let queue = manager(MemoryListStore::new());
    let discover = |_query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        Ok(vec![
            hit("Epic superhero battle finale", "x1"),
            hit("Some other title entirely", "x1"),
            hit("Epic Superhero Battle Finales", "x2"),
        ])
    };

    queue
        .populate(&queries(&["superhero"]), 5, &discover, &NullProgress)
        .unwrap();

    let pending = queue.store().snapshot(ListKey::Pending);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "Epic superhero battle finale");
}

#[test]
fn results_beyond_the_limit_are_ignored() {
    init_logging();
    let queue = manager(MemoryListStore::new());
    let discover = |_query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        Ok(vec![
            hit("Samurai duel in the rain", "s1"),
            hit("Ninja ambush at midnight", "n1"),
            hit("Kung fu master training montage", "k1"),
        ])
    };

    queue
        .populate(&queries(&["q"]), 2, &discover, &NullProgress)
        .unwrap();

    assert_eq!(queue.store().snapshot(ListKey::Pending).len(), 2);
}

#[test]
fn failed_discovery_is_reported_and_later_queries_continue() {
    init_logging();
    let queue = manager(MemoryListStore::new());
    let discover = |query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        if query == "broken" {
            Err(ToolError::new(FailureKind::ExitStatus(Some(1)), "HTTP Error 429"))
        } else {
            Ok(vec![hit("Kung fu master training montage", "k1")])
        }
    };
    let (tx, rx) = mpsc::channel();
    let sink = ChannelProgressSink::new(tx);

    let added = queue
        .populate(&queries(&["broken", "working"]), 5, &discover, &sink)
        .unwrap();

    assert!(added);
    assert_eq!(queue.store().snapshot(ListKey::Pending).len(), 1);

    let events: Vec<ProgressEvent> = rx.try_iter().collect();
    assert!(events.iter().any(|event| matches!(
        event,
        ProgressEvent::Status(message) if message.starts_with("Error searching for 'broken'")
    )));
    let percents: Vec<f64> = events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Percent(value) => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![50.0, 100.0]);
}

#[test]
fn empty_discovery_everywhere_writes_nothing() {
    init_logging();
    let queue = manager(MemoryListStore::new());
    let discover = |_query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        Ok(Vec::new())
    };

    let added = queue
        .populate(&queries(&["one", "two"]), 5, &discover, &NullProgress)
        .unwrap();

    assert!(!added);
    assert_eq!(queue.store().save_count(ListKey::Pending), 0);
}

#[test]
fn cancelled_run_skips_remaining_queries() {
    init_logging();
    let cancel = Arc::new(AtomicBool::new(true));
    let queue = manager(MemoryListStore::new()).with_cancel_flag(cancel);
    let calls = Cell::new(0);
    let discover = |_query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        calls.set(calls.get() + 1);
        Ok(vec![hit("Samurai duel in the rain", "s1")])
    };

    let added = queue
        .populate(&queries(&["one", "two"]), 5, &discover, &NullProgress)
        .unwrap();

    assert!(!added);
    assert_eq!(calls.get(), 0);
}

#[test]
fn candidates_without_an_absolute_url_are_skipped() {
    init_logging();
    let queue = manager(MemoryListStore::new());
    let (tx, rx) = mpsc::channel();
    let discover = |_query: &str, _limit: usize| -> Result<Vec<DiscoveredVideo>, ToolError> {
        Ok(vec![
            DiscoveredVideo::new("Samurai duel", "dQw4w9WgXcQ"),
            DiscoveredVideo::new("Ninja ambush", ""),
            hit("Kung fu master training montage", "k1"),
        ])
    };

    let added = queue
        .populate(&queries(&["fight"]), 5, &discover, &ChannelProgressSink::new(tx))
        .unwrap();

    assert!(added);
    assert_eq!(
        queue.store().snapshot(ListKey::Pending),
        vec![VideoRecord::pending(
            "Kung fu master training montage",
            "https://www.youtube.com/watch?v=k1"
        )]
    );
    let skipped = rx
        .try_iter()
        .filter(|event| {
            matches!(event, ProgressEvent::Status(message) if message.starts_with("Excluding (invalid url"))
        })
        .count();
    assert_eq!(skipped, 2);
}
