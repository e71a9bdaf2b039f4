mod common;

use baton_library::{
    AggregationEvent, AggregatorConfig, CancellationState, EventBroadcaster, FetchError,
    FetchErrorKind, LibraryAggregator, LibraryError,
};
use common::{entries, entry, FakeLibrary};

#[test_log::test(tokio::test)]
async fn test_tracks_shared_between_playlists_accumulate_memberships() {
    let library = FakeLibrary::new(50)
        .with_playlist("A", entries(&["t1", "t2"]))
        .with_playlist("B", entries(&["t1"]));

    let aggregation = LibraryAggregator::new(&library).run().await.unwrap();

    assert!(aggregation.is_complete());
    let index = aggregation.into_result().unwrap();
    assert_eq!(index.len(), 2);

    let t1 = index.get("t1").unwrap();
    let owners: Vec<&str> = t1.playlists.iter().map(|m| m.playlist_id.as_str()).collect();
    assert_eq!(owners, vec!["A", "B"]);
    assert_eq!(t1.track.name, "Track t1");

    let t2 = index.get("t2").unwrap();
    assert_eq!(t2.playlists.len(), 1);
    assert_eq!(t2.playlists[0].playlist_id, "A");
}

#[tokio::test]
async fn test_each_membership_keeps_its_playlist_metadata() {
    let library = FakeLibrary::new(50)
        .with_playlist("A", vec![entry("t1", "2020-01-01T00:00:00Z")])
        .with_playlist("B", vec![entry("t1", "2021-02-02T00:00:00Z")])
        .with_playlist("C", vec![entry("t1", "2022-03-03T00:00:00Z")]);

    let index = LibraryAggregator::new(&library)
        .run()
        .await
        .unwrap()
        .into_result()
        .unwrap();

    let memberships = &index.get("t1").unwrap().playlists;
    assert_eq!(memberships.len(), 3);
    for (membership, (id, year)) in memberships
        .iter()
        .zip([("A", "2020"), ("B", "2021"), ("C", "2022")])
    {
        assert_eq!(membership.playlist_id, id);
        assert_eq!(membership.name, format!("Playlist {id}"));
        assert_eq!(membership.uri, format!("spotify:playlist:{id}"));
        assert_eq!(membership.owner.id, format!("owner-{id}"));
        assert_eq!(membership.added_by.as_ref().unwrap().id, "curator");
        assert!(membership
            .added_at
            .unwrap()
            .to_rfc3339()
            .starts_with(year));
    }
}

#[tokio::test]
async fn test_duplicate_within_playlist_yields_two_memberships() {
    let library = FakeLibrary::new(2).with_playlist(
        "A",
        vec![
            entry("t1", "2020-01-01T00:00:00Z"),
            entry("t2", "2020-01-02T00:00:00Z"),
            entry("t1", "2020-01-03T00:00:00Z"),
        ],
    );

    let index = LibraryAggregator::new(&library)
        .run()
        .await
        .unwrap()
        .into_result()
        .unwrap();

    let memberships = &index.get("t1").unwrap().playlists;
    assert_eq!(memberships.len(), 2);
    assert!(memberships.iter().all(|m| m.playlist_id == "A"));
    assert!(memberships[0].added_at < memberships[1].added_at);
}

#[test_log::test(tokio::test)]
async fn test_failed_playlist_is_isolated() {
    let library = FakeLibrary::new(2)
        .with_playlist("P1", entries(&["shared", "a"]))
        .with_playlist("P2", entries(&["b"]))
        .with_playlist("P3", entries(&["shared", "c", "only-in-p3", "d"]))
        .with_playlist("P4", entries(&["e", "shared"]))
        .failing_playlist("P3", 1);

    let aggregation = LibraryAggregator::new(&library).run().await.unwrap();

    assert!(!aggregation.cancelled);
    assert_eq!(aggregation.failed_playlist_ids(), vec!["P3"]);
    assert!(matches!(
        aggregation.failures[0].error.fetch_kind(),
        Some(FetchErrorKind::Network)
    ));

    let index = &aggregation.index;
    assert!(index.contains("a"));
    assert!(index.contains("b"));
    assert!(index.contains("e"));
    // The first page of P3 was fetched but must not be folded.
    assert_eq!(library.track_fetches("P3"), 2);
    assert!(!index.contains("c"));
    assert!(!index.contains("only-in-p3"));
    let shared: Vec<&str> = index
        .get("shared")
        .unwrap()
        .playlists
        .iter()
        .map(|m| m.playlist_id.as_str())
        .collect();
    assert_eq!(shared, vec!["P1", "P4"]);

    let partial = aggregation.into_result().unwrap_err();
    assert_eq!(partial.failed_playlist_ids(), vec!["P3"]);
    assert_eq!(partial.index.len(), 4);
    assert!(!partial.cancelled);
}

#[tokio::test]
async fn test_no_playlists_means_empty_index() {
    let library = FakeLibrary::new(10);

    let aggregation = LibraryAggregator::new(&library).run().await.unwrap();

    assert!(aggregation.is_complete());
    assert!(aggregation.index.is_empty());
    assert!(aggregation.failures.is_empty());
}

#[tokio::test]
async fn test_empty_playlist_contributes_nothing() {
    let library = FakeLibrary::new(10)
        .with_playlist("empty", Vec::new())
        .with_playlist("full", entries(&["t1"]));

    let aggregation = LibraryAggregator::new(&library).run().await.unwrap();

    assert!(aggregation.is_complete());
    assert_eq!(aggregation.index.membership_count(), 1);
    assert_eq!(library.track_fetches("empty"), 1);
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let library = FakeLibrary::new(10)
        .with_playlist("A", entries(&["t1"]))
        .failing_listing(FetchError::AuthFailure("401 token expired".to_string()));

    let result = LibraryAggregator::new(&library).run().await;

    match result {
        Err(error) => assert_eq!(error.fetch_kind(), Some(FetchErrorKind::AuthFailure)),
        Ok(aggregation) => panic!("Expected failure, got {aggregation:?}"),
    }
    assert_eq!(library.track_fetches("A"), 0);
}

fn large_library() -> FakeLibrary {
    FakeLibrary::new(3)
        .with_playlist("A", entries(&["t1", "t2", "t3", "t4", "t5"]))
        .with_playlist("B", entries(&["t2", "t4", "t6"]))
        .with_playlist("C", entries(&["t1", "t1", "t7"]))
        .with_playlist("D", Vec::new())
        .with_playlist("E", entries(&["t7", "t8", "t9", "t2"]))
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let library = large_library();

    let first = LibraryAggregator::new(&library).run().await.unwrap();
    let second = LibraryAggregator::new(&library).run().await.unwrap();

    assert!(first.index.same_memberships(&second.index));
    assert_eq!(first.index, second.index);
}

#[tokio::test]
async fn test_concurrency_does_not_change_the_index() {
    let library = large_library();

    let sequential = LibraryAggregator::new(&library).run().await.unwrap();
    let concurrent = LibraryAggregator::new(&library)
        .with_config(AggregatorConfig::new().with_concurrency(4))
        .run()
        .await
        .unwrap();

    assert!(concurrent.is_complete());
    assert!(sequential.index.same_memberships(&concurrent.index));
    assert_eq!(concurrent.index.get("t1").unwrap().playlists.len(), 3);
}

#[tokio::test]
async fn test_subset_aggregation() {
    let library = large_library();
    let chosen: Vec<_> = library
        .playlists()
        .iter()
        .filter(|playlist| playlist.id == "B" || playlist.id == "E")
        .cloned()
        .collect();

    let aggregation = LibraryAggregator::new(&library)
        .aggregate_playlists(&chosen)
        .await;

    assert!(aggregation.is_complete());
    assert!(!aggregation.index.contains("t1"));
    assert_eq!(aggregation.index.get("t2").unwrap().playlists.len(), 2);
    assert_eq!(library.track_fetches("A"), 0);
}

#[test_log::test(tokio::test)]
async fn test_cancellation_returns_consistent_partial_index() {
    let cancel = CancellationState::new();
    let library = FakeLibrary::new(2)
        .with_playlist("P1", entries(&["a", "b", "c"]))
        .with_playlist("P2", entries(&["d", "e", "f"]))
        .with_playlist("P3", entries(&["g"]))
        .cancel_while_fetching("P2", cancel.clone());

    let aggregation = LibraryAggregator::new(&library)
        .with_cancellation(cancel)
        .run()
        .await
        .unwrap();

    assert!(aggregation.cancelled);
    assert!(aggregation.failures.is_empty());
    // P1 completed before the interrupt; P2 was interrupted mid-walk and is
    // left out entirely; P3 never started.
    assert_eq!(aggregation.index.len(), 3);
    assert!(aggregation.index.contains("c"));
    assert!(!aggregation.index.contains("d"));
    assert_eq!(library.track_fetches("P2"), 1);
    assert_eq!(library.track_fetches("P3"), 0);

    let partial = aggregation.into_result().unwrap_err();
    assert!(partial.cancelled);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let cancel = CancellationState::new();
    cancel.cancel();
    let library = large_library();

    let aggregation = LibraryAggregator::new(&library)
        .with_cancellation(cancel)
        .run()
        .await
        .unwrap();

    assert!(aggregation.cancelled);
    assert!(aggregation.index.is_empty());
    assert!(library.requests().is_empty());
}

#[tokio::test]
async fn test_reporter_receives_run_events() {
    let library = FakeLibrary::new(10)
        .with_playlist("ok", entries(&["t1", "t2"]))
        .with_playlist("broken", entries(&["t3"]))
        .failing_playlist("broken", 0);
    let broadcaster = EventBroadcaster::new();
    let mut events = broadcaster.subscribe();

    LibraryAggregator::new(&library)
        .with_reporter(&broadcaster)
        .run()
        .await
        .unwrap();

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert_eq!(received.len(), 5);
    assert!(matches!(received[0], AggregationEvent::Started { .. }));
    assert!(matches!(
        received[1],
        AggregationEvent::PlaylistsListed { count: 2, .. }
    ));
    match &received[2] {
        AggregationEvent::PlaylistCompleted {
            playlist_id,
            entries,
            ..
        } => {
            assert_eq!(playlist_id, "ok");
            assert_eq!(*entries, 2);
        }
        other => panic!("Unexpected event {other:?}"),
    }
    match &received[3] {
        AggregationEvent::PlaylistFailed {
            playlist_id, error, ..
        } => {
            assert_eq!(playlist_id, "broken");
            assert!(error.contains("connection reset"));
        }
        other => panic!("Unexpected event {other:?}"),
    }
    assert!(matches!(received[4], AggregationEvent::Stopped { .. }));
}

#[tokio::test]
async fn test_fetch_errors_name_the_playlist() {
    let library = FakeLibrary::new(10)
        .with_playlist("gone", entries(&["t1"]))
        .failing_playlist("gone", 0);

    let aggregation = LibraryAggregator::new(&library).run().await.unwrap();

    match &aggregation.failures[0].error {
        LibraryError::Fetch { resource, .. } => assert_eq!(resource, "playlist gone tracks"),
        other => panic!("Unexpected error {other:?}"),
    }
    assert_eq!(aggregation.failures[0].playlist_name, "Playlist gone");
}
