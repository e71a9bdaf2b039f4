mod common;

use baton_library::{LibraryAggregator, LibraryStore};
use common::{entries, FakeLibrary};

#[tokio::test]
async fn test_aggregated_index_survives_a_save() {
    let library = FakeLibrary::new(2)
        .with_playlist("A", entries(&["t1", "t2", "t3"]))
        .with_playlist("B", entries(&["t3", "t1"]));
    let index = LibraryAggregator::new(&library)
        .run()
        .await
        .unwrap()
        .into_result()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = LibraryStore::new(dir.path().join("baton").join("library.json"));
    store.save(&index).unwrap();

    let restored = store.load().unwrap();
    assert_eq!(restored, index);
    assert_eq!(restored.get("t3").unwrap().playlist_ids(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_saved_file_is_keyed_by_track_id() {
    let library = FakeLibrary::new(10).with_playlist("A", entries(&["t1"]));
    let index = LibraryAggregator::new(&library).run().await.unwrap().index;

    let dir = tempfile::tempdir().unwrap();
    let store = LibraryStore::new(dir.path().join("library.json"));
    store.save(&index).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["t1"]["id"], "t1");
    assert_eq!(raw["t1"]["name"], "Track t1");
    assert_eq!(raw["t1"]["playlists"][0]["playlist_id"], "A");
    assert_eq!(raw["t1"]["playlists"][0]["owner"]["id"], "owner-A");
}

#[tokio::test]
async fn test_partial_index_is_still_saved() {
    let library = FakeLibrary::new(10)
        .with_playlist("A", entries(&["t1"]))
        .with_playlist("B", entries(&["t2"]))
        .failing_playlist("B", 0);
    let partial = LibraryAggregator::new(&library)
        .run()
        .await
        .unwrap()
        .into_result()
        .unwrap_err();

    let dir = tempfile::tempdir().unwrap();
    let store = LibraryStore::new(dir.path().join("library.json"));
    store.save(&partial.index).unwrap();

    let restored = store.load().unwrap();
    assert!(restored.contains("t1"));
    assert!(!restored.contains("t2"));
}
