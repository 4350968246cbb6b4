use mig::checkpoint::{CheckpointStore, MemoryCheckpointStore, RunKind};

#[tokio::test]
async fn worker_offset_protocol_roundtrips() {
    let store = MemoryCheckpointStore::new();
    let table = "orders";

    // An absent key means "not yet started": the worker writes zero and
    // begins from the start.
    let mut offset = match store.get(table).await.unwrap() {
        Some(offset) => offset,
        None => {
            store.set(table, 0).await.unwrap();
            0
        }
    };
    assert_eq!(offset, 0);
    assert_eq!(store.get(table).await.unwrap(), Some(0));

    // Each batch advances the offset by its stride.
    for _ in 0..3 {
        offset += 1000;
        store.set(table, offset).await.unwrap();
    }
    assert_eq!(store.get(table).await.unwrap(), Some(3000));

    // Clean completion resets the offset to zero.
    store.set(table, 0).await.unwrap();
    assert_eq!(store.get(table).await.unwrap(), Some(0));
}

#[tokio::test]
async fn resumed_worker_picks_up_the_persisted_offset() {
    let store = MemoryCheckpointStore::new();
    store.set("orders", 1000).await.unwrap();

    let offset = store.get("orders").await.unwrap();
    assert_eq!(offset, Some(1000));
}

#[tokio::test]
async fn run_markers_are_distinct_per_run_kind() {
    let store = MemoryCheckpointStore::new();

    assert_eq!(RunKind::Copy.marker_key(), "DataCopyTimeNano");
    assert_eq!(RunKind::Sync.marker_key(), "StartTimeNano");

    let previous = store
        .get_and_set(RunKind::Copy.marker_key(), 42)
        .await
        .unwrap();
    assert_eq!(previous, None);
    assert_eq!(
        store.get(RunKind::Sync.marker_key()).await.unwrap(),
        None,
        "copy and sync markers must not alias"
    );

    store.clear(RunKind::Copy.marker_key()).await.unwrap();
    assert_eq!(store.get(RunKind::Copy.marker_key()).await.unwrap(), None);
}
