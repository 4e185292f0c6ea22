//! Integration tests for the tracks vertical slice

mod test_helpers;

use soul_core::storage::TrackMetadataStore;
use soul_core::types::*;
use test_helpers::*;

#[tokio::test]
async fn test_upsert_and_get_track() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let record = TrackRecord {
        title: Some("Windowlicker".to_string()),
        artist: Some("Aphex Twin".to_string()),
        album: Some("Windowlicker".to_string()),
        year: Some(1999),
        bpm: Some(127.5),
        key: Some("8A".to_string()),
        elo_rating: Some(1620.0),
        track_number: Some(1),
        ..TrackRecord::new(TrackId::new("wl"))
    };
    soul_storage::tracks::upsert(pool, &record).await.unwrap();

    let loaded = soul_storage::tracks::get_by_id(pool, &TrackId::new("wl"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, record);
}

#[tokio::test]
async fn test_upsert_replaces_metadata() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    soul_storage::tracks::upsert(pool, &track("a", 1)).await.unwrap();
    let updated = TrackRecord {
        bpm: Some(90.0),
        ..track("a", 4)
    };
    soul_storage::tracks::upsert(pool, &updated).await.unwrap();

    let loaded = soul_storage::tracks::get_by_id(pool, &TrackId::new("a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.track_number, Some(4));
    assert_eq!(loaded.bpm, Some(90.0));
    assert_eq!(soul_storage::tracks::count(pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_missing_metadata_stays_absent() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    soul_storage::tracks::upsert(pool, &TrackRecord::new(TrackId::new("bare")))
        .await
        .unwrap();

    let loaded = soul_storage::tracks::get_by_id(pool, &TrackId::new("bare"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.bpm, None);
    assert_eq!(loaded.title, None);
}

#[tokio::test]
async fn test_fetch_metadata_preserves_requested_order() {
    let test_db = TestDb::new().await;
    let ids = create_numbered_playlist(test_db.pool(), "p1", 10).await;
    let storage = test_db.context();

    let requested = vec![
        ids[7].clone(),
        ids[2].clone(),
        TrackId::new("deleted"),
        ids[9].clone(),
        ids[0].clone(),
    ];
    let records = storage.fetch_metadata(&requested, true).await.unwrap();

    let got: Vec<TrackId> = records.into_iter().map(|t| t.id).collect();
    assert_eq!(got, vec![ids[7].clone(), ids[2].clone(), ids[9].clone(), ids[0].clone()]);
}

#[tokio::test]
async fn test_fetch_metadata_handles_more_ids_than_one_query() {
    let test_db = TestDb::new().await;
    let ids = create_numbered_playlist(test_db.pool(), "p1", 1200).await;
    let storage = test_db.context();

    let mut requested = ids.clone();
    requested.reverse();
    let records = storage.fetch_metadata(&requested, true).await.unwrap();
    assert_eq!(records.len(), 1200);
    assert_eq!(records[0].id, ids[1199]);

    let unordered = storage.fetch_metadata(&ids, false).await.unwrap();
    assert_eq!(unordered.len(), 1200);
}

#[tokio::test]
async fn test_fetch_metadata_with_no_ids() {
    let test_db = TestDb::new().await;
    let storage = test_db.context();

    assert!(storage.fetch_metadata(&[], true).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_track_removes_memberships() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let ids = create_numbered_playlist(pool, "p1", 3).await;

    assert!(soul_storage::tracks::delete(pool, &ids[1]).await.unwrap());

    let remaining = soul_storage::playlists::get_track_ids(pool, "p1").await.unwrap();
    assert_eq!(remaining, vec![ids[0].clone(), ids[2].clone()]);
    assert!(!soul_storage::tracks::delete(pool, &ids[1]).await.unwrap());
}
