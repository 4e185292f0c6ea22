//! Integration tests for rule-based smart playlists
//!
//! Smart playlists are evaluated live, so resolving twice around a library
//! change must see the change.

mod test_helpers;

use soul_core::storage::TrackMetadataStore;
use soul_core::types::*;
use soul_core::SoulError;
use soul_storage::smart_playlists::{RuleOperator, SmartRule};
use std::collections::HashSet;
use test_helpers::*;

async fn seed_library(test_db: &TestDb) {
    let tracks = vec![
        TrackRecord {
            artist: Some("Daft Punk".to_string()),
            year: Some(2001),
            bpm: Some(123.0),
            ..TrackRecord::new(TrackId::new("one-more-time"))
        },
        TrackRecord {
            artist: Some("Daft Punk".to_string()),
            year: Some(1997),
            bpm: Some(111.0),
            ..TrackRecord::new(TrackId::new("around-the-world"))
        },
        TrackRecord {
            artist: Some("Burial".to_string()),
            year: Some(2007),
            bpm: None,
            ..TrackRecord::new(TrackId::new("archangel"))
        },
        TrackRecord {
            artist: None,
            year: None,
            bpm: Some(174.0),
            ..TrackRecord::new(TrackId::new("untitled"))
        },
    ];
    soul_storage::tracks::upsert_many(test_db.pool(), &tracks)
        .await
        .unwrap();
}

fn ids(names: &[&str]) -> HashSet<TrackId> {
    names.iter().map(|n| TrackId::new(*n)).collect()
}

async fn resolve(test_db: &TestDb, id: &str) -> HashSet<TrackId> {
    test_db
        .context()
        .resolve_context(&PlaybackContext::smart_playlist(id))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_rules_are_anded() {
    let test_db = TestDb::new().await;
    seed_library(&test_db).await;

    soul_storage::smart_playlists::create(
        test_db.pool(),
        "daft-2000s",
        "Daft Punk after 2000",
        vec![
            SmartRule::new(SortField::Artist, RuleOperator::Contains, "daft"),
            SmartRule::new(SortField::Year, RuleOperator::Gte, "2000"),
        ],
    )
    .await
    .unwrap();

    assert_eq!(resolve(&test_db, "daft-2000s").await, ids(&["one-more-time"]));
}

#[tokio::test]
async fn test_missing_values_compare_as_sort_defaults() {
    let test_db = TestDb::new().await;
    seed_library(&test_db).await;

    soul_storage::smart_playlists::create(
        test_db.pool(),
        "mid-tempo",
        "Mid tempo",
        vec![
            SmartRule::new(SortField::Bpm, RuleOperator::Gte, "115"),
            SmartRule::new(SortField::Bpm, RuleOperator::Lte, "125"),
        ],
    )
    .await
    .unwrap();

    // archangel has no bpm and sorts as 120
    assert_eq!(
        resolve(&test_db, "mid-tempo").await,
        ids(&["one-more-time", "archangel"])
    );
}

#[tokio::test]
async fn test_text_equality_ignores_case() {
    let test_db = TestDb::new().await;
    seed_library(&test_db).await;

    soul_storage::smart_playlists::create(
        test_db.pool(),
        "burial",
        "Burial",
        vec![SmartRule::parse("artist=burial").unwrap()],
    )
    .await
    .unwrap();

    assert_eq!(resolve(&test_db, "burial").await, ids(&["archangel"]));
}

#[tokio::test]
async fn test_contains_treats_wildcards_literally() {
    let test_db = TestDb::new().await;
    let titled = |id: &str, title: &str| TrackRecord {
        title: Some(title.to_string()),
        ..TrackRecord::new(TrackId::new(id))
    };
    soul_storage::tracks::upsert_many(
        test_db.pool(),
        &[
            titled("pure", "100% Pure"),
            titled("thousand", "1000 Pure"),
            titled("snake", "snake_case"),
            titled("spaced", "snake case"),
        ],
    )
    .await
    .unwrap();

    soul_storage::smart_playlists::create(
        test_db.pool(),
        "percent",
        "Percent",
        vec![SmartRule::parse("title~100%").unwrap()],
    )
    .await
    .unwrap();
    soul_storage::smart_playlists::create(
        test_db.pool(),
        "underscore",
        "Underscore",
        vec![SmartRule::parse("title~e_c").unwrap()],
    )
    .await
    .unwrap();

    assert_eq!(resolve(&test_db, "percent").await, ids(&["pure"]));
    assert_eq!(resolve(&test_db, "underscore").await, ids(&["snake"]));
}

#[tokio::test]
async fn test_injection_attempt_is_just_a_value() {
    let test_db = TestDb::new().await;
    seed_library(&test_db).await;

    soul_storage::smart_playlists::create(
        test_db.pool(),
        "sneaky",
        "Sneaky",
        vec![SmartRule::new(
            SortField::Title,
            RuleOperator::Eq,
            "' OR 1=1; DROP TABLE tracks; --",
        )],
    )
    .await
    .unwrap();

    assert!(resolve(&test_db, "sneaky").await.is_empty());
    assert_eq!(soul_storage::tracks::count(test_db.pool()).await.unwrap(), 4);
}

#[tokio::test]
async fn test_smart_playlist_is_evaluated_live() {
    let test_db = TestDb::new().await;
    seed_library(&test_db).await;
    soul_storage::smart_playlists::create(
        test_db.pool(),
        "fast",
        "Fast",
        vec![SmartRule::parse("bpm>150").unwrap()],
    )
    .await
    .unwrap();
    assert_eq!(resolve(&test_db, "fast").await, ids(&["untitled"]));

    soul_storage::tracks::upsert(
        test_db.pool(),
        &TrackRecord {
            bpm: Some(170.0),
            ..TrackRecord::new(TrackId::new("amen"))
        },
    )
    .await
    .unwrap();

    assert_eq!(resolve(&test_db, "fast").await, ids(&["untitled", "amen"]));
}

#[tokio::test]
async fn test_rule_round_trip_and_delete() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let rules = vec![
        SmartRule::new(SortField::EloRating, RuleOperator::Gt, "1600"),
        SmartRule::new(SortField::Key, RuleOperator::Eq, "8A"),
    ];
    soul_storage::smart_playlists::create(pool, "top", "Top rated", rules.clone())
        .await
        .unwrap();

    let loaded = soul_storage::smart_playlists::get_by_id(pool, "top")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.rules, rules);

    assert!(soul_storage::smart_playlists::delete(pool, "top").await.unwrap());
    assert!(resolve(&test_db, "top").await.is_empty());
}

#[tokio::test]
async fn test_invalid_rule_is_rejected_before_write() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let result = soul_storage::smart_playlists::create(
        pool,
        "bad",
        "Bad",
        vec![SmartRule::new(SortField::Year, RuleOperator::Eq, "last year")],
    )
    .await;

    assert!(matches!(result, Err(SoulError::InvalidInput(_))));
    assert!(soul_storage::smart_playlists::get_by_id(pool, "bad")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_corrupt_stored_rule_resolves_empty() {
    let test_db = TestDb::new().await;
    seed_library(&test_db).await;
    soul_storage::smart_playlists::create(test_db.pool(), "all", "Everything", Vec::new())
        .await
        .unwrap();
    assert_eq!(resolve(&test_db, "all").await.len(), 4);

    sqlx::query(
        "INSERT INTO smart_playlist_rules (smart_playlist_id, position, field, operator, value)
         VALUES ('all', 0, 'mood', 'eq', 'happy')",
    )
    .execute(test_db.pool())
    .await
    .unwrap();

    assert!(resolve(&test_db, "all").await.is_empty());
}
