//! Whole-run properties over the drifted fixture.
//!
//! The fixture exercises every recoverable anomaly at least once, so a clean
//! second run over the first run's output shows each repair is stable.

use std::collections::BTreeSet;

use bpdb_core::prelude::*;
use bpdb_core::reconcile::tags::TagPath;
use serde_json::json;

const DRIFTED: &[u8] = include_bytes!("../../../tests/fixtures/drifted.json");

fn cleanse(bytes: &[u8]) -> Cleansed {
    cleanse_bytes(bytes, &ReconcileConfig::default()).unwrap()
}

#[test]
fn drifted_fixture_counts() {
    let out = cleanse(DRIFTED);
    let s = &out.reconciled.stats;

    assert_eq!(s.count(Anomaly::BlueprintMissingAuthor), 1);
    assert_eq!(s.count(Anomaly::UserMissingAuthoredBlueprint), 1);
    assert_eq!(s.count(Anomaly::FavoriteOnlyInBlueprint), 1);
    assert_eq!(s.count(Anomaly::FavoritedOwnBlueprint), 1);
    assert_eq!(s.count(Anomaly::UserFavoriteMissingBlueprint), 1);
    assert_eq!(s.count(Anomaly::BlueprintFavoriteUnknownUser), 1);
    assert_eq!(s.count(Anomaly::TagMissingFromBlueprint), 1);
    assert_eq!(s.count(Anomaly::TagIndexMissingBlueprint), 1);
    assert_eq!(s.count(Anomaly::BlueprintFavoriteCountMismatch), 2);
    assert_eq!(s.count(Anomaly::SummaryFavoriteCountMismatch), 1);
    assert_eq!(s.count(Anomaly::SummaryMissing), 1);
    assert_eq!(s.total_anomalies(), 12);

    let c = &s.census;
    assert_eq!(c.total_blueprints, 3);
    assert_eq!(c.blueprints_with_filename, 1);
    assert_eq!(c.total_users, 5);
    assert_eq!(c.users_with_no_display_name, 3);
    assert_eq!(c.users_with_provider_display_name, 1);
    assert_eq!(c.users_with_no_email, 3);
    assert_eq!(c.users_with_nothing, 1);
    assert_eq!(c.privates_derived, 2);
}

#[test]
fn second_run_is_clean_and_byte_identical() {
    let first = cleanse(DRIFTED);
    let second = cleanse(&first.output);

    assert!(second.reconciled.stats.is_clean(), "{:?}", second.reconciled.stats);
    assert_eq!(first.output, second.output);
}

#[test]
fn favorites_are_symmetric_and_never_self() {
    let db = cleanse(DRIFTED).reconciled.database;

    // User side is the only exported copy; rebuild the blueprint side from it.
    let mut edges = BTreeSet::new();
    for (user, record) in &db.users {
        for (bp, flag) in &record.favorites {
            assert!(*flag);
            assert!(db.blueprints.contains_key(bp), "{user} favorites missing {bp}");
            edges.insert((bp.clone(), user.clone()));
        }
    }

    for (id, bp) in &db.blueprints {
        let author = bp.author.as_ref().and_then(|a| a.user_id.as_ref()).unwrap();
        assert!(!edges.contains(&(id.clone(), author.clone())), "{author} favorites own {id}");
        let n = edges.iter().filter(|(b, _)| b == id).count() as u64;
        assert_eq!(bp.number_of_favorites, n, "{id}");
        assert_eq!(db.blueprint_summaries[id].number_of_favorites, n, "{id}");
    }

    assert!(edges.contains(&(BlueprintId::from("bp1"), UserId::from("carol"))));
    assert!(edges.contains(&(BlueprintId::from("bp1"), UserId::from("dave"))));
    assert!(edges.contains(&(BlueprintId::from("bp2"), UserId::from("alice"))));
    assert_eq!(edges.len(), 3);
}

#[test]
fn indexed_tags_appear_on_their_blueprints() {
    let db = cleanse(DRIFTED).reconciled.database;

    for (prefix, suffixes) in &db.by_tag {
        for (suffix, blueprints) in suffixes {
            let tag = TagPath::new(prefix.as_str(), suffix.as_str()).unwrap();
            let rendered = tag.to_string();
            assert_eq!(rendered.parse::<TagPath>().unwrap(), tag);
            for bp in blueprints.keys() {
                assert!(db.blueprints[bp].tags.contains(&rendered), "{bp} missing {rendered}");
            }
        }
    }

    assert!(db.by_tag.get("train").is_none());
    assert_eq!(db.blueprints["bp3"].tags, vec!["/train/station/".to_string()]);
}

#[test]
fn authors_are_reduced_and_backfilled() {
    let db = cleanse(DRIFTED).reconciled.database;

    let value = serde_json::to_value(&db.blueprints["bp1"].author).unwrap();
    assert_eq!(value, json!({ "userId": "alice" }));
    assert_eq!(db.users["carol"].blueprints.keys().map(BlueprintId::as_str).collect::<Vec<_>>(), vec!["bp3"]);
}

#[test]
fn privates_are_complete() {
    let db = cleanse(DRIFTED).reconciled.database;

    assert_eq!(db.blueprint_privates.len(), 3);
    assert_eq!(db.blueprint_privates["bp1"].thumbnail.as_deref(), Some("https://i.imgur.com/img1t.png"));
    assert!(db.blueprint_privates["bp2"].file_name.is_none());
}

#[test]
fn missing_timestamps_fall_back() {
    let db = cleanse(DRIFTED).reconciled.database;

    let bp2 = db.blueprint_summaries["bp2"].last_updated_date.unwrap();
    assert_eq!(bp2.to_string(), "2017-01-01T00:00:00Z");
    let bp3 = db.blueprint_summaries["bp3"].last_updated_date.unwrap();
    assert_eq!(bp3.to_string(), "2017-04-02T12:00:00Z");
}

#[test]
fn privates_disagreement_aborts_iff_fields_differ() {
    let base = json!({
        "blueprints": { "bp1": { "authorId": "u", "fileName": "a.txt", "imageUrl": "https://x/a.png", "image": { "deletehash": "dh" } } },
        "thumbnails": { "bp1": "https://x/a_t.png" },
        "users": { "u": { "blueprints": { "bp1": true } } }
    });
    let agreeing = json!({ "fileName": "a.txt", "imageUrl": "https://x/a.png", "thumbnail": "https://x/a_t.png", "deletehash": "dh" });

    let mut ok = base.clone();
    ok["blueprintPrivates"] = json!({ "bp1": agreeing.clone() });
    let db: Database = serde_json::from_value(ok).unwrap();
    reconcile(&db, &ReconcileConfig::default()).unwrap();

    for field in ["fileName", "imageUrl", "thumbnail", "deletehash"] {
        let mut entry = agreeing.clone();
        entry[field] = json!("different");
        let mut bad = base.clone();
        bad["blueprintPrivates"] = json!({ "bp1": entry });
        let db: Database = serde_json::from_value(bad).unwrap();
        let err = reconcile(&db, &ReconcileConfig::default()).unwrap_err();
        assert!(matches!(err.inconsistency(), Some(Inconsistency::PrivatesMismatch { .. })), "{field}");
    }
}
