//! Startup migration of legacy databases.

#![allow(unused_results)]

mod common;

use assert_matches::assert_matches;
use common::{DbFile, S1, U1, U2, has_column, has_table, row_count, row_counts};
use gamestat_store::dialect::SqliteDialect;
use gamestat_store::patches::{Patch, registry};
use gamestat_store::queries::player;
use gamestat_store::schema::tables;
use gamestat_store::{DbState, StoreError, TxContext, Work};
use uuid::Uuid;

fn uuid(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap()
}

#[test]
fn legacy_database_is_rewritten_to_natural_keys() {
    let file = DbFile::legacy();
    let db = file.database();
    db.init().unwrap();
    assert_eq!(db.state(), DbState::Open);

    let raw = file.raw();
    for (table, legacy, natural) in [
        ("plan_sessions", "user_id", "uuid"),
        ("plan_world_times", "server_id", "server_uuid"),
        ("plan_kills", "killer_id", "killer_uuid"),
        ("plan_ping", "user_id", "uuid"),
        ("plan_user_info", "server_id", "server_uuid"),
        ("plan_nicknames", "user_id", "uuid"),
        ("plan_geolocations", "user_id", "uuid"),
    ] {
        assert!(!has_column(&raw, table, legacy), "{table}.{legacy} survived");
        assert!(has_column(&raw, table, natural), "{table}.{natural} missing");
        assert!(!has_table(&raw, &format!("temp_{table}")));
    }
    assert!(!has_table(&raw, "plan_version"));
    assert!(!has_table(&raw, "plan_transfer"));
    assert!(has_column(&raw, "plan_tps", "free_disk_space"));

    assert_eq!(row_count(&db, "plan_sessions"), 3);
    assert_eq!(row_count(&db, "plan_world_times"), 2);
    assert_eq!(row_count(&db, "plan_kills"), 1);
    assert_eq!(row_count(&db, "plan_user_info"), 2);
    assert_eq!(row_count(&db, "plan_nicknames"), 2);
    assert_eq!(row_count(&db, "plan_geolocations"), 2);
    // The ping row of the deleted player cannot be resolved.
    assert_eq!(row_count(&db, "plan_ping"), 2);

    assert!(db.patch_status().unwrap().iter().all(|s| s.applied));
}

#[test]
fn rewritten_rows_keep_ids_and_resolve_uuids() {
    let file = DbFile::legacy();
    let db = file.database();
    db.init().unwrap();

    let sessions = db.query(&player::sessions(&uuid(U1))).unwrap();
    assert_eq!(
        sessions.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![Some(1), Some(2)]
    );
    assert!(sessions.iter().all(|s| s.server_uuid == uuid(S1)));
    assert_eq!(sessions[0].afk_time, 0);

    let kills = db.query(&player::kills(&uuid(U1))).unwrap();
    assert_eq!(kills.len(), 1);
    assert_eq!(kills[0].victim, uuid(U2));
    assert_eq!(kills[0].session_id, Some(1));

    let world_times = db.query(&player::world_times(&uuid(U2))).unwrap();
    assert_eq!(world_times[&3].total(), 30_000);

    let info = db.query(&player::user_info(&uuid(U2))).unwrap();
    assert!(info[0].banned);
    assert_eq!(info[0].join_address, None);
}

#[test]
fn natural_key_scenario_on_a_single_table() {
    let file = DbFile::empty();
    file.raw()
        .execute_batch(
            "CREATE TABLE plan_users (id INTEGER PRIMARY KEY, uuid VARCHAR(36));
             INSERT INTO plan_users VALUES (1, '00000000-0000-0000-0000-000000000001');
             CREATE TABLE plan_servers (id INTEGER PRIMARY KEY, uuid VARCHAR(36));
             INSERT INTO plan_servers VALUES (1, '00000000-0000-0000-0000-0000000000aa');
             CREATE TABLE plan_geolocations (
               id INTEGER PRIMARY KEY, user_id INT, geolocation VARCHAR(50),
               last_used BIGINT NOT NULL DEFAULT 0);
             INSERT INTO plan_geolocations (id, user_id, geolocation) VALUES
               (1, 1, 'Finland'), (2, 1, 'Norway'), (3, 1, 'Estonia');",
        )
        .unwrap();

    let raw = file.raw();
    let ctx = TxContext::new(&raw, &SqliteDialect);
    let patch = registry()
        .into_iter()
        .find(|p| p.name() == "GeoInfoNaturalKeyPatch")
        .unwrap();

    assert!(!patch.has_been_applied(&ctx).unwrap());
    patch.apply(&ctx).unwrap();
    assert!(patch.has_been_applied(&ctx).unwrap());

    assert!(has_column(&raw, "plan_geolocations", "uuid"));
    assert!(!has_column(&raw, "plan_geolocations", "user_id"));
    assert!(!has_table(&raw, "temp_plan_geolocations"));
    let count: i64 = raw
        .query_row("SELECT COUNT(*) FROM plan_geolocations", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 3);
}

fn applied(db: &gamestat_store::Database, patch: &str) -> bool {
    db.patch_status()
        .unwrap()
        .iter()
        .find(|s| s.name == patch)
        .unwrap()
        .applied
}

#[test]
fn status_is_readable_before_first_start() {
    let empty = DbFile::empty();
    let db = empty.database();
    assert_eq!(db.patch_status().unwrap().len(), registry().len());
    assert!(applied(&db, "VersionTableRemovalPatch"));
    assert!(!applied(&db, "SessionAfkTimePatch"));
    assert!(applied(&db, "BadAfkThresholdValuePatch"));

    let legacy = DbFile::legacy();
    let db = legacy.database();
    assert!(!applied(&db, "VersionTableRemovalPatch"));
    assert!(!applied(&db, "SessionAfkTimePatch"));
    assert!(!applied(&db, "SessionsNaturalKeyPatch"));
    assert!(applied(&db, "BadAfkThresholdValuePatch"));

    let raw = legacy.raw();
    assert!(has_table(&raw, "plan_version"));
    assert!(!has_column(&raw, "plan_sessions", "afk_time"));
    assert_eq!(db.state(), DbState::Closed);
}

#[test]
fn interrupted_after_rename_is_resumed() {
    let file = DbFile::legacy();
    // What an engine with auto-committing DDL leaves behind when the process
    // dies right after the rename step.
    file.raw()
        .execute_batch("ALTER TABLE plan_ping RENAME TO temp_plan_ping")
        .unwrap();

    let db = file.database();
    let before = db.patch_status().unwrap();
    let ping = before.iter().find(|s| s.name == "PingNaturalKeyPatch").unwrap();
    assert!(!ping.applied);

    db.init().unwrap();
    let raw = file.raw();
    assert!(!has_table(&raw, "temp_plan_ping"));
    assert!(has_column(&raw, "plan_ping", "uuid"));
    assert_eq!(row_count(&db, "plan_ping"), 2);
    assert!(db.patch_status().unwrap().iter().all(|s| s.applied));
}

#[test]
fn interrupted_mid_copy_is_redone_without_duplicates() {
    let file = DbFile::legacy();
    let raw = file.raw();
    raw.execute_batch("ALTER TABLE plan_ping RENAME TO temp_plan_ping").unwrap();
    raw.execute_batch(&tables::ping(&SqliteDialect)).unwrap();
    raw.execute_batch(
        "INSERT INTO plan_ping (id, uuid, server_uuid, date, max_ping, min_ping, avg_ping)
         VALUES (1, '00000000-0000-0000-0000-000000000001',
                 '00000000-0000-0000-0000-0000000000aa', 60000, 80, 20, 40.0)",
    )
    .unwrap();
    drop(raw);

    let db = file.database();
    db.init().unwrap();
    assert_eq!(row_count(&db, "plan_ping"), 2);
    assert!(!has_table(&file.raw(), "temp_plan_ping"));
}

#[test]
fn second_startup_changes_nothing() {
    let file = DbFile::legacy();
    let first = file.database();
    first.init().unwrap();
    let counts = row_counts(&first);
    first.close();
    drop(first);

    let second = file.database();
    second.init().unwrap();
    assert_eq!(row_counts(&second), counts);
}

#[test]
fn reapplying_any_patch_never_duplicates_rows() {
    let file = DbFile::legacy();
    let db = file.database();
    db.init().unwrap();
    let counts = row_counts(&db);

    for patch in registry() {
        let mut work = Work::best_effort(patch.name(), |ctx: &TxContext<'_>| patch.apply(ctx));
        // Either a no-op or refused and rolled back.
        db.execute(&mut work).unwrap();
        assert_eq!(row_counts(&db), counts, "{} changed row counts", patch.name());
    }
    assert!(db.patch_status().unwrap().iter().all(|s| s.applied));
}

#[test]
fn ambiguous_leftover_fails_startup_naming_the_patch() {
    let file = DbFile::legacy();
    file.raw()
        .execute_batch("CREATE TABLE temp_plan_ping (id INTEGER)")
        .unwrap();

    let db = file.database();
    let err = db.init().unwrap_err();
    assert_eq!(db.state(), DbState::Closed);
    assert_matches!(
        &err,
        StoreError::Fatal { transaction, .. } if transaction == "PingNaturalKeyPatch"
    );
    assert!(err.to_string().contains("PingNaturalKeyPatch"));

    // Earlier patches committed; the failed one rolled back completely.
    let raw = file.raw();
    assert!(has_column(&raw, "plan_sessions", "uuid"));
    assert!(has_column(&raw, "plan_ping", "user_id"));
    assert!(has_table(&raw, "temp_plan_ping"));

    let status = db.patch_status().unwrap();
    let pending: Vec<_> = status.iter().filter(|s| !s.applied).map(|s| s.name).collect();
    assert!(pending.contains(&"PingNaturalKeyPatch"));
    assert!(!pending.contains(&"SessionsNaturalKeyPatch"));
}
