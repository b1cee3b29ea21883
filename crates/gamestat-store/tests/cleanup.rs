//! Retention sweeps and their race with concurrent writers.

#![allow(unused_results)]

mod common;

use common::{DbFile, row_count};
use gamestat_store::transactions::{RemoveOldSampledData, SweepCounts};

const SEED: &str = "
INSERT INTO plan_tps (server_uuid, date, tps, players_online, cpu_usage, ram_usage, entities, chunks_loaded)
VALUES ('s', 1, 20.0, 1, 1.0, 1, 1, 1),
       ('s', 2, 20.0, 1, 1.0, 1, 1, 1),
       ('s', 3, 20.0, 1, 1.0, 1, 1, 1),
       ('s', 500, 20.0, 1, 1.0, 1, 1, 1);
INSERT INTO plan_ping (uuid, server_uuid, date, max_ping, min_ping, avg_ping)
VALUES ('u', 's', 10, 1, 1, 1.0),
       ('u', 's', 400, 1, 1, 1.0);
";

#[test]
fn sweep_removes_rows_below_thresholds() {
    let file = DbFile::empty();
    let db = file.database();
    db.init().unwrap();
    file.raw().execute_batch(SEED).unwrap();

    let mut sweep = RemoveOldSampledData::new(100, 100);
    assert!(db.execute(&mut sweep).unwrap());
    assert_eq!(sweep.removed(), Some(SweepCounts { tps: 3, ping: 1 }));
    assert_eq!(row_count(&db, "plan_tps"), 1);
    assert_eq!(row_count(&db, "plan_ping"), 1);
}

#[test]
fn sweep_losing_a_race_is_skipped_and_rolled_back() {
    let file = DbFile::empty();
    let db = file.database();
    db.init().unwrap();
    let raw = file.raw();
    raw.execute_batch(SEED).unwrap();
    // Another writer claims one of the counted rows between the count and
    // the delete: the delete silently leaves it alone.
    raw.execute_batch(
        "CREATE TRIGGER concurrent_writer BEFORE DELETE ON plan_tps
         WHEN OLD.date = 2 BEGIN SELECT RAISE(IGNORE); END;",
    )
    .unwrap();

    let mut sweep = RemoveOldSampledData::new(100, 100);
    assert!(!db.execute(&mut sweep).unwrap());
    assert_eq!(sweep.removed(), None);
    assert_eq!(row_count(&db, "plan_tps"), 4);
    assert_eq!(row_count(&db, "plan_ping"), 2);

    // The next scheduled sweep catches up once the race is gone.
    raw.execute_batch("DROP TRIGGER concurrent_writer").unwrap();
    let mut next = RemoveOldSampledData::new(100, 100);
    assert!(db.execute(&mut next).unwrap());
    assert_eq!(row_count(&db, "plan_tps"), 1);
}
