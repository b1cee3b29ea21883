//! Server view.

use gamestat_core::DataContainer;
use gamestat_store::Database;
use gamestat_store::queries::server;
use tracing::debug;
use uuid::Uuid;

use crate::analysis::{sessions, tps};
use crate::keys::server_keys as keys;

/// Build the lazy container describing one server.
///
/// TPS keys cover samples taken at or after `tps_since`; a drop below
/// `low_tps_threshold` counts as a low-TPS spike.
pub fn server_container(
    db: &Database,
    uuid: Uuid,
    tps_since: i64,
    low_tps_threshold: f64,
) -> DataContainer<'_> {
    let mut c = DataContainer::new();
    c.put_raw_data(&keys::UUID, uuid);

    c.put_optional_supplier(&keys::SERVER, move |_| Ok(db.query(&server::server(&uuid))?));
    c.put_optional_supplier(&keys::NAME, |c| {
        Ok(c.get_value(&keys::SERVER)?.map(|s| s.name.clone()))
    });

    c.put_supplier(&keys::TPS, move |_| {
        Ok(db.query(&server::tps_since(&uuid, tps_since))?)
    });
    c.put_optional_supplier(&keys::AVERAGE_TPS, |c| {
        Ok(tps::average_tps(c.get_required(&keys::TPS)?))
    });
    c.put_optional_supplier(&keys::AVERAGE_CPU, |c| {
        Ok(tps::average_cpu(c.get_required(&keys::TPS)?))
    });
    c.put_supplier(&keys::LOW_TPS_SPIKES, move |c| {
        Ok(tps::low_tps_spikes(c.get_required(&keys::TPS)?, low_tps_threshold))
    });
    c.put_optional_supplier(&keys::PEAK_PLAYERS, |c| {
        Ok(tps::peak_players(c.get_required(&keys::TPS)?))
    });

    c.put_supplier(&keys::REGISTERED_PLAYERS, move |_| {
        Ok(db.query(&server::registered_players(&uuid))?)
    });
    c.put_supplier(&keys::PLAYER_KILLS, move |_| Ok(db.query(&server::kills(&uuid))?));
    c.put_supplier(&keys::PLAYER_KILL_COUNT, |c| {
        Ok(c.get_required(&keys::PLAYER_KILLS)?.len())
    });

    c.put_supplier(&keys::SESSIONS, move |c| {
        let loaded = db.query(&server::sessions(&uuid))?;
        let world_times = db.query(&server::world_times(&uuid))?;
        let kills = c.get_required(&keys::PLAYER_KILLS)?;
        debug!(server = %uuid, sessions = loaded.len(), "server sessions loaded");
        Ok(sessions::stitch(loaded, world_times, kills))
    });
    c.put_supplier(&keys::UNIQUE_PLAYERS, |c| {
        Ok(sessions::unique_players(c.get_required(&keys::SESSIONS)?))
    });
    keys::session_facts().wire(&mut c);

    c
}
