//! Player view and its per-server slices.

use std::collections::BTreeMap;

use gamestat_core::DataContainer;
use gamestat_store::Database;
use gamestat_store::model::{FinishedSession, UserInfo};
use gamestat_store::queries::player;
use tracing::debug;
use uuid::Uuid;

use crate::analysis::{ping, sessions};
use crate::keys::{per_server_keys, player_keys as keys};

/// Build the lazy container describing one player.
///
/// No query runs until a key is read. Sessions are loaded once, stitched
/// with their world times and the kills made in them, and feed every
/// session fact as well as the per-server slices.
pub fn player_container(db: &Database, uuid: Uuid) -> DataContainer<'_> {
    let mut c = DataContainer::new();
    c.put_raw_data(&keys::UUID, uuid);

    c.put_optional_supplier(&keys::BASE_USER, move |_| Ok(db.query(&player::base_user(&uuid))?));
    c.put_optional_supplier(&keys::NAME, |c| {
        Ok(c.get_value(&keys::BASE_USER)?.map(|u| u.name.clone()))
    });
    c.put_optional_supplier(&keys::REGISTERED, |c| {
        Ok(c.get_value(&keys::BASE_USER)?.map(|u| u.registered))
    });
    c.put_optional_supplier(&keys::KICK_COUNT, |c| {
        Ok(c.get_value(&keys::BASE_USER)?.map(|u| u.times_kicked))
    });

    c.put_supplier(&keys::USER_INFO, move |_| Ok(db.query(&player::user_info(&uuid))?));
    c.put_supplier(&keys::BANNED, |c| {
        Ok(c.get_required(&keys::USER_INFO)?.iter().any(|i| i.banned))
    });
    c.put_supplier(&keys::OPERATOR, |c| {
        Ok(c.get_required(&keys::USER_INFO)?.iter().any(|i| i.opped))
    });
    c.put_supplier(&keys::NICKNAMES, move |_| Ok(db.query(&player::nicknames(&uuid))?));
    c.put_supplier(&keys::GEOLOCATIONS, move |_| {
        Ok(db.query(&player::geolocations(&uuid))?)
    });
    c.put_supplier(&keys::PING, move |_| Ok(db.query(&player::ping(&uuid))?));
    c.put_optional_supplier(&keys::AVERAGE_PING, |c| {
        Ok(ping::average_ping(c.get_required(&keys::PING)?))
    });

    c.put_supplier(&keys::PLAYER_KILLS, move |_| Ok(db.query(&player::kills(&uuid))?));
    c.put_supplier(&keys::PLAYER_DEATHS, move |_| Ok(db.query(&player::deaths(&uuid))?));
    c.put_supplier(&keys::PLAYER_KILL_COUNT, |c| {
        Ok(c.get_required(&keys::PLAYER_KILLS)?.len())
    });
    c.put_supplier(&keys::PLAYER_DEATH_COUNT, |c| {
        Ok(c.get_required(&keys::PLAYER_DEATHS)?.len())
    });
    c.put_supplier(&keys::EXTENSION_VALUES, move |_| {
        Ok(db.query(&player::extension_values(&uuid))?)
    });

    c.put_supplier(&keys::SESSIONS, move |c| {
        let loaded = db.query(&player::sessions(&uuid))?;
        let world_times = db.query(&player::world_times(&uuid))?;
        let kills = c.get_required(&keys::PLAYER_KILLS)?;
        debug!(player = %uuid, sessions = loaded.len(), "player sessions loaded");
        Ok(sessions::stitch(loaded, world_times, kills))
    });
    keys::session_facts().wire(&mut c);

    c.put_supplier(&keys::PER_SERVER, |c| {
        let info = c.get_required(&keys::USER_INFO)?;
        let mut grouped = sessions::by_server(c.get_required(&keys::SESSIONS)?);
        for joined in info {
            let _ = grouped.entry(joined.server_uuid).or_default();
        }
        Ok(grouped
            .into_iter()
            .map(|(server, played)| {
                let joined = info.iter().find(|i| i.server_uuid == server).cloned();
                (server, per_server_container(server, played, joined))
            })
            .collect::<BTreeMap<_, _>>())
    });

    c
}

/// Build the slice of a player's view for one server.
///
/// Built from data the player container already loaded, so it holds no
/// database borrow. `user_info` is `None` for a server the player has
/// sessions on but no registration row for.
pub fn per_server_container(
    server: Uuid,
    sessions: Vec<FinishedSession>,
    user_info: Option<UserInfo>,
) -> DataContainer<'static> {
    let mut c = DataContainer::new();
    c.put_raw_data(&per_server_keys::SERVER_UUID, server);

    let kills: usize = sessions.iter().map(|s| s.player_kills.len()).sum();
    c.put_raw_data(&per_server_keys::PLAYER_KILL_COUNT, kills);
    c.put_raw_data(&per_server_keys::SESSIONS, sessions);
    per_server_keys::session_facts().wire(&mut c);

    let flags = user_info.as_ref().map_or((false, false), |i| (i.banned, i.opped));
    c.put_raw_data(&per_server_keys::BANNED, flags.0);
    c.put_raw_data(&per_server_keys::OPERATOR, flags.1);
    if let Some(info) = user_info {
        c.put_raw_data(&per_server_keys::REGISTERED, info.registered);
        if let Some(address) = info.join_address {
            c.put_raw_data(&per_server_keys::JOIN_ADDRESS, address);
        }
    }
    c
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sessions::tests::session;

    #[test]
    fn slice_without_registration_has_defaults() {
        let server = Uuid::from_u128(5);
        let slice = per_server_container(
            server,
            vec![session(1, Uuid::nil(), server, 0, 60, 10)],
            None,
        );
        assert_eq!(slice.get_value(&per_server_keys::SERVER_UUID).unwrap(), Some(&server));
        assert_eq!(slice.get_value(&per_server_keys::BANNED).unwrap(), Some(&false));
        assert!(!slice.supports(&per_server_keys::REGISTERED));
        assert_eq!(slice.get_value(&per_server_keys::ACTIVE_PLAYTIME).unwrap(), Some(&50));
    }

    #[test]
    fn slice_carries_registration_flags() {
        let server = Uuid::from_u128(5);
        let info = UserInfo {
            player_uuid: Uuid::nil(),
            server_uuid: server,
            registered: 1_234,
            opped: true,
            banned: false,
            join_address: Some("mc.example.org".into()),
        };
        let slice = per_server_container(server, Vec::new(), Some(info));
        assert_eq!(slice.get_value(&per_server_keys::OPERATOR).unwrap(), Some(&true));
        assert_eq!(slice.get_value(&per_server_keys::REGISTERED).unwrap(), Some(&1_234));
        assert_eq!(
            slice
                .get_value(&per_server_keys::JOIN_ADDRESS)
                .unwrap()
                .map(String::as_str),
            Some("mc.example.org")
        );
        assert_eq!(slice.get_value(&per_server_keys::LAST_SEEN).unwrap(), None);
    }
}
