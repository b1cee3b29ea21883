//! JSON reports read out of the composite containers.
//!
//! Reports borrow from the container they were read from; serializing one
//! forces every supplier it touches.

use std::collections::BTreeMap;

use gamestat_aggregate::SessionFacts;
use gamestat_aggregate::analysis::tps::PlayerPeak;
use gamestat_aggregate::keys::{per_server_keys, player_keys, server_keys};
use gamestat_core::{DataContainer, Key, Result};
use gamestat_store::model::{ExtensionValue, GeoInfo, Nickname, Server, WorldTimes};
use serde::Serialize;
use uuid::Uuid;

fn copied<T: Copy + 'static>(container: &DataContainer<'_>, key: &Key<T>) -> Result<Option<T>> {
    Ok(container.get_value(key)?.copied())
}

fn required<T: Copy + 'static>(container: &DataContainer<'_>, key: &Key<T>) -> Result<T> {
    container.get_required(key).copied()
}

/// Session facts of any container.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary<'c> {
    count: usize,
    playtime: i64,
    active_playtime: i64,
    afk_time: i64,
    mob_kills: i64,
    deaths: i64,
    last_seen: Option<i64>,
    longest_session: Option<i64>,
    world_times: &'c WorldTimes,
}

impl<'c> SessionSummary<'c> {
    fn read(container: &'c DataContainer<'_>, facts: SessionFacts) -> Result<Self> {
        Ok(Self {
            count: required(container, &facts.count)?,
            playtime: required(container, &facts.playtime)?,
            active_playtime: required(container, &facts.active_playtime)?,
            afk_time: required(container, &facts.afk_time)?,
            mob_kills: required(container, &facts.mob_kills)?,
            deaths: required(container, &facts.deaths)?,
            last_seen: copied(container, &facts.last_seen)?,
            longest_session: copied(container, &facts.longest_session)?,
            world_times: container.get_required(&facts.world_times)?,
        })
    }
}

/// One server's slice of a player report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerServerReport<'c> {
    registered: Option<i64>,
    banned: bool,
    operator: bool,
    join_address: Option<&'c str>,
    player_kills: usize,
    sessions: SessionSummary<'c>,
}

impl<'c> PerServerReport<'c> {
    /// Read a per-server container.
    pub fn read(container: &'c DataContainer<'_>) -> Result<Self> {
        Ok(Self {
            registered: copied(container, &per_server_keys::REGISTERED)?,
            banned: required(container, &per_server_keys::BANNED)?,
            operator: required(container, &per_server_keys::OPERATOR)?,
            join_address: container
                .get_value(&per_server_keys::JOIN_ADDRESS)?
                .map(String::as_str),
            player_kills: required(container, &per_server_keys::PLAYER_KILL_COUNT)?,
            sessions: SessionSummary::read(container, per_server_keys::session_facts())?,
        })
    }
}

/// Everything known about one player.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReport<'c> {
    uuid: Uuid,
    name: Option<&'c str>,
    registered: Option<i64>,
    times_kicked: Option<i32>,
    banned: bool,
    operator: bool,
    average_ping: Option<f64>,
    player_kills: usize,
    player_deaths: usize,
    nicknames: &'c [Nickname],
    geolocations: &'c [GeoInfo],
    extension_values: &'c [ExtensionValue],
    sessions: SessionSummary<'c>,
    servers: BTreeMap<Uuid, PerServerReport<'c>>,
}

impl<'c> PlayerReport<'c> {
    /// Read a player container.
    pub fn read(container: &'c DataContainer<'_>) -> Result<Self> {
        let servers: BTreeMap<Uuid, PerServerReport<'c>> = container
            .get_required(&player_keys::PER_SERVER)?
            .iter()
            .map(|(uuid, slice)| PerServerReport::read(slice).map(|report| (*uuid, report)))
            .collect::<Result<_>>()?;
        Ok(Self {
            uuid: required(container, &player_keys::UUID)?,
            name: container.get_value(&player_keys::NAME)?.map(String::as_str),
            registered: copied(container, &player_keys::REGISTERED)?,
            times_kicked: copied(container, &player_keys::KICK_COUNT)?,
            banned: required(container, &player_keys::BANNED)?,
            operator: required(container, &player_keys::OPERATOR)?,
            average_ping: copied(container, &player_keys::AVERAGE_PING)?,
            player_kills: required(container, &player_keys::PLAYER_KILL_COUNT)?,
            player_deaths: required(container, &player_keys::PLAYER_DEATH_COUNT)?,
            nicknames: container.get_required(&player_keys::NICKNAMES)?,
            geolocations: container.get_required(&player_keys::GEOLOCATIONS)?,
            extension_values: container.get_required(&player_keys::EXTENSION_VALUES)?,
            sessions: SessionSummary::read(container, player_keys::session_facts())?,
            servers,
        })
    }
}

/// Everything known about one server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerReport<'c> {
    uuid: Uuid,
    name: Option<&'c str>,
    server: Option<&'c Server>,
    registered_players: i64,
    unique_players: usize,
    player_kills: usize,
    tps_samples: usize,
    average_tps: Option<f64>,
    average_cpu: Option<f64>,
    low_tps_spikes: usize,
    peak_players: Option<PlayerPeak>,
    sessions: SessionSummary<'c>,
}

impl<'c> ServerReport<'c> {
    /// Read a server container.
    pub fn read(container: &'c DataContainer<'_>) -> Result<Self> {
        Ok(Self {
            uuid: required(container, &server_keys::UUID)?,
            name: container.get_value(&server_keys::NAME)?.map(String::as_str),
            server: container.get_value(&server_keys::SERVER)?,
            registered_players: required(container, &server_keys::REGISTERED_PLAYERS)?,
            unique_players: required(container, &server_keys::UNIQUE_PLAYERS)?,
            player_kills: required(container, &server_keys::PLAYER_KILL_COUNT)?,
            tps_samples: container.get_required(&server_keys::TPS)?.len(),
            average_tps: copied(container, &server_keys::AVERAGE_TPS)?,
            average_cpu: copied(container, &server_keys::AVERAGE_CPU)?,
            low_tps_spikes: required(container, &server_keys::LOW_TPS_SPIKES)?,
            peak_players: copied(container, &server_keys::PEAK_PLAYERS)?,
            sessions: SessionSummary::read(container, server_keys::session_facts())?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
