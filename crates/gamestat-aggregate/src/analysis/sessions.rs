//! Session arithmetic.

use std::collections::{BTreeMap, HashSet};

use gamestat_store::model::{FinishedSession, PlayerKill, WorldTimes};
use uuid::Uuid;

/// Attach world times and player kills to sessions loaded without them.
///
/// World times are keyed by session id; kills are matched on their
/// `session_id`. Kills without a matching session are left out.
pub fn stitch(
    mut sessions: Vec<FinishedSession>,
    mut world_times: BTreeMap<i64, WorldTimes>,
    kills: &[PlayerKill],
) -> Vec<FinishedSession> {
    let mut kills_by_session: BTreeMap<i64, Vec<PlayerKill>> = BTreeMap::new();
    for kill in kills {
        if let Some(id) = kill.session_id {
            kills_by_session.entry(id).or_default().push(kill.clone());
        }
    }
    for session in &mut sessions {
        let Some(id) = session.id else { continue };
        if let Some(times) = world_times.remove(&id) {
            session.world_times = times;
        }
        if let Some(kills) = kills_by_session.remove(&id) {
            session.player_kills = kills;
        }
    }
    sessions
}

/// Summed session length.
pub fn playtime(sessions: &[FinishedSession]) -> i64 {
    sessions.iter().map(FinishedSession::length).sum()
}

/// Summed active time.
pub fn active_playtime(sessions: &[FinishedSession]) -> i64 {
    sessions.iter().map(FinishedSession::active).sum()
}

/// Summed AFK time, each session's clamped into its length.
pub fn afk_time(sessions: &[FinishedSession]) -> i64 {
    sessions.iter().map(FinishedSession::afk).sum()
}

/// World times merged over all sessions.
pub fn world_times(sessions: &[FinishedSession]) -> WorldTimes {
    let mut merged = WorldTimes::new();
    for session in sessions {
        merged.merge(&session.world_times);
    }
    merged
}

/// Mobs killed over all sessions.
pub fn mob_kills(sessions: &[FinishedSession]) -> i64 {
    sessions.iter().map(|s| i64::from(s.mob_kills)).sum()
}

/// Deaths over all sessions.
pub fn deaths(sessions: &[FinishedSession]) -> i64 {
    sessions.iter().map(|s| i64::from(s.deaths)).sum()
}

/// Last moment the player was online.
///
/// This is the greatest session end, not the greatest session start, so a
/// long session that began earlier can still set it.
pub fn last_seen(sessions: &[FinishedSession]) -> Option<i64> {
    sessions.iter().map(|s| s.end).max()
}

/// Length of the longest session.
pub fn longest_session(sessions: &[FinishedSession]) -> Option<i64> {
    sessions.iter().map(FinishedSession::length).max()
}

/// Sessions grouped by server, each group keeping its input order.
pub fn by_server(sessions: &[FinishedSession]) -> BTreeMap<Uuid, Vec<FinishedSession>> {
    let mut grouped: BTreeMap<Uuid, Vec<FinishedSession>> = BTreeMap::new();
    for session in sessions {
        grouped
            .entry(session.server_uuid)
            .or_default()
            .push(session.clone());
    }
    grouped
}

/// Distinct players with at least one session.
pub fn unique_players(sessions: &[FinishedSession]) -> usize {
    sessions
        .iter()
        .map(|s| s.player_uuid)
        .collect::<HashSet<_>>()
        .len()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
