//! Session facts shared by every container kind.
//!
//! Each container registers its own session list under its own key, then
//! [`SessionFacts::wire`] adds the derived facts on that container's keys.
//! All of them read the session key, so the list is loaded once however
//! many facts are requested.

use gamestat_core::{DataContainer, Key};
use gamestat_store::model::{FinishedSession, WorldTimes};

use crate::analysis::sessions;

/// The keys one container uses for session-derived facts.
#[derive(Clone, Copy, Debug)]
pub struct SessionFacts {
    /// Input: the container's finished sessions.
    pub sessions: Key<Vec<FinishedSession>>,
    /// Number of sessions.
    pub count: Key<usize>,
    /// Summed session length.
    pub playtime: Key<i64>,
    /// Playtime minus AFK time.
    pub active_playtime: Key<i64>,
    /// Summed AFK time.
    pub afk_time: Key<i64>,
    /// Merged world times.
    pub world_times: Key<WorldTimes>,
    /// Mobs killed.
    pub mob_kills: Key<i64>,
    /// Deaths of any cause.
    pub deaths: Key<i64>,
    /// End of the latest session; absent without sessions.
    pub last_seen: Key<i64>,
    /// Longest session; absent without sessions.
    pub longest_session: Key<i64>,
}

impl SessionFacts {
    /// Register a supplier for every derived fact.
    ///
    /// The container must hold a value or supplier for `self.sessions`;
    /// reading a fact without one fails with a missing-key error.
    pub fn wire(self, container: &mut DataContainer<'_>) {
        let input = self.sessions;
        container.put_supplier(&self.count, move |c| Ok(c.get_required(&input)?.len()));
        container.put_supplier(&self.playtime, move |c| {
            Ok(sessions::playtime(c.get_required(&input)?))
        });
        container.put_supplier(&self.active_playtime, move |c| {
            Ok(sessions::active_playtime(c.get_required(&input)?))
        });
        container.put_supplier(&self.afk_time, move |c| {
            Ok(sessions::afk_time(c.get_required(&input)?))
        });
        container.put_supplier(&self.world_times, move |c| {
            Ok(sessions::world_times(c.get_required(&input)?))
        });
        container.put_supplier(&self.mob_kills, move |c| {
            Ok(sessions::mob_kills(c.get_required(&input)?))
        });
        container.put_supplier(&self.deaths, move |c| {
            Ok(sessions::deaths(c.get_required(&input)?))
        });
        container.put_optional_supplier(&self.last_seen, move |c| {
            Ok(sessions::last_seen(c.get_required(&input)?))
        });
        container.put_optional_supplier(&self.longest_session, move |c| {
            Ok(sessions::longest_session(c.get_required(&input)?))
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
