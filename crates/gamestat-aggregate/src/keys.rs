//! Key registries for the composite containers.
//!
//! Each container kind owns its keys. Facts with the same meaning (sessions,
//! playtime, ...) still get a separate key per container, so a key read from
//! the wrong kind of container is simply absent. Key names carry the
//! registry prefix, which keeps them distinct across registries.

macro_rules! key_registry {
    ($prefix:literal { $($(#[$meta:meta])* $ident:ident: $ty:ty = $name:literal;)* }) => {
        $(
            $(#[$meta])*
            pub static $ident: Key<$ty> = Key::new(concat!($prefix, ".", $name));
        )*

        /// Every key name in this registry.
        pub const NAMES: &[&str] = &[$(concat!($prefix, ".", $name)),*];
    };
}

/// Session facts every container derives from its own session list.
macro_rules! session_fact_keys {
    ($prefix:literal { $($(#[$meta:meta])* $ident:ident: $ty:ty = $name:literal;)* }) => {
        key_registry!($prefix {
            /// Finished sessions with world times and kills attached.
            SESSIONS: Vec<FinishedSession> = "sessions";
            /// Number of sessions.
            SESSION_COUNT: usize = "session_count";
            /// Summed session length.
            PLAYTIME: i64 = "playtime";
            /// Playtime minus AFK time.
            ACTIVE_PLAYTIME: i64 = "active_playtime";
            /// Summed AFK time.
            AFK_TIME: i64 = "afk_time";
            /// World times merged over every session.
            WORLD_TIMES: WorldTimes = "world_times";
            /// Mobs killed.
            MOB_KILLS: i64 = "mob_kills";
            /// Deaths of any cause.
            DEATHS: i64 = "deaths";
            /// End of the latest session.
            LAST_SEEN: i64 = "last_seen";
            /// Length of the longest session.
            LONGEST_SESSION: i64 = "longest_session";
            $($(#[$meta])* $ident: $ty = $name;)*
        });

        /// This registry's session-fact keys.
        pub fn session_facts() -> SessionFacts {
            SessionFacts {
                sessions: SESSIONS,
                count: SESSION_COUNT,
                playtime: PLAYTIME,
                active_playtime: ACTIVE_PLAYTIME,
                afk_time: AFK_TIME,
                world_times: WORLD_TIMES,
                mob_kills: MOB_KILLS,
                deaths: DEATHS,
                last_seen: LAST_SEEN,
                longest_session: LONGEST_SESSION,
            }
        }
    };
}

/// Keys of the player container.
pub mod player_keys {
    use std::collections::BTreeMap;

    use gamestat_core::{DataContainer, Key, PlaceholderKey};
    use gamestat_store::model::{
        BaseUser, ExtensionValue, FinishedSession, GeoInfo, Nickname, Ping, PlayerKill, UserInfo,
        WorldTimes,
    };
    use uuid::Uuid;

    use crate::session_facts::SessionFacts;

    /// Account name, also used as a template placeholder.
    pub static NAME: PlaceholderKey<String> = PlaceholderKey::new("playerName");

    session_fact_keys!("player" {
        /// Player uuid.
        UUID: Uuid = "uuid";
        /// The `plan_users` row.
        BASE_USER: BaseUser = "base_user";
        /// First join on any server.
        REGISTERED: i64 = "registered";
        /// Times kicked.
        KICK_COUNT: i32 = "kick_count";
        /// Per-server facts.
        USER_INFO: Vec<UserInfo> = "user_info";
        /// Nicknames, most recent first.
        NICKNAMES: Vec<Nickname> = "nicknames";
        /// Geolocations, most recent first.
        GEOLOCATIONS: Vec<GeoInfo> = "geolocations";
        /// Ping samples.
        PING: Vec<Ping> = "ping";
        /// Mean of the ping samples' averages.
        AVERAGE_PING: f64 = "average_ping";
        /// Banned on any server.
        BANNED: bool = "banned";
        /// Operator on any server.
        OPERATOR: bool = "operator";
        /// Player kills the player made.
        PLAYER_KILLS: Vec<PlayerKill> = "player_kills";
        /// Times killed by another player.
        PLAYER_DEATHS: Vec<PlayerKill> = "player_deaths";
        /// Number of player kills made.
        PLAYER_KILL_COUNT: usize = "player_kill_count";
        /// Number of deaths by player kill.
        PLAYER_DEATH_COUNT: usize = "player_death_count";
        /// Plugin-provided values.
        EXTENSION_VALUES: Vec<ExtensionValue> = "extension_values";
        /// One per-server container for each server the player joined.
        PER_SERVER: BTreeMap<Uuid, DataContainer<'static>> = "per_server";
    });
}

/// Keys of a player's per-server slice.
pub mod per_server_keys {
    use gamestat_core::Key;
    use gamestat_store::model::{FinishedSession, WorldTimes};
    use uuid::Uuid;

    use crate::session_facts::SessionFacts;

    session_fact_keys!("per_server" {
        /// Server uuid.
        SERVER_UUID: Uuid = "server_uuid";
        /// First join on this server.
        REGISTERED: i64 = "registered";
        /// Banned on this server.
        BANNED: bool = "banned";
        /// Operator on this server.
        OPERATOR: bool = "operator";
        /// Address the player joined through.
        JOIN_ADDRESS: String = "join_address";
        /// Player kills made on this server.
        PLAYER_KILL_COUNT: usize = "player_kill_count";
    });
}

/// Keys of the server container.
pub mod server_keys {
    use gamestat_core::{Key, PlaceholderKey};
    use gamestat_store::model::{FinishedSession, PlayerKill, Server, TpsSample, WorldTimes};
    use uuid::Uuid;

    use crate::analysis::tps::PlayerPeak;
    use crate::session_facts::SessionFacts;

    /// Display name, also used as a template placeholder.
    pub static NAME: PlaceholderKey<String> = PlaceholderKey::new("serverName");

    session_fact_keys!("server" {
        /// Server uuid.
        UUID: Uuid = "uuid";
        /// The `plan_servers` row.
        SERVER: Server = "server";
        /// TPS samples in the analysis window.
        TPS: Vec<TpsSample> = "tps";
        /// Mean TPS over the window.
        AVERAGE_TPS: f64 = "average_tps";
        /// Mean CPU usage over the window.
        AVERAGE_CPU: f64 = "average_cpu";
        /// Drops below the low-TPS threshold.
        LOW_TPS_SPIKES: usize = "low_tps_spikes";
        /// Most players online at once in the window.
        PEAK_PLAYERS: PlayerPeak = "peak_players";
        /// Players who ever joined.
        REGISTERED_PLAYERS: i64 = "registered_players";
        /// Distinct players with a session.
        UNIQUE_PLAYERS: usize = "unique_players";
        /// Player kills on the server.
        PLAYER_KILLS: Vec<PlayerKill> = "player_kills";
        /// Number of player kills.
        PLAYER_KILL_COUNT: usize = "player_kill_count";
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn assert_unique(names: &[&str]) {
        let mut seen = HashSet::new();
        for name in names {
            assert!(seen.insert(*name), "duplicate key name {name}");
        }
    }

    #[test]
    fn names_are_unique_within_each_registry() {
        assert_unique(player_keys::NAMES);
        assert_unique(per_server_keys::NAMES);
        assert_unique(server_keys::NAMES);
    }

    #[test]
    fn registries_do_not_share_names() {
        let all: Vec<&str> = player_keys::NAMES
            .iter()
            .chain(per_server_keys::NAMES)
            .chain(server_keys::NAMES)
            .copied()
            .chain([player_keys::NAME.placeholder(), server_keys::NAME.placeholder()])
            .collect();
        assert_unique(&all);
    }

    #[test]
    fn shared_meaning_still_means_distinct_keys() {
        assert_ne!(player_keys::SESSIONS.id(), server_keys::SESSIONS.id());
        assert_ne!(player_keys::LAST_SEEN.id(), per_server_keys::LAST_SEEN.id());
        assert_eq!(player_keys::session_facts().sessions, player_keys::SESSIONS);
    }

    #[test]
    fn names_carry_the_registry_prefix() {
        assert_eq!(server_keys::TPS.name(), "server.tps");
        assert_eq!(player_keys::PER_SERVER.name(), "player.per_server");
        assert!(per_server_keys::NAMES.contains(&"per_server.banned"));
    }
}
