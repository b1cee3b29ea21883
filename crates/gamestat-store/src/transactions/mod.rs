//! Write transactions and cleanup sweeps.

pub mod cleanup;
pub mod store;

pub use cleanup::{DAY_MS, RemoveOldSampledData, SweepCounts};
pub use store::{
    KickPlayer, RegisterPlayer, RegisterServer, SetBanStatus, SetOperatorStatus,
    StoreExtensionValue, StoreGeoInfo, StoreNickname, StorePing, StoreSession, StoreTps,
};
