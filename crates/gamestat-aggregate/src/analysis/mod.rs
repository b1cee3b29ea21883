//! Pure functions over rows read from the store.
//!
//! Nothing here touches the database; containers feed these functions from
//! their memoized keys.

pub mod ping;
pub mod sessions;
pub mod tps;
