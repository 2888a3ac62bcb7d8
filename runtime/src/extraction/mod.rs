//! Turning portal pages into records.

pub mod attendance;
