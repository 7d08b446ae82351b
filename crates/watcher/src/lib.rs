//! The observing side of focuspulse: watches tab focus transitions, turns
//! dwell time into per-domain counters, and pushes batched minutes to the
//! backend on a best-effort basis.

pub mod accumulator;
pub mod args;
pub mod clock;
pub mod domain;
pub mod driver;
pub mod events;
pub mod state_file;
pub mod status;
pub mod sync;
