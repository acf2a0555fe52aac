//! Ambient plumbing shared by every crate in the workspace: tracing setup,
//! correlation ids, span helpers and wall-clock timestamps.

pub mod logger;
pub mod time;
