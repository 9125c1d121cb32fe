//! Priority signal classification and stack ranking.
//!
//! Raw signals are classified through layered strategies (explicit
//! patterns, emoji shortcuts, scan severity, model fallback), aggregated
//! per project with time-decay weighting, and combined with launch
//! impact, effort, age, and recent-focus factors into a composite rank.

pub mod aggregate;
pub mod classifier;
pub mod decay;
pub mod launch;
pub mod level;
pub mod provider;
pub mod ranker;
pub mod tables;
