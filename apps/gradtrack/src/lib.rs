//! # gradtrack
//!
//! The GradTrack administration binary as a library: CLI commands, the
//! HTTP admin API, configuration, and the snapshot file store. All
//! allocation logic lives in `gradtrack-core`.

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod store;
