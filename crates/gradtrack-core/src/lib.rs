//! # gradtrack-core
//!
//! The project allocation engine for GradTrack - THE LOGIC.
//!
//! Students form teams, teams rank supervisor-submitted projects, and an
//! administrator triggers one allocation pass that gives each team at most
//! one project from its own list. Teams are served strictly in order of
//! their best member's GPA; a project, once claimed, is never reassigned
//! within the run.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Holds no state between runs; every call is a function of its inputs
//! - Performs no I/O; records arrive already fetched, results are handed back
//! - Never fails on data-quality problems, only on caller-contract violations
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod cohort;
pub mod engine;
pub mod gpa;
pub mod primitives;
pub mod report;
pub mod result;
pub mod snapshot;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Gpa, GradTrackError, Project, ProjectId, RawGpa, Student, StudentId, StudyType, Team, TeamId,
    Timestamp,
};

// =============================================================================
// RE-EXPORTS: Allocation
// =============================================================================

pub use engine::{AllocationOptions, Allocator, TieBreak, allocate};
pub use gpa::{StudentDirectory, team_max_gpa};
pub use result::{AllocationResult, AllocationStatistics, Assignment};
pub use snapshot::Snapshot;

// =============================================================================
// RE-EXPORTS: Reports
// =============================================================================

pub use cohort::team_cohort;
pub use report::{CohortCounts, DistributionOverview, ResultRow, results};
