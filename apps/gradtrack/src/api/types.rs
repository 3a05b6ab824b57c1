//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Request bodies use the camelCase field names of the snapshot document
//! (`tieBreak`); responses follow the snake_case used across the API.

use crate::config::AllocationSection;
use gradtrack_core::{
    AllocationOptions, AllocationResult, DistributionOverview, ResultRow, Snapshot, StudyType,
    TieBreak,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Distribution progress response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub students: usize,
    pub projects: usize,
    pub overview: DistributionOverview,
}

impl StatusResponse {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            students: snapshot.students.len(),
            projects: snapshot.projects.len(),
            overview: DistributionOverview::from_snapshot(snapshot),
        }
    }
}

// =============================================================================
// RESULTS QUERY/RESPONSE
// =============================================================================

/// Query string of `GET /results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsQuery {
    pub cohort: StudyType,
}

/// Assigned teams of one cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub cohort: StudyType,
    pub results: Vec<ResultRow>,
}

// =============================================================================
// ALLOCATE REQUEST/RESPONSE
// =============================================================================

/// Allocation request against the server's snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AllocateRequest {
    #[serde(default)]
    pub cohort: Option<StudyType>,
    #[serde(default)]
    pub tie_break: Option<TieBreak>,
    /// Write the assignments back to the snapshot.
    #[serde(default)]
    pub apply: bool,
}

impl AllocateRequest {
    /// Run options, falling back to the configured defaults.
    pub fn options(&self, defaults: &AllocationSection) -> AllocationOptions {
        defaults.options(self.cohort, self.tie_break)
    }
}

/// Allocation of a snapshot supplied in the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreviewRequest {
    pub snapshot: Snapshot,
    #[serde(default)]
    pub cohort: Option<StudyType>,
    #[serde(default)]
    pub tie_break: Option<TieBreak>,
}

/// Allocation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateResponse {
    pub success: bool,
    pub cohort: Option<StudyType>,
    pub tie_break: Option<TieBreak>,
    /// Teams updated in the snapshot; `None` for a dry run.
    pub applied: Option<usize>,
    pub result: Option<AllocationResult>,
    pub error: Option<String>,
}

impl AllocateResponse {
    pub fn success(
        options: &AllocationOptions,
        result: AllocationResult,
        applied: Option<usize>,
    ) -> Self {
        Self {
            success: true,
            cohort: options.cohort,
            tie_break: Some(options.tie_break),
            applied,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            cohort: None,
            tie_break: None,
            applied: None,
            result: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// RESET REQUEST/RESPONSE
// =============================================================================

/// Clear assignments; all cohorts when `cohort` is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetRequest {
    #[serde(default)]
    pub cohort: Option<StudyType>,
}

/// Clear the selections of one cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetSelectionsRequest {
    pub cohort: StudyType,
}

/// Response of both reset endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    pub cleared: usize,
    pub error: Option<String>,
}

impl ResetResponse {
    pub fn success(cleared: usize) -> Self {
        Self {
            success: true,
            cleared,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            cleared: 0,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// SNAPSHOT RESPONSE
// =============================================================================

/// Response of `PUT /snapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub success: bool,
    pub teams: usize,
    pub students: usize,
    pub projects: usize,
    pub error: Option<String>,
}

impl SnapshotResponse {
    pub fn success(snapshot: &Snapshot) -> Self {
        Self {
            success: true,
            teams: snapshot.teams.len(),
            students: snapshot.students.len(),
            projects: snapshot.projects.len(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            teams: 0,
            students: 0,
            projects: 0,
            error: Some(msg.into()),
        }
    }
}
