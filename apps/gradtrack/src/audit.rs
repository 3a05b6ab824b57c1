//! # Allocation Audit Logging
//!
//! Structured `tracing` events for allocation runs, shared by the CLI and
//! the HTTP API so both leave the same trail.

use gradtrack_core::{AllocationOptions, AllocationResult};

/// Log the outcome of one allocation run.
///
/// A non-empty duplicate list is logged at `error` level: such a result
/// must never be written back.
pub fn log_run(options: &AllocationOptions, result: &AllocationResult, applied: bool) {
    let cohort = options.cohort.map_or("all", |c| c.name());
    let stats = &result.statistics;

    tracing::info!(
        event = "allocation_run",
        cohort,
        tie_break = options.tie_break.name(),
        total_teams = stats.total_teams,
        assigned = stats.assigned_count,
        unassigned = stats.unassigned_count,
        applied,
        "Allocation finished: {}/{} teams assigned",
        stats.assigned_count,
        stats.total_teams
    );

    if !stats.duplicate_projects.is_empty() {
        let duplicates: Vec<&str> = stats
            .duplicate_projects
            .iter()
            .map(|p| p.as_str())
            .collect();
        tracing::error!(
            event = "allocation_integrity",
            cohort,
            duplicates = ?duplicates,
            "Projects assigned more than once; result must not be applied"
        );
    }
}
