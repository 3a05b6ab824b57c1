//! # Allocation Result
//!
//! The output of one allocation run: the ordered assignment list plus
//! summary statistics. Field names follow the JSON contract the admin
//! flow persists and displays (`teamId`, `maxGPA`, `choiceRank`, ...).

use crate::{Gpa, ProjectId, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One matched team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub team_id: TeamId,
    pub project_id: ProjectId,
    #[serde(rename = "maxGPA")]
    pub max_gpa: Gpa,
    /// 1-based position of `project_id` in the team's preferences.
    pub choice_rank: u32,
}

/// Run summary.
///
/// `assigned_count + unassigned_count == total_teams`, where `total_teams`
/// counts only teams that entered the run with a non-empty preference list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationStatistics {
    pub total_teams: usize,
    pub assigned_count: usize,
    pub unassigned_count: usize,
    /// Projects held by more than one assignment. Always empty unless the
    /// engine itself is broken.
    pub duplicate_projects: Vec<ProjectId>,
}

/// Assignments in processing (priority) order, plus statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationResult {
    pub assignments: Vec<Assignment>,
    pub statistics: AllocationStatistics,
}

impl AllocationResult {
    /// Assemble a result, recounting project occurrences for the integrity check.
    #[must_use]
    pub fn new(assignments: Vec<Assignment>, total_teams: usize) -> Self {
        let duplicate_projects = find_duplicate_projects(&assignments);
        let assigned_count = assignments.len();
        let statistics = AllocationStatistics {
            total_teams,
            assigned_count,
            unassigned_count: total_teams.saturating_sub(assigned_count),
            duplicate_projects,
        };
        Self {
            assignments,
            statistics,
        }
    }

    /// Whether the run passed its integrity check and may be persisted.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.statistics.duplicate_projects.is_empty()
    }

    /// The assignment recorded for a team, if any.
    #[must_use]
    pub fn assignment_for(&self, team: &TeamId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.team_id == team)
    }
}

/// Project ids occurring more than once, in order of first appearance.
pub fn find_duplicate_projects(assignments: &[Assignment]) -> Vec<ProjectId> {
    let mut counts: BTreeMap<&ProjectId, usize> = BTreeMap::new();
    let mut first_seen: Vec<&ProjectId> = Vec::new();

    for assignment in assignments {
        let count = counts.entry(&assignment.project_id).or_insert(0);
        if *count == 0 {
            first_seen.push(&assignment.project_id);
        }
        *count = count.saturating_add(1);
    }

    first_seen
        .into_iter()
        .filter(|id| counts.get(id).is_some_and(|&c| c > 1))
        .cloned()
        .collect()
}
