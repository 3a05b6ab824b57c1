//! # Allocation Engine
//!
//! GPA-priority project allocation: every eligible team receives at most one
//! project from its own ranked list, and no project goes to two teams.
//!
//! ## Algorithm
//!
//! 1. Drop teams outside the requested cohort and teams with no preferences.
//! 2. Materialize a working record per team (own copy of its choices, its
//!    `maxGPA` from the GPA resolver).
//! 3. Sort by `maxGPA` descending, ties broken by the configured `TieBreak`.
//! 4. Single greedy pass in that order: each team claims the first choice
//!    not yet claimed. A team whose every choice is taken stays unassigned.
//!
//! A claim is permanent. A lower-priority team never displaces a higher one,
//! even when the project is its first choice and the holder's third.
//!
//! ## Errors
//!
//! Only caller-contract violations fail a run (an empty team id, two teams
//! sharing an id). Missing members, unparseable GPAs, dangling project ids,
//! and empty lists degrade to "sorts last" or "unassigned".

use crate::cohort::in_cohort;
use crate::gpa::team_max_gpa;
use crate::primitives::FIRST_CHOICE_RANK;
use crate::{
    AllocationResult, Assignment, Gpa, GradTrackError, ProjectId, StudentDirectory, StudyType,
    Team, TeamId, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// OPTIONS
// =============================================================================

/// How teams with equal `maxGPA` are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Earlier `createdAt` first; teams without one after teams with one;
    /// remaining ties in input order.
    #[default]
    CreatedAt,
    /// Input order only.
    InputOrder,
}

impl TieBreak {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::InputOrder => "input_order",
        }
    }
}

impl FromStr for TieBreak {
    type Err = GradTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "created_at" | "createdat" => Ok(Self::CreatedAt),
            "input_order" | "inputorder" => Ok(Self::InputOrder),
            other => Err(GradTrackError::InvalidConfig(format!(
                "unknown tie-break '{}' (expected created_at or input_order)",
                other
            ))),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of one allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationOptions {
    pub tie_break: TieBreak,
    /// Restrict the run to one cohort. `None` allocates every team.
    pub cohort: Option<StudyType>,
}

// =============================================================================
// WORKING RECORDS
// =============================================================================

/// Per-run copy of an eligible team.
#[derive(Debug, Clone)]
struct Candidate {
    id: TeamId,
    max_gpa: Gpa,
    created_at: Option<Timestamp>,
    input_index: usize,
    choices: Vec<ProjectId>,
}

impl Candidate {
    fn priority_cmp(&self, other: &Self, tie_break: TieBreak) -> Ordering {
        let by_gpa = other.max_gpa.total_cmp(&self.max_gpa);
        let by_age = match tie_break {
            TieBreak::CreatedAt => match (self.created_at, other.created_at) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            TieBreak::InputOrder => Ordering::Equal,
        };
        by_gpa
            .then(by_age)
            .then(self.input_index.cmp(&other.input_index))
    }
}

// =============================================================================
// ALLOCATOR
// =============================================================================

/// Stateless allocation engine. Each `run` is independent of every other.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allocator {
    options: AllocationOptions,
}

impl Allocator {
    #[must_use]
    pub const fn new(options: AllocationOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> AllocationOptions {
        self.options
    }

    /// Allocate projects to `teams`, scoring members through `directory`.
    pub fn run(
        &self,
        teams: &[Team],
        directory: &StudentDirectory<'_>,
    ) -> Result<AllocationResult, GradTrackError> {
        validate_team_ids(teams)?;

        let mut candidates = self.candidates(teams, directory);
        candidates.sort_by(|a, b| a.priority_cmp(b, self.options.tie_break));

        let total_teams = candidates.len();
        let assignments = assign_greedy(&candidates);

        Ok(AllocationResult::new(assignments, total_teams))
    }

    /// Teams in the order the greedy pass will visit them, with their scores.
    ///
    /// Exposed for previews and reports; `run` uses the same ordering.
    pub fn priority_order(
        &self,
        teams: &[Team],
        directory: &StudentDirectory<'_>,
    ) -> Result<Vec<(TeamId, Gpa)>, GradTrackError> {
        validate_team_ids(teams)?;

        let mut candidates = self.candidates(teams, directory);
        candidates.sort_by(|a, b| a.priority_cmp(b, self.options.tie_break));
        Ok(candidates.into_iter().map(|c| (c.id, c.max_gpa)).collect())
    }

    fn candidates(&self, teams: &[Team], directory: &StudentDirectory<'_>) -> Vec<Candidate> {
        teams
            .iter()
            .enumerate()
            .filter(|(_, team)| in_cohort(team, self.options.cohort, directory))
            .filter(|(_, team)| team.has_selections())
            .map(|(input_index, team)| Candidate {
                id: team.id.clone(),
                max_gpa: team_max_gpa(team, directory),
                created_at: team.created_at,
                input_index,
                choices: team.selected_projects.clone(),
            })
            .collect()
    }
}

/// Run with default options (`createdAt` tie-break, all cohorts).
pub fn allocate(
    teams: &[Team],
    directory: &StudentDirectory<'_>,
) -> Result<AllocationResult, GradTrackError> {
    Allocator::default().run(teams, directory)
}

fn validate_team_ids(teams: &[Team]) -> Result<(), GradTrackError> {
    let mut seen: BTreeSet<&TeamId> = BTreeSet::new();
    for team in teams {
        if team.id.is_empty() {
            return Err(GradTrackError::EmptyIdentifier("team id"));
        }
        if !seen.insert(&team.id) {
            return Err(GradTrackError::DuplicateTeam(team.id.clone()));
        }
    }
    Ok(())
}

/// The greedy pass over candidates already in priority order.
fn assign_greedy(candidates: &[Candidate]) -> Vec<Assignment> {
    let mut claimed: BTreeSet<&ProjectId> = BTreeSet::new();
    let mut assignments = Vec::new();

    for candidate in candidates {
        let first_free = candidate
            .choices
            .iter()
            .enumerate()
            .find(|(_, project)| !claimed.contains(project));

        if let Some((index, project)) = first_free {
            claimed.insert(project);
            assignments.push(Assignment {
                team_id: candidate.id.clone(),
                project_id: project.clone(),
                max_gpa: candidate.max_gpa,
                choice_rank: FIRST_CHOICE_RANK.saturating_add(index as u32),
            });
        }
    }

    assignments
}

// =============================================================================
// TESTS
// =============================================================================
