//! # Snapshot
//!
//! The in-memory form of everything one allocation run reads: teams,
//! students, and (for presentation) projects. The app loads and stores
//! snapshots; this module only validates and mutates them.
//!
//! Mutations are all-or-nothing. `apply_result` checks every assignment
//! against the snapshot before touching any team.

use crate::cohort::in_cohort;
use crate::primitives::{MAX_PREFERENCES, MAX_STUDENTS, MAX_TEAMS};
use crate::{
    AllocationOptions, AllocationResult, Allocator, GradTrackError, Project, Student,
    StudentDirectory, StudyType, Team, TeamId, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Teams, students, and projects as fetched from storage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Snapshot {
    #[must_use]
    pub fn new(teams: Vec<Team>, students: Vec<Student>) -> Self {
        Self {
            teams,
            students,
            projects: Vec::new(),
        }
    }

    /// Directory over this snapshot's students.
    #[must_use]
    pub fn directory(&self) -> StudentDirectory<'_> {
        StudentDirectory::new(&self.students)
    }

    /// Reject snapshots beyond the size limits.
    pub fn validate_limits(&self) -> Result<(), GradTrackError> {
        if self.teams.len() > MAX_TEAMS {
            return Err(GradTrackError::SnapshotTooLarge {
                size: self.teams.len(),
                max: MAX_TEAMS,
            });
        }
        if self.students.len() > MAX_STUDENTS {
            return Err(GradTrackError::SnapshotTooLarge {
                size: self.students.len(),
                max: MAX_STUDENTS,
            });
        }
        if let Some(team) = self
            .teams
            .iter()
            .find(|t| t.selected_projects.len() > MAX_PREFERENCES)
        {
            return Err(GradTrackError::SnapshotTooLarge {
                size: team.selected_projects.len(),
                max: MAX_PREFERENCES,
            });
        }
        Ok(())
    }

    /// Run the allocator over this snapshot.
    pub fn allocate(&self, options: AllocationOptions) -> Result<AllocationResult, GradTrackError> {
        self.validate_limits()?;
        Allocator::new(options).run(&self.teams, &self.directory())
    }

    /// Write each assignment onto its team record.
    ///
    /// Sets `assignedProjectId`, `assignedChoiceRank`, and `assignedDate`.
    /// Fails without modifying anything if the result lists a project twice
    /// (`DuplicateProjects`) or an assignment names a team missing from the
    /// snapshot (`UnknownTeam`). Returns the number of teams updated.
    pub fn apply_result(
        &mut self,
        result: &AllocationResult,
        at: Timestamp,
    ) -> Result<usize, GradTrackError> {
        if !result.statistics.duplicate_projects.is_empty() {
            return Err(GradTrackError::DuplicateProjects(
                result.statistics.duplicate_projects.clone(),
            ));
        }

        let index: BTreeMap<TeamId, usize> = self
            .teams
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        let mut targets = Vec::with_capacity(result.assignments.len());
        for assignment in &result.assignments {
            let slot = index
                .get(&assignment.team_id)
                .copied()
                .ok_or_else(|| GradTrackError::UnknownTeam(assignment.team_id.clone()))?;
            targets.push((slot, assignment));
        }

        for (slot, assignment) in &targets {
            if let Some(team) = self.teams.get_mut(*slot) {
                team.assigned_project_id = Some(assignment.project_id.clone());
                team.assigned_choice_rank = Some(assignment.choice_rank);
                team.assigned_date = Some(at);
            }
        }

        Ok(targets.len())
    }

    /// Clear assignment fields, optionally only within one cohort.
    ///
    /// Returns the number of teams that had an assignment.
    pub fn reset_assignments(&mut self, cohort: Option<StudyType>) -> usize {
        let selected = self.cohort_members(cohort);
        let mut cleared = 0usize;
        for (team, keep) in self.teams.iter_mut().zip(selected) {
            if keep && team.is_assigned() {
                team.assigned_project_id = None;
                team.assigned_choice_rank = None;
                team.assigned_date = None;
                cleared = cleared.saturating_add(1);
            }
        }
        cleared
    }

    /// Clear `selectedProjects` for every team of a cohort that has any.
    ///
    /// Returns the number of teams cleared.
    pub fn reset_selections(&mut self, cohort: StudyType) -> usize {
        let selected = self.cohort_members(Some(cohort));
        let mut cleared = 0usize;
        for (team, keep) in self.teams.iter_mut().zip(selected) {
            if keep && team.has_selections() {
                team.selected_projects.clear();
                cleared = cleared.saturating_add(1);
            }
        }
        cleared
    }

    /// Per-team cohort membership flags, in team order.
    fn cohort_members(&self, cohort: Option<StudyType>) -> Vec<bool> {
        let directory = self.directory();
        self.teams
            .iter()
            .map(|team| in_cohort(team, cohort, &directory))
            .collect()
    }
}
