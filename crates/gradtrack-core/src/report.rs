//! # Distribution Reports
//!
//! Read-only views over a snapshot for the admin screens: how many teams
//! exist, how many have ranked projects, how many are assigned, and the
//! final result list per cohort.

use crate::cohort::team_cohort;
use crate::{Project, ProjectId, Snapshot, StudyType, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts for one cohort (or for all teams).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortCounts {
    pub teams: usize,
    pub with_selections: usize,
    pub assigned: usize,
}

impl CohortCounts {
    fn record(&mut self, has_selections: bool, assigned: bool) {
        self.teams = self.teams.saturating_add(1);
        if has_selections {
            self.with_selections = self.with_selections.saturating_add(1);
        }
        if assigned {
            self.assigned = self.assigned.saturating_add(1);
        }
    }
}

/// Distribution progress across the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DistributionOverview {
    pub total: CohortCounts,
    pub morning: CohortCounts,
    pub evening: CohortCounts,
}

impl DistributionOverview {
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let directory = snapshot.directory();
        let mut overview = Self::default();

        for team in &snapshot.teams {
            let has_selections = team.has_selections();
            let assigned = team.is_assigned();
            overview.total.record(has_selections, assigned);
            match team_cohort(team, &directory) {
                StudyType::Morning => overview.morning.record(has_selections, assigned),
                StudyType::Evening => overview.evening.record(has_selections, assigned),
            }
        }

        overview
    }

    #[must_use]
    pub fn cohort(&self, cohort: StudyType) -> CohortCounts {
        match cohort {
            StudyType::Morning => self.morning,
            StudyType::Evening => self.evening,
        }
    }
}

/// One line of the published result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub project_id: ProjectId,
    pub project_title: Option<String>,
    pub supervisor_id: Option<String>,
    /// Position of the project in the team's current selections, if still listed.
    pub choice_rank: Option<u32>,
}

/// Assigned teams of a cohort whose project still exists, in snapshot order.
#[must_use]
pub fn results(snapshot: &Snapshot, cohort: StudyType) -> Vec<ResultRow> {
    let directory = snapshot.directory();
    let projects: BTreeMap<&ProjectId, &Project> =
        snapshot.projects.iter().map(|p| (&p.id, p)).collect();

    snapshot
        .teams
        .iter()
        .filter(|team| team_cohort(team, &directory) == cohort)
        .filter_map(|team| {
            let assigned = team.assigned_project_id.as_ref()?;
            let project = projects.get(assigned)?;
            let choice_rank = team
                .selected_projects
                .iter()
                .position(|p| p == assigned)
                .map(|i| (i as u32).saturating_add(1));
            Some(ResultRow {
                team_id: team.id.clone(),
                team_name: team.display_name().to_string(),
                project_id: assigned.clone(),
                project_title: project.title.clone(),
                supervisor_id: project.supervisor_id.clone(),
                choice_rank,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Student, Team};

    fn snapshot() -> Snapshot {
        let mut assigned = Team::new("t1", ["P1", "P2"]);
        assigned.assigned_project_id = Some(ProjectId::from("P2"));
        assigned.name = Some("Falcons".to_string());

        let mut evening = Team::new("t2", ["P3"]).with_members(["s2"]);
        evening.assigned_project_id = Some(ProjectId::from("P3"));

        let mut orphaned = Team::new("t3", Vec::<String>::new());
        orphaned.assigned_project_id = Some(ProjectId::from("P_deleted"));

        let mut student = Student::new("s2", 3.0);
        student.study_type = Some("Evening".to_string());

        Snapshot {
            teams: vec![assigned, evening, orphaned, Team::new("t4", ["P1"])],
            students: vec![student],
            projects: vec![
                Project {
                    id: ProjectId::from("P2"),
                    title: Some("Campus Navigator".to_string()),
                    supervisor_id: Some("sup-1".to_string()),
                },
                Project {
                    id: ProjectId::from("P3"),
                    title: None,
                    supervisor_id: None,
                },
            ],
        }
    }

    #[test]
    fn overview_counts_per_cohort() {
        let overview = DistributionOverview::from_snapshot(&snapshot());

        assert_eq!(overview.total.teams, 4);
        assert_eq!(overview.total.with_selections, 3);
        assert_eq!(overview.total.assigned, 3);
        assert_eq!(overview.evening.teams, 1);
        assert_eq!(overview.morning.teams, 3);
        assert_eq!(overview.cohort(StudyType::Morning).assigned, 2);
    }

    #[test]
    fn results_skip_missing_projects() {
        let rows = results(&snapshot(), StudyType::Morning);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team_name, "Falcons");
        assert_eq!(rows[0].project_title.as_deref(), Some("Campus Navigator"));
        assert_eq!(rows[0].choice_rank, Some(2));

        let evening = results(&snapshot(), StudyType::Evening);
        assert_eq!(evening.len(), 1);
        assert_eq!(evening[0].team_name, "t2");
    }

    #[test]
    fn report_fields_serialize_camel_case() {
        let overview = serde_json::to_value(DistributionOverview::from_snapshot(&snapshot()))
            .expect("serialize");
        assert_eq!(overview["total"]["withSelections"], 3);
        assert!(overview["total"].get("with_selections").is_none());

        let row = serde_json::to_value(&results(&snapshot(), StudyType::Morning)[0])
            .expect("serialize");
        assert_eq!(row["teamId"], "t1");
        assert_eq!(row["teamName"], "Falcons");
        assert_eq!(row["projectTitle"], "Campus Navigator");
        assert_eq!(row["supervisorId"], "sup-1");
        assert_eq!(row["choiceRank"], 2);
    }
}
