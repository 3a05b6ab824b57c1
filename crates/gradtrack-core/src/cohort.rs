//! # Study Cohorts
//!
//! Morning and evening students are allocated in separate runs. A team's
//! cohort comes from its own `studyType` label, or from its first listed
//! member's label when the team has none.

use crate::{StudentDirectory, StudyType, Team};

/// The cohort a team belongs to. Unlabelled teams are morning teams.
pub fn team_cohort(team: &Team, directory: &StudentDirectory<'_>) -> StudyType {
    let own = team
        .study_type
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty());

    let label = own.or_else(|| {
        team.member_uids
            .first()
            .and_then(|uid| directory.get(uid))
            .and_then(|student| student.study_type.as_deref())
    });

    label.map_or(StudyType::Morning, StudyType::classify)
}

/// Whether a team falls inside an optional cohort restriction.
pub fn in_cohort(team: &Team, cohort: Option<StudyType>, directory: &StudentDirectory<'_>) -> bool {
    cohort.is_none_or(|wanted| team_cohort(team, directory) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Student;

    fn labelled(id: &str, label: &str) -> Student {
        Student {
            study_type: Some(label.to_string()),
            ..Student::new(id, 3.0)
        }
    }

    #[test]
    fn team_label_wins() {
        let students = vec![labelled("s1", "morning")];
        let directory = StudentDirectory::new(&students);
        let mut team = Team::new("t1", ["P1"]).with_members(["s1"]);
        team.study_type = Some("Evening".to_string());

        assert_eq!(team_cohort(&team, &directory), StudyType::Evening);
    }

    #[test]
    fn first_member_label_used_when_team_unlabelled() {
        let students = vec![labelled("s1", "مسائية"), labelled("s2", "morning")];
        let directory = StudentDirectory::new(&students);
        let team = Team::new("t1", ["P1"]).with_members(["s1", "s2"]);

        assert_eq!(team_cohort(&team, &directory), StudyType::Evening);
    }

    #[test]
    fn unknown_defaults_to_morning() {
        let directory = StudentDirectory::new(&[]);
        let team = Team::new("t1", ["P1"]).with_members(["ghost"]);

        assert_eq!(team_cohort(&team, &directory), StudyType::Morning);
        assert!(in_cohort(&team, None, &directory));
        assert!(in_cohort(&team, Some(StudyType::Morning), &directory));
        assert!(!in_cohort(&team, Some(StudyType::Evening), &directory));
    }
}
