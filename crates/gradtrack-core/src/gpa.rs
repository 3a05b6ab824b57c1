//! # GPA Resolver
//!
//! Computes one priority score per team: the highest GPA among the team's
//! resolvable members.
//!
//! Members are resolved through `memberUIDs`. Team records that carry no
//! member list are reverse-resolved through the students' `teamCode`
//! back-references instead. Both paths go through a `StudentDirectory`
//! built once per run, so the fallback costs one index lookup rather than a
//! scan of every student.

use crate::{Gpa, Student, StudentId, Team, TeamId};
use std::collections::BTreeMap;

// =============================================================================
// STUDENT DIRECTORY
// =============================================================================

/// Lookup from student id to record, plus the reverse `teamCode` index.
///
/// When two input records share an id the later one wins, and only the
/// winning record takes part in the reverse index.
#[derive(Debug, Clone, Default)]
pub struct StudentDirectory<'a> {
    by_id: BTreeMap<&'a StudentId, &'a Student>,
    by_team: BTreeMap<&'a TeamId, Vec<&'a Student>>,
}

impl<'a> StudentDirectory<'a> {
    /// Build the directory over a student list.
    #[must_use]
    pub fn new(students: &'a [Student]) -> Self {
        let mut by_id = BTreeMap::new();
        for student in students {
            by_id.insert(&student.id, student);
        }

        let mut by_team: BTreeMap<&'a TeamId, Vec<&'a Student>> = BTreeMap::new();
        for student in by_id.values() {
            if let Some(code) = student.team_code.as_ref() {
                by_team.entry(code).or_default().push(*student);
            }
        }

        Self { by_id, by_team }
    }

    /// Look up a student by id.
    #[must_use]
    pub fn get(&self, id: &StudentId) -> Option<&'a Student> {
        self.by_id.get(id).copied()
    }

    /// Students whose `teamCode` names the given team, in id order.
    #[must_use]
    pub fn members_of(&self, team: &TeamId) -> &[&'a Student] {
        self.by_team.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct students.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// The students that count toward a team's score.
///
/// Uses `memberUIDs` when the team has any, silently skipping ids with no
/// record; otherwise falls back to the `teamCode` reverse index.
pub fn resolve_members<'a>(team: &Team, directory: &StudentDirectory<'a>) -> Vec<&'a Student> {
    if team.member_uids.is_empty() {
        directory.members_of(&team.id).to_vec()
    } else {
        team.member_uids
            .iter()
            .filter_map(|uid| directory.get(uid))
            .collect()
    }
}

/// Maximum parsed GPA among a team's resolved members, zero if none resolve.
pub fn team_max_gpa(team: &Team, directory: &StudentDirectory<'_>) -> Gpa {
    resolve_members(team, directory)
        .into_iter()
        .map(Student::gpa)
        .fold(Gpa::ZERO, Gpa::max)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawGpa;

    fn student_with_raw(id: &str, gpa: Option<RawGpa>) -> Student {
        Student {
            gpa,
            ..Student::new(id, 0.0)
        }
    }

    #[test]
    fn max_over_listed_members() {
        let students = vec![
            Student::new("s1", 3.1),
            Student::new("s2", 3.6),
            Student::new("s3", 2.4),
        ];
        let directory = StudentDirectory::new(&students);
        let team = Team::new("t1", ["P1"]).with_members(["s1", "s2", "s3"]);

        assert_eq!(team_max_gpa(&team, &directory).value(), 3.6);
    }

    #[test]
    fn string_and_null_gpa_mix() {
        let students = vec![
            student_with_raw("s1", Some(RawGpa::Text("3.7".to_string()))),
            student_with_raw("s2", None),
        ];
        let directory = StudentDirectory::new(&students);
        let team = Team::new("t1", ["P1"]).with_members(["s1", "s2"]);

        assert_eq!(team_max_gpa(&team, &directory).value(), 3.7);
    }

    #[test]
    fn dangling_member_ids_are_skipped() {
        let students = vec![Student::new("s1", 2.9)];
        let directory = StudentDirectory::new(&students);
        let team = Team::new("t1", ["P1"]).with_members(["ghost", "s1", "also-gone"]);

        assert_eq!(team_max_gpa(&team, &directory).value(), 2.9);
    }

    #[test]
    fn no_resolvable_members_is_zero() {
        let students = vec![Student::new("s1", 3.9)];
        let directory = StudentDirectory::new(&students);
        let team = Team::new("t1", ["P1"]).with_members(["ghost"]);

        assert!(team_max_gpa(&team, &directory).is_zero());
    }

    #[test]
    fn falls_back_to_team_code_when_member_list_empty() {
        let students = vec![
            Student::new("s1", 3.2).with_team_code("t1"),
            Student::new("s2", 3.8).with_team_code("t1"),
            Student::new("s3", 4.0).with_team_code("t2"),
        ];
        let directory = StudentDirectory::new(&students);
        let team = Team::new("t1", ["P1"]);

        assert_eq!(team_max_gpa(&team, &directory).value(), 3.8);
    }

    #[test]
    fn member_list_takes_precedence_over_team_code() {
        let students = vec![
            Student::new("s1", 2.0),
            Student::new("s2", 3.9).with_team_code("t1"),
        ];
        let directory = StudentDirectory::new(&students);
        let team = Team::new("t1", ["P1"]).with_members(["s1"]);

        assert_eq!(team_max_gpa(&team, &directory).value(), 2.0);
    }

    #[test]
    fn later_duplicate_student_record_wins() {
        let students = vec![
            Student::new("s1", 3.9).with_team_code("t1"),
            Student::new("s1", 2.1).with_team_code("t2"),
        ];
        let directory = StudentDirectory::new(&students);

        assert_eq!(directory.len(), 1);
        assert!(directory.members_of(&TeamId::from("t1")).is_empty());
        assert_eq!(directory.members_of(&TeamId::from("t2")).len(), 1);
        let team = Team::new("t2", ["P1"]);
        assert_eq!(team_max_gpa(&team, &directory).value(), 2.1);
    }
}
