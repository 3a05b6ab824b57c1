//! # Property-Based Tests
//!
//! Invariants every allocation run must satisfy, checked with proptest over
//! random teams, GPAs (including garbage), and overlapping preference lists.

use gradtrack_core::{
    AllocationOptions, AllocationResult, Allocator, Gpa, ProjectId, RawGpa, Student,
    StudentDirectory, Team, TeamId, TieBreak,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// GENERATORS
// =============================================================================

/// A GPA field as it might appear in the wild: numeric text, garbage, or absent.
fn raw_gpa() -> impl Strategy<Value = Option<RawGpa>> {
    prop_oneof![
        4 => (0u32..5, 0u32..100).prop_map(|(whole, frac)| Some(RawGpa::Text(format!("{}.{:02}", whole, frac)))),
        1 => Just(Some(RawGpa::Text("n/a".to_string()))),
        1 => Just(Some(RawGpa::Malformed)),
        1 => Just(None),
    ]
}

/// (choices as project indices, lead GPA, created-at)
fn team_input() -> impl Strategy<Value = (Vec<u8>, Option<RawGpa>, Option<i64>)> {
    (vec(0u8..8, 0..5), raw_gpa(), proptest::option::of(0i64..5))
}

fn build(inputs: &[(Vec<u8>, Option<RawGpa>, Option<i64>)]) -> (Vec<Team>, Vec<Student>) {
    inputs
        .iter()
        .enumerate()
        .map(|(i, (choices, gpa, created))| {
            let team_id = format!("T{}", i);
            let lead_id = format!("S{}", i);
            let mut team = Team::new(team_id, choices.iter().map(|p| format!("P{}", p)))
                .with_members([lead_id.clone()]);
            team.created_at = created.map(gradtrack_core::Timestamp);
            let student = Student {
                gpa: gpa.clone(),
                ..Student::new(lead_id, 0.0)
            };
            (team, student)
        })
        .unzip()
}

fn run(teams: &[Team], students: &[Student], tie_break: TieBreak) -> (AllocationResult, Vec<(TeamId, Gpa)>) {
    let allocator = Allocator::new(AllocationOptions {
        tie_break,
        cohort: None,
    });
    let directory = StudentDirectory::new(students);
    let result = allocator.run(teams, &directory).expect("run");
    let order = allocator.priority_order(teams, &directory).expect("order");
    (result, order)
}

fn tie_break() -> impl Strategy<Value = TieBreak> {
    prop_oneof![Just(TieBreak::CreatedAt), Just(TieBreak::InputOrder)]
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// No project appears in two assignments, and the integrity check agrees.
    #[test]
    fn no_project_assigned_twice(inputs in vec(team_input(), 0..16), tb in tie_break()) {
        let (teams, students) = build(&inputs);
        let (result, _) = run(&teams, &students, tb);

        let unique: BTreeSet<&ProjectId> = result.assignments.iter().map(|a| &a.project_id).collect();
        prop_assert_eq!(unique.len(), result.assignments.len());
        prop_assert!(result.statistics.duplicate_projects.is_empty());
    }

    /// No team appears in two assignments.
    #[test]
    fn no_team_assigned_twice(inputs in vec(team_input(), 0..16), tb in tie_break()) {
        let (teams, students) = build(&inputs);
        let (result, _) = run(&teams, &students, tb);

        let unique: BTreeSet<&TeamId> = result.assignments.iter().map(|a| &a.team_id).collect();
        prop_assert_eq!(unique.len(), result.assignments.len());
    }

    /// Processing order is by GPA descending, and every earlier choice of an
    /// assigned team (every choice of an unassigned team) is held by a team
    /// processed before it.
    #[test]
    fn best_available_choice_in_priority_order(inputs in vec(team_input(), 0..16), tb in tie_break()) {
        let (teams, students) = build(&inputs);
        let (result, order) = run(&teams, &students, tb);

        for pair in order.windows(2) {
            prop_assert!(pair[0].1.total_cmp(&pair[1].1) != std::cmp::Ordering::Less);
        }

        let position: BTreeMap<&TeamId, usize> =
            order.iter().enumerate().map(|(i, (id, _))| (id, i)).collect();
        let holder: BTreeMap<&ProjectId, &TeamId> =
            result.assignments.iter().map(|a| (&a.project_id, &a.team_id)).collect();

        for team in teams.iter().filter(|t| t.has_selections()) {
            let my_pos = position[&team.id];
            let blocked_prefix = match result.assignment_for(&team.id) {
                Some(a) => {
                    let rank = a.choice_rank as usize;
                    prop_assert!(rank >= 1);
                    prop_assert_eq!(&team.selected_projects[rank - 1], &a.project_id);
                    &team.selected_projects[..rank - 1]
                }
                None => &team.selected_projects[..],
            };
            for project in blocked_prefix {
                let owner = holder.get(project);
                prop_assert!(owner.is_some(), "free project {} skipped by {}", project, team.id);
                if let Some(owner) = owner {
                    prop_assert!(position[owner] < my_pos);
                }
            }
        }
    }

    /// assigned + unassigned == total == teams with preferences.
    #[test]
    fn counts_are_conserved(inputs in vec(team_input(), 0..16)) {
        let (teams, students) = build(&inputs);
        let (result, _) = run(&teams, &students, TieBreak::CreatedAt);

        let stats = &result.statistics;
        prop_assert_eq!(stats.assigned_count + stats.unassigned_count, stats.total_teams);
        prop_assert_eq!(stats.total_teams, teams.iter().filter(|t| t.has_selections()).count());
        prop_assert_eq!(stats.assigned_count, result.assignments.len());
    }

    /// Teams with no usable GPA score zero and never precede a positive team.
    #[test]
    fn unusable_gpa_sorts_last(inputs in vec(team_input(), 0..16)) {
        let (teams, students) = build(&inputs);
        let (_, order) = run(&teams, &students, TieBreak::CreatedAt);

        let first_zero = order.iter().position(|(_, gpa)| gpa.is_zero());
        if let Some(start) = first_zero {
            prop_assert!(order[start..].iter().all(|(_, gpa)| gpa.is_zero()));
        }
        for (team, student) in teams.iter().zip(&students) {
            let unusable = match &student.gpa {
                None | Some(RawGpa::Malformed) => true,
                Some(raw) => raw.resolve().is_zero(),
            };
            if unusable && team.has_selections() {
                let gpa = order.iter().find(|(id, _)| id == &team.id).map(|(_, g)| *g);
                prop_assert_eq!(gpa.map(Gpa::is_zero), Some(true));
            }
        }
    }

    /// Running twice on the same input yields the same result.
    #[test]
    fn rerun_is_identical(inputs in vec(team_input(), 0..16), tb in tie_break()) {
        let (teams, students) = build(&inputs);
        let (first, _) = run(&teams, &students, tb);
        let (second, _) = run(&teams, &students, tb);

        prop_assert_eq!(first, second);
    }

    /// Never more assignments than eligible teams or distinct projects.
    #[test]
    fn assignments_bounded(inputs in vec(team_input(), 0..16)) {
        let (teams, students) = build(&inputs);
        let (result, _) = run(&teams, &students, TieBreak::CreatedAt);

        let distinct: BTreeSet<&ProjectId> =
            teams.iter().flat_map(|t| t.selected_projects.iter()).collect();
        prop_assert!(result.assignments.len() <= distinct.len());
        prop_assert!(result.assignments.len() <= result.statistics.total_teams);
    }
}
