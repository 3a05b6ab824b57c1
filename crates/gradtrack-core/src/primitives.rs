//! # Allocation Primitives
//!
//! Fixed constants for the GradTrack CORE.
//!
//! These are compiled into the binary and are immutable at runtime.

/// Rank recorded when a team receives its first preference.
///
/// Choice ranks are 1-based positions in a team's `selectedProjects`.
pub const FIRST_CHOICE_RANK: u32 = 1;

/// Lower-cased fragments that mark a study type label as the evening cohort.
///
/// Labels arrive in English or Arabic (`مسائية`, "evening study").
pub const EVENING_MARKERS: &[&str] = &["evening", "مسائ"];

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of teams accepted in a single snapshot.
///
/// Snapshots larger than this are rejected before allocation.
pub const MAX_TEAMS: usize = 50_000;

/// Maximum number of students accepted in a single snapshot.
pub const MAX_STUDENTS: usize = 250_000;

/// Maximum number of ranked preferences considered per team.
///
/// Longer lists are rejected at the snapshot boundary; the engine itself
/// places no bound on a team's list.
pub const MAX_PREFERENCES: usize = 1_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_is_one_based() {
        assert_eq!(FIRST_CHOICE_RANK, 1);
    }

    #[test]
    fn evening_markers_are_lowercase() {
        for marker in EVENING_MARKERS {
            assert_eq!(marker.to_lowercase(), *marker);
        }
    }
}
