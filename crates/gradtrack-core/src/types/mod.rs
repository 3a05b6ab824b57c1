//! # Core Type Definitions
//!
//! This module contains the record types the allocation engine reads:
//! - Identifiers (`StudentId`, `TeamId`, `ProjectId`)
//! - Priority score (`Gpa`) and the lenient raw field it is parsed from (`RawGpa`)
//! - Input records (`Student`, `Team`, `Project`) and the `Timestamp` they carry
//! - Study cohorts (`StudyType`)
//! - Error types (`GradTrackError`)
//!
//! ## Parsing Boundary
//!
//! Records arrive with loosely typed fields (a GPA may be a number, a string,
//! `null`, or garbage). Conversion to strict values happens once, here, through
//! parse-with-default helpers. Nothing past this module sees a raw field.

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::primitives::EVENING_MARKERS;

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier.
            #[must_use]
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Opaque student identifier (the student's account uid).
    StudentId
);

string_id!(
    /// Opaque team identifier. Doubles as the "team code" students join with.
    TeamId
);

string_id!(
    /// Opaque project identifier. The engine only ever compares these.
    ProjectId
);

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Build from a `{seconds, nanoseconds}` pair as document stores export it.
    #[must_use]
    pub fn from_parts(seconds: i64, nanoseconds: i64) -> Option<Self> {
        seconds
            .checked_mul(1_000)
            .and_then(|ms| ms.checked_add(nanoseconds / 1_000_000))
            .map(Self)
    }

    /// Parse a stored textual timestamp: integer milliseconds or RFC 3339.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if let Ok(ms) = trimmed.parse::<i64>() {
            return Some(Self(ms));
        }
        chrono::DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|dt| Self(dt.timestamp_millis()))
    }
}

/// Reads an optional timestamp field without ever failing the record.
///
/// Unrecognized shapes become `None`, which the tie-break orders after
/// every dated team.
struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Option<Timestamp>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a timestamp as millis, {seconds, nanoseconds}, or RFC 3339 text")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Timestamp(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).ok().map(Timestamp))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(v.is_finite().then_some(Timestamp(v as i64)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Timestamp::parse_lenient(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut seconds = None;
        let mut nanoseconds = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "seconds" | "_seconds" => seconds = map.next_value::<WholeNumber>()?.0,
                "nanoseconds" | "_nanoseconds" => nanoseconds = map.next_value::<WholeNumber>()?.0,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(seconds.and_then(|s| Timestamp::from_parts(s, nanoseconds.unwrap_or(0))))
    }
}

/// `{seconds, nanoseconds}` component; any non-integer shape reads as absent.
struct WholeNumber(Option<i64>);

impl<'de> Deserialize<'de> for WholeNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WholeNumberVisitor;

        impl<'de> Visitor<'de> for WholeNumberVisitor {
            type Value = WholeNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WholeNumber, E> {
                Ok(WholeNumber(Some(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WholeNumber, E> {
                Ok(WholeNumber(i64::try_from(v).ok()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<WholeNumber, E> {
                Ok(WholeNumber(v.is_finite().then_some(v as i64)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<WholeNumber, E> {
                Ok(WholeNumber(v.trim().parse().ok()))
            }

            fn visit_bool<E: de::Error>(self, _v: bool) -> Result<WholeNumber, E> {
                Ok(WholeNumber(None))
            }

            fn visit_unit<E: de::Error>(self) -> Result<WholeNumber, E> {
                Ok(WholeNumber(None))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<WholeNumber, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(WholeNumber(None))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<WholeNumber, A::Error> {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(WholeNumber(None))
            }
        }

        deserializer.deserialize_any(WholeNumberVisitor)
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(TimestampVisitor)
}

// =============================================================================
// GPA
// =============================================================================

/// A team or student priority score.
///
/// Always finite and non-negative. Anything else collapses to zero on
/// construction, so a `Gpa` can be ordered with a total order and never
/// carries a parse failure forward.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Gpa(f64);

impl Gpa {
    /// The score of a team with no resolvable members.
    pub const ZERO: Self = Self(0.0);

    /// Create a score, mapping negative, NaN, and infinite input to zero.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self::ZERO
        }
    }

    /// Parse a textual GPA the way spreadsheet-entered values need it.
    ///
    /// Leading and trailing whitespace is ignored and the longest numeric
    /// prefix is used (`"3.7 / 4"` is `3.7`). Text with no numeric prefix
    /// yields zero.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        numeric_prefix(text.trim())
            .parse::<f64>()
            .map_or(Self::ZERO, Self::new)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether this score is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Total order over scores (values are always finite).
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }

    /// The larger of two scores.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if other.total_cmp(&self) == Ordering::Greater {
            other
        } else {
            self
        }
    }
}

/// The leading decimal number of `text` in one left-to-right scan:
/// optional sign, digits, optional fraction, optional exponent.
/// Empty when `text` does not start with a number.
fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes
            .get(start..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits_from(end);
    end += whole;

    let mut mantissa = whole;
    if bytes.get(end) == Some(&b'.') {
        let fraction = digits_from(end + 1);
        if whole + fraction > 0 {
            end += 1 + fraction;
            mantissa += fraction;
        }
    }
    if mantissa == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }

    text.get(..end).unwrap_or_default()
}

impl From<f64> for Gpa {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Gpa> for f64 {
    fn from(gpa: Gpa) -> Self {
        gpa.0
    }
}

impl fmt::Display for Gpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// The GPA field exactly as it was stored on a student record.
///
/// Deserialization never fails on this field: any JSON shape that is neither
/// a number nor a string is kept as `Malformed`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawGpa {
    Number(f64),
    Text(String),
    Malformed,
}

impl RawGpa {
    /// Resolve to a strict score, defaulting to zero.
    #[must_use]
    pub fn resolve(&self) -> Gpa {
        match self {
            Self::Number(v) => Gpa::new(*v),
            Self::Text(s) => Gpa::parse_lenient(s),
            Self::Malformed => Gpa::ZERO,
        }
    }
}

impl Serialize for RawGpa {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Malformed => serializer.serialize_none(),
        }
    }
}

struct RawGpaVisitor;

impl<'de> Visitor<'de> for RawGpaVisitor {
    type Value = RawGpa;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a GPA as number or string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawGpa, E> {
        Ok(RawGpa::Number(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawGpa, E> {
        Ok(RawGpa::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawGpa, E> {
        Ok(RawGpa::Number(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawGpa, E> {
        Ok(RawGpa::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawGpa, E> {
        Ok(RawGpa::Text(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<RawGpa, E> {
        Ok(RawGpa::Malformed)
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawGpa, E> {
        Ok(RawGpa::Malformed)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawGpa, E> {
        Ok(RawGpa::Malformed)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawGpa, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawGpa::Malformed)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawGpa, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(RawGpa::Malformed)
    }
}

impl<'de> Deserialize<'de> for RawGpa {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawGpaVisitor)
    }
}

/// Treat an explicit `null` list the same as an absent one.
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// STUDY TYPE
// =============================================================================

/// The study cohort a team belongs to. Allocation runs may be scoped to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyType {
    Morning,
    Evening,
}

impl StudyType {
    /// Classify a free-form study type label.
    ///
    /// Anything that does not mark the evening cohort (including an empty
    /// label) is treated as morning.
    #[must_use]
    pub fn classify(label: &str) -> Self {
        let lowered = label.to_lowercase();
        if EVENING_MARKERS.iter().any(|m| lowered.contains(m)) {
            Self::Evening
        } else {
            Self::Morning
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
        }
    }
}

impl FromStr for StudyType {
    type Err = GradTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "صباحية" | "صباحي" => Ok(Self::Morning),
            "evening" | "مسائية" | "مسائي" => Ok(Self::Evening),
            other => Err(GradTrackError::InvalidConfig(format!(
                "unknown study type '{}' (expected morning or evening)",
                other
            ))),
        }
    }
}

impl fmt::Display for StudyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A student record. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Back-reference to the owning team, used when a team lacks `memberUIDs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_code: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<RawGpa>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_type: Option<String>,
}

impl Student {
    /// Create a student with just an id and a numeric GPA.
    #[must_use]
    pub fn new(id: impl Into<String>, gpa: f64) -> Self {
        Self {
            id: StudentId::new(id),
            name: None,
            team_code: None,
            gpa: Some(RawGpa::Number(gpa)),
            study_type: None,
        }
    }

    /// Set the team back-reference.
    #[must_use]
    pub fn with_team_code(mut self, team: impl Into<String>) -> Self {
        self.team_code = Some(TeamId::new(team));
        self
    }

    /// The parsed GPA, zero when missing or unparseable.
    #[must_use]
    pub fn gpa(&self) -> Gpa {
        self.gpa.as_ref().map_or(Gpa::ZERO, RawGpa::resolve)
    }
}

/// A team record.
///
/// The engine reads identity, members, and preferences; the `assigned*`
/// fields are written back by the caller after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "memberUIDs",
        default,
        deserialize_with = "nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub member_uids: Vec<StudentId>,
    /// Ranked preferences, first choice first.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub selected_projects: Vec<ProjectId>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_choice_rank: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_date: Option<Timestamp>,
}

impl Team {
    /// Create a team with the given ranked preferences and no members.
    #[must_use]
    pub fn new<I, P>(id: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            id: TeamId::new(id),
            name: None,
            member_uids: Vec::new(),
            selected_projects: choices.into_iter().map(ProjectId::new).collect(),
            created_at: None,
            study_type: None,
            assigned_project_id: None,
            assigned_choice_rank: None,
            assigned_date: None,
        }
    }

    /// Set the member list.
    #[must_use]
    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.member_uids = members.into_iter().map(StudentId::new).collect();
        self
    }

    /// Set the registration time.
    #[must_use]
    pub fn with_created_at(mut self, millis: i64) -> Self {
        self.created_at = Some(Timestamp(millis));
        self
    }

    /// Whether the team has anything to be matched against.
    #[must_use]
    pub fn has_selections(&self) -> bool {
        !self.selected_projects.is_empty()
    }

    /// Whether the caller has recorded an assignment on this team.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.assigned_project_id.is_some()
    }

    /// Display label, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// A supervisor-submitted project. Presentation only; never read by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<String>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the GradTrack system.
///
/// - Data-quality problems in records are never errors
/// - Caller-contract violations and I/O failures are
/// - The engine never panics
#[derive(Debug, Error)]
pub enum GradTrackError {
    /// Two input teams share an id, so assignments could not be keyed by team.
    #[error("Duplicate team id: {0}")]
    DuplicateTeam(TeamId),

    /// A record identifier was the empty string.
    #[error("Empty identifier: {0}")]
    EmptyIdentifier(&'static str),

    /// An assignment names a team that is not in the snapshot.
    #[error("Unknown team: {0}")]
    UnknownTeam(TeamId),

    /// A result failed its integrity check and must not be written.
    #[error("Projects assigned more than once: {0:?}")]
    DuplicateProjects(Vec<ProjectId>),

    /// A configuration value could not be understood.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input document exceeds a size limit.
    #[error("Snapshot too large: {size} exceeds maximum {max}")]
    SnapshotTooLarge { size: usize, max: usize },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpa_rejects_negative_and_non_finite() {
        assert!(Gpa::new(-1.5).is_zero());
        assert!(Gpa::new(f64::NAN).is_zero());
        assert!(Gpa::new(f64::INFINITY).is_zero());
        assert_eq!(Gpa::new(3.25).value(), 3.25);
    }

    #[test]
    fn gpa_parses_numeric_prefix() {
        assert_eq!(Gpa::parse_lenient(" 3.7 ").value(), 3.7);
        assert_eq!(Gpa::parse_lenient("3.7 / 4").value(), 3.7);
        assert!(Gpa::parse_lenient("excellent").is_zero());
        assert!(Gpa::parse_lenient("").is_zero());
        assert!(Gpa::parse_lenient("inf").is_zero());
    }

    #[test]
    fn gpa_prefix_scan_follows_decimal_grammar() {
        assert_eq!(Gpa::parse_lenient("+3.5abc").value(), 3.5);
        assert_eq!(Gpa::parse_lenient(".5 points").value(), 0.5);
        assert_eq!(Gpa::parse_lenient("3.").value(), 3.0);
        assert_eq!(Gpa::parse_lenient("35e-1 out of 4").value(), 3.5);
        assert_eq!(Gpa::parse_lenient("3e").value(), 3.0);
        assert!(Gpa::parse_lenient("-2.0").is_zero());
        assert!(Gpa::parse_lenient("-.x").is_zero());
        assert!(Gpa::parse_lenient(".").is_zero());
    }

    #[test]
    fn gpa_long_digit_run_with_junk_suffix() {
        let text = format!("{}{}", "1".repeat(200_000), "x".repeat(200_000));
        // Overflows to infinity, which collapses to zero.
        assert!(Gpa::parse_lenient(&text).is_zero());

        let text = format!("3.{}{}", "0".repeat(200_000), "x".repeat(200_000));
        assert_eq!(Gpa::parse_lenient(&text).value(), 3.0);
    }

    #[test]
    fn timestamp_accepts_stored_shapes() {
        let read = |json: &str| -> Option<Timestamp> {
            let team: Team =
                serde_json::from_str(&format!(r#"{{"id":"t","createdAt":{}}}"#, json))
                    .expect("team parses");
            team.created_at
        };

        assert_eq!(read("1700000000000"), Some(Timestamp(1_700_000_000_000)));
        assert_eq!(read(r#""1700000000000""#), Some(Timestamp(1_700_000_000_000)));
        assert_eq!(
            read(r#""2024-01-05T10:00:00+02:00""#),
            Some(Timestamp(1_704_441_600_000))
        );
        assert_eq!(
            read(r#"{"seconds":1700000000,"nanoseconds":250000000}"#),
            Some(Timestamp(1_700_000_000_250))
        );
        assert_eq!(
            read(r#"{"_seconds":1700000000,"_nanoseconds":0}"#),
            Some(Timestamp(1_700_000_000_000))
        );
        assert_eq!(read(r#"{"nanoseconds":5}"#), None);
        assert_eq!(read(r#"{"seconds":"soon"}"#), None);
        assert_eq!(read(r#""last tuesday""#), None);
        assert_eq!(read("[1,2]"), None);
        assert_eq!(read("true"), None);
        assert_eq!(read("null"), None);
    }

    #[test]
    fn timestamp_writes_back_as_millis() {
        let team: Team =
            serde_json::from_str(r#"{"id":"t","assignedDate":{"seconds":2,"nanoseconds":0}}"#)
                .expect("team parses");
        let json = serde_json::to_value(&team).expect("serialize");
        assert_eq!(json["assignedDate"], 2_000);
    }

    #[test]
    fn raw_gpa_accepts_any_json_shape() {
        let cases = [
            (r#"{"id":"s1","gpa":3.5}"#, 3.5),
            (r#"{"id":"s1","gpa":"3.5"}"#, 3.5),
            (r#"{"id":"s1","gpa":4}"#, 4.0),
            (r#"{"id":"s1","gpa":null}"#, 0.0),
            (r#"{"id":"s1","gpa":true}"#, 0.0),
            (r#"{"id":"s1","gpa":[3.9]}"#, 0.0),
            (r#"{"id":"s1","gpa":{"value":3.9}}"#, 0.0),
            (r#"{"id":"s1"}"#, 0.0),
        ];
        for (json, expected) in cases {
            let student: Student = serde_json::from_str(json).expect("parse");
            assert_eq!(student.gpa().value(), expected, "input: {}", json);
        }
    }

    #[test]
    fn team_null_lists_read_as_empty() {
        let json = r#"{"id":"t1","memberUIDs":null,"selectedProjects":null}"#;
        let team: Team = serde_json::from_str(json).expect("parse");
        assert!(team.member_uids.is_empty());
        assert!(!team.has_selections());
    }

    #[test]
    fn study_type_classification() {
        assert_eq!(StudyType::classify("Evening"), StudyType::Evening);
        assert_eq!(StudyType::classify("دراسة مسائية"), StudyType::Evening);
        assert_eq!(StudyType::classify("morning"), StudyType::Morning);
        assert_eq!(StudyType::classify(""), StudyType::Morning);
        assert_eq!("مسائية".parse::<StudyType>().ok(), Some(StudyType::Evening));
        assert!("weekend".parse::<StudyType>().is_err());
    }
}
