//! Closed option sets offered by the interaction layer.
//!
//! # Responsibility
//! - Define `Subject`, `Period` and `Status` with their display labels.
//! - Provide strict parsing for user input and lenient decoding for stored text.
//!
//! # Invariants
//! - `parse` returns `None` for anything outside the closed set.
//! - `from_stored` never fails; unknown text becomes `Unrecognized` verbatim.
//! - `as_str` of a decoded value reproduces the stored text exactly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static PERIOD_INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^period\s*([1-8])$").expect("valid period regex"));

const PERIOD_LABELS: [&str; 8] = [
    "Period 1", "Period 2", "Period 3", "Period 4", "Period 5", "Period 6", "Period 7",
    "Period 8",
];

/// Subject a record was taken for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Subject {
    Mathematics,
    Physics,
    Chemistry,
    English,
    ComputerScience,
    Electronics,
    CivilEngineering,
    MechanicalEngineering,
    Other,
    /// Legacy or hand-edited value outside the closed set.
    Unrecognized(String),
}

impl Subject {
    /// Selectable subjects in display order.
    pub const ALL: [Subject; 9] = [
        Subject::Mathematics,
        Subject::Physics,
        Subject::Chemistry,
        Subject::English,
        Subject::ComputerScience,
        Subject::Electronics,
        Subject::CivilEngineering,
        Subject::MechanicalEngineering,
        Subject::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Mathematics => "Mathematics",
            Self::Physics => "Physics",
            Self::Chemistry => "Chemistry",
            Self::English => "English",
            Self::ComputerScience => "Computer Science",
            Self::Electronics => "Electronics",
            Self::CivilEngineering => "Civil Engineering",
            Self::MechanicalEngineering => "Mechanical Engineering",
            Self::Other => "Other",
            Self::Unrecognized(value) => value.as_str(),
        }
    }

    /// Parses user input, ignoring surrounding whitespace and ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|subject| subject.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// Decodes persisted text without failing.
    pub fn from_stored(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|subject| subject.as_str() == value)
            .unwrap_or_else(|| Self::Unrecognized(value.to_string()))
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Self::from_stored(&value)
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        match value {
            Subject::Unrecognized(text) => text,
            other => other.as_str().to_string(),
        }
    }
}

/// Teaching period, `Period 1` through `Period 8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Period {
    Numbered(PeriodNumber),
    /// Legacy or hand-edited value outside the closed set.
    Unrecognized(String),
}

/// Period number guaranteed to be within `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodNumber(u8);

impl PeriodNumber {
    pub const FIRST: PeriodNumber = PeriodNumber(1);
    pub const LAST: PeriodNumber = PeriodNumber(8);

    pub fn new(value: u8) -> Option<Self> {
        (Self::FIRST.0..=Self::LAST.0)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Period {
    /// Selectable periods in display order.
    pub const ALL: [Period; 8] = [
        Period::Numbered(PeriodNumber(1)),
        Period::Numbered(PeriodNumber(2)),
        Period::Numbered(PeriodNumber(3)),
        Period::Numbered(PeriodNumber(4)),
        Period::Numbered(PeriodNumber(5)),
        Period::Numbered(PeriodNumber(6)),
        Period::Numbered(PeriodNumber(7)),
        Period::Numbered(PeriodNumber(8)),
    ];

    pub fn numbered(value: u8) -> Option<Self> {
        PeriodNumber::new(value).map(Self::Numbered)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Numbered(number) => PERIOD_LABELS[usize::from(number.get() - 1)],
            Self::Unrecognized(value) => value.as_str(),
        }
    }

    /// Parses user input such as `Period 3`, `period3` or a bare `3`.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let digits = match PERIOD_INPUT_RE.captures(trimmed) {
            Some(caps) => caps.get(1).map(|m| m.as_str())?,
            None => trimmed,
        };
        digits.parse::<u8>().ok().and_then(Self::numbered)
    }

    /// Decodes persisted text without failing.
    pub fn from_stored(value: &str) -> Self {
        PERIOD_LABELS
            .iter()
            .position(|label| *label == value)
            .and_then(|index| u8::try_from(index + 1).ok())
            .and_then(Self::numbered)
            .unwrap_or_else(|| Self::Unrecognized(value.to_string()))
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Period {
    fn from(value: String) -> Self {
        Self::from_stored(&value)
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        match value {
            Period::Unrecognized(text) => text,
            other => other.as_str().to_string(),
        }
    }
}

/// Attendance outcome for one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Status {
    Present,
    Absent,
    /// Legacy or hand-edited value outside the closed set.
    Unrecognized(String),
}

impl Status {
    /// Selectable statuses in display order.
    pub const ALL: [Status; 2] = [Status::Present, Status::Absent];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Unrecognized(value) => value.as_str(),
        }
    }

    /// Parses user input, ignoring surrounding whitespace and ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// Decodes persisted text without failing.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "Present" => Self::Present,
            "Absent" => Self::Absent,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Self::from_stored(&value)
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Unrecognized(text) => text,
            other => other.as_str().to_string(),
        }
    }
}
