//! Violation report.
//!
//! Hard violations make a timetable unusable as issued; soft violations only
//! degrade it. Both are report entries, never errors. The report keeps
//! insertion order and drops an entry whose (kind, section, day, period,
//! subject, resource) was already recorded, so the same problem found by the
//! selector and again by the validator counts once.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ResourceKey, Slot};

/// Violation severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The timetable breaks a placement rule.
    Hard,
    /// The timetable misses a preference.
    Soft,
}

/// Classification of violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A teacher or room holds two occupants in one slot.
    ResourceClash,
    /// A subject's placed periods differ from its weekly hours.
    UnmetHours,
    /// A lab/project run is split or of the wrong length.
    BrokenBlock,
    /// A fixed subject is missing from, or outside, its mandated cells.
    FixedDisplaced,
    /// A subject has more than one session on a day.
    SameDayRepeat,
    /// A batched lab cell lacks one of the section's batches.
    BatchCoverage,
    /// A fixed placement was committed without a teacher or room.
    UnresolvedResource,
    /// More theory-like periods in a row than allowed.
    ConsecutiveTheory,
    /// Day loads differ by more than the tolerance.
    LoadImbalance,
    /// First period used on more days than allowed.
    DiscouragedPeriod,
    /// A free teaching period between classes on the same day.
    IdleGap,
}

impl ViolationKind {
    /// Severity of the kind.
    pub fn severity(self) -> Severity {
        match self {
            Self::ResourceClash
            | Self::UnmetHours
            | Self::BrokenBlock
            | Self::FixedDisplaced
            | Self::SameDayRepeat
            | Self::BatchCoverage
            | Self::UnresolvedResource => Severity::Hard,
            Self::ConsecutiveTheory
            | Self::LoadImbalance
            | Self::DiscouragedPeriod
            | Self::IdleGap => Severity::Soft,
        }
    }
}

/// One report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Kind.
    pub kind: ViolationKind,
    /// Severity (derived from the kind).
    pub severity: Severity,
    /// Section concerned.
    pub section_id: String,
    /// Day, when the violation is local to one.
    pub day: Option<usize>,
    /// Period position, when local to one.
    pub period: Option<usize>,
    /// Subject concerned.
    pub subject_id: Option<String>,
    /// Resource concerned.
    pub resource: Option<ResourceKey>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Creates a violation for a section.
    pub fn new(kind: ViolationKind, section_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            section_id: section_id.into(),
            day: None,
            period: None,
            subject_id: None,
            resource: None,
            message: message.into(),
        }
    }

    /// Pins the violation to a slot.
    pub fn at(mut self, slot: Slot) -> Self {
        self.day = Some(slot.day);
        self.period = Some(slot.period);
        self
    }

    /// Pins the violation to a day.
    pub fn on_day(mut self, day: usize) -> Self {
        self.day = Some(day);
        self
    }

    /// Names the subject.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Names the resource.
    pub fn with_resource(mut self, resource: ResourceKey) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Whether two entries describe the same problem.
    fn same_as(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.section_id == other.section_id
            && self.day == other.day
            && self.period == other.period
            && self.subject_id == other.subject_id
            && self.resource == other.resource
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {:?} {}", self.severity, self.kind, self.section_id)?;
        if let (Some(d), Some(p)) = (self.day, self.period) {
            write!(f, " {}", Slot::new(d, p))?;
        } else if let Some(d) = self.day {
            write!(f, " D{}", d + 1)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Ordered, de-duplicated violations plus the resulting score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport {
    /// Entries in discovery order.
    pub violations: Vec<Violation>,
    /// Score computed by the validator.
    pub score: u32,
}

impl ViolationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation unless the same one is already present.
    /// Returns whether it was added.
    pub fn push(&mut self, violation: Violation) -> bool {
        if self.violations.iter().any(|v| v.same_as(&violation)) {
            return false;
        }
        self.violations.push(violation);
        true
    }

    /// Number of hard violations.
    pub fn hard_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Hard)
            .count()
    }

    /// Number of soft violations.
    pub fn soft_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Soft)
            .count()
    }

    /// Whether no hard violation was recorded.
    pub fn is_valid(&self) -> bool {
        self.hard_count() == 0
    }

    /// Entries of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether the report is empty.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}
