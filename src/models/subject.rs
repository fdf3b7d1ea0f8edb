//! Subject model.
//!
//! A subject is one entry of the weekly catalogue. Its category decides how
//! credits turn into weekly periods and how long one session is.
//!
//! | Category | Hours per credit | Block size |
//! |----------|------------------|------------|
//! | Theory   | 1                | 1          |
//! | Lab      | 2                | 2          |
//! | Project  | 1                | 2          |
//! | Activity | non-credit       | 1          |
//! | Audit    | non-credit       | 1          |

use serde::{Deserialize, Serialize};

/// Subject category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubjectCategory {
    /// Lecture course.
    Theory,
    /// Laboratory course, taught in contiguous blocks.
    Lab,
    /// Project work, taught in contiguous blocks.
    Project,
    /// Non-credit activity (sports, library, club).
    Activity,
    /// Non-credit mandatory course.
    Audit,
}

impl SubjectCategory {
    /// Default session length in periods.
    pub fn default_block_size(self) -> usize {
        match self {
            Self::Lab | Self::Project => 2,
            _ => 1,
        }
    }

    /// Whether a session of this category extends the consecutive theory run.
    pub fn counts_toward_theory_run(self) -> bool {
        matches!(self, Self::Theory | Self::Audit | Self::Activity)
    }

    /// Weekly periods implied by a credit count.
    pub fn hours_for_credits(self, credits: u32) -> u32 {
        match self {
            Self::Lab => credits * 2,
            Self::Theory | Self::Project => credits,
            Self::Activity | Self::Audit => 0,
        }
    }

    /// Whether sessions must be contiguous multi-period blocks.
    pub fn is_block(self) -> bool {
        matches!(self, Self::Lab | Self::Project)
    }
}

/// A mandated placement: one day, an inclusive period range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FixedPlacement {
    /// Day index.
    pub day: usize,
    /// First period position.
    pub start: usize,
    /// Last period position (inclusive).
    pub end: usize,
}

impl FixedPlacement {
    /// Creates a placement over `start..=end`.
    pub fn new(day: usize, start: usize, end: usize) -> Self {
        Self { day, start, end }
    }

    /// Creates a single-period placement.
    pub fn single(day: usize, period: usize) -> Self {
        Self::new(day, period, period)
    }

    /// Period positions covered.
    pub fn periods(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Number of periods covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    /// Always false; a placement covers at least one period.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A catalogue subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier (course code).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: SubjectCategory,
    /// Credit count.
    pub credits: u32,
    /// Weekly periods.
    pub weekly_hours: u32,
    /// Periods per session.
    pub block_size: usize,
    /// Mandated placements; a subject with any is placed only there.
    #[serde(default)]
    pub fixed: Vec<FixedPlacement>,
    /// Candidate teacher ids, in order of preference.
    #[serde(default)]
    pub teachers: Vec<String>,
    /// Room kind required; `None` uses the section's home room.
    #[serde(default)]
    pub room_kind: Option<String>,
    /// Split across the section's batches.
    #[serde(default)]
    pub batched: bool,
    /// Prefer periods before lunch.
    #[serde(default)]
    pub prefers_morning: bool,
}

impl Subject {
    /// Creates a subject whose hours follow the credit rule of its category.
    pub fn new(id: impl Into<String>, category: SubjectCategory, credits: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category,
            credits,
            weekly_hours: category.hours_for_credits(credits),
            block_size: category.default_block_size(),
            fixed: Vec::new(),
            teachers: Vec::new(),
            room_kind: None,
            batched: false,
            prefers_morning: false,
        }
    }

    /// Theory subject: one period per credit.
    pub fn theory(id: impl Into<String>, credits: u32) -> Self {
        Self::new(id, SubjectCategory::Theory, credits)
    }

    /// Lab subject: two periods per credit, morning preferred.
    pub fn lab(id: impl Into<String>, credits: u32) -> Self {
        Self::new(id, SubjectCategory::Lab, credits).with_morning_preference(true)
    }

    /// Project subject: one period per credit in two-period blocks.
    pub fn project(id: impl Into<String>, credits: u32) -> Self {
        Self::new(id, SubjectCategory::Project, credits)
    }

    /// Non-credit activity with mandatory hours.
    pub fn activity(id: impl Into<String>, hours: u32) -> Self {
        Self::new(id, SubjectCategory::Activity, 0).with_weekly_hours(hours)
    }

    /// Non-credit audit course with mandatory hours.
    pub fn audit(id: impl Into<String>, hours: u32) -> Self {
        Self::new(id, SubjectCategory::Audit, 0).with_weekly_hours(hours)
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the weekly hours.
    pub fn with_weekly_hours(mut self, hours: u32) -> Self {
        self.weekly_hours = hours;
        self
    }

    /// Overrides the block size.
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Adds a mandated placement.
    pub fn with_fixed(mut self, placement: FixedPlacement) -> Self {
        self.fixed.push(placement);
        self
    }

    /// Adds a candidate teacher.
    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teachers.push(teacher_id.into());
        self
    }

    /// Adds several candidate teachers.
    pub fn with_teachers<I, S>(mut self, teacher_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teachers.extend(teacher_ids.into_iter().map(Into::into));
        self
    }

    /// Requires a room of the given kind.
    pub fn with_room_kind(mut self, kind: impl Into<String>) -> Self {
        self.room_kind = Some(kind.into());
        self
    }

    /// Splits the subject across the section's batches.
    pub fn batched(mut self) -> Self {
        self.batched = true;
        self
    }

    /// Sets the morning preference.
    pub fn with_morning_preference(mut self, prefers: bool) -> Self {
        self.prefers_morning = prefers;
        self
    }

    /// Whether the subject is placed only at mandated cells.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        !self.fixed.is_empty()
    }

    /// Periods covered by the mandated placements.
    pub fn fixed_period_count(&self) -> usize {
        self.fixed.iter().map(FixedPlacement::len).sum()
    }

    /// Weekly sessions for a given hour count.
    pub fn sessions_for(&self, hours: u32) -> usize {
        if self.block_size == 0 {
            return 0;
        }
        (hours as usize).div_ceil(self.block_size)
    }
}
