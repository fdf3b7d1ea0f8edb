//! Section grid (solution) model.
//!
//! A grid is one section's week: `day_count` rows of `periods_per_day`
//! cells. Break positions are created as [`Cell::Break`] and never change.
//! Every other cell starts [`Cell::Free`] and is written at most once.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ResourceKey, SubjectCategory};
use crate::config::WeekShape;

/// A (day, period) position. Periods are 0-based positions, breaks included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Day index.
    pub day: usize,
    /// Period position within the day.
    pub period: usize,
}

impl Slot {
    /// Creates a slot.
    #[inline]
    pub const fn new(day: usize, period: usize) -> Self {
        Self { day, period }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}P{}", self.day + 1, self.period + 1)
    }
}

/// How a cell came to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Mandated placement.
    Fixed,
    /// Chosen by the slot selector from the preferred set.
    Selected,
    /// Chosen from the fallback set after relaxing a soft rule.
    Relaxed,
    /// Placed by the spill pass outside the day block.
    Spilled,
}

/// One subject (or one batch of it) in one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Subject id.
    pub subject_id: String,
    /// Batch id when the subject is split.
    pub batch: Option<String>,
    /// Subject category (denormalized for the validator).
    pub category: SubjectCategory,
    /// Teacher id, if one was allocated.
    pub teacher: Option<String>,
    /// Room id, if one was allocated.
    pub room: Option<String>,
    /// Placement origin.
    pub origin: Origin,
}

impl Assignment {
    /// Creates an assignment without resources.
    pub fn new(subject_id: impl Into<String>, category: SubjectCategory, origin: Origin) -> Self {
        Self {
            subject_id: subject_id.into(),
            batch: None,
            category,
            teacher: None,
            room: None,
            origin,
        }
    }

    /// Sets the batch.
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Sets the teacher.
    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = Some(teacher.into());
        self
    }

    /// Sets the room.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Ledger keys held by this assignment.
    pub fn resource_keys(&self) -> Vec<ResourceKey> {
        let mut keys = Vec::with_capacity(2);
        if let Some(t) = &self.teacher {
            keys.push(ResourceKey::teacher(t));
        }
        if let Some(r) = &self.room {
            keys.push(ResourceKey::room(r));
        }
        keys
    }
}

/// Content of one grid position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Assignable and empty.
    Free,
    /// Short break or lunch; never assignable.
    Break,
    /// One class for the whole section.
    Class(Assignment),
    /// Parallel batches of one lab, one assignment per batch.
    BatchRotation(Vec<Assignment>),
}

impl Cell {
    /// Assignments held by the cell.
    pub fn assignments(&self) -> &[Assignment] {
        match self {
            Self::Class(a) => std::slice::from_ref(a),
            Self::BatchRotation(list) => list,
            Self::Free | Self::Break => &[],
        }
    }

    /// Category of the class in the cell.
    pub fn category(&self) -> Option<SubjectCategory> {
        self.assignments().first().map(|a| a.category)
    }

    /// Subject id of the class in the cell.
    pub fn subject_id(&self) -> Option<&str> {
        self.assignments().first().map(|a| a.subject_id.as_str())
    }

    /// Whether a class occupies the cell.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Class(_) | Self::BatchRotation(_))
    }
}

/// One section's weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Section id.
    pub section_id: String,
    /// Cells indexed `[day][period]`.
    pub days: Vec<Vec<Cell>>,
}

impl Grid {
    /// Creates an empty grid with breaks marked.
    pub fn new(section_id: impl Into<String>, shape: &WeekShape) -> Self {
        let day: Vec<Cell> = (0..shape.periods_per_day)
            .map(|p| {
                if shape.is_break(p) {
                    Cell::Break
                } else {
                    Cell::Free
                }
            })
            .collect();
        Self {
            section_id: section_id.into(),
            days: vec![day; shape.day_count],
        }
    }

    /// Cell at a slot.
    pub fn cell(&self, slot: Slot) -> Option<&Cell> {
        self.days.get(slot.day)?.get(slot.period)
    }

    /// Whether a slot exists and is free.
    #[inline]
    pub fn is_free(&self, slot: Slot) -> bool {
        matches!(self.cell(slot), Some(Cell::Free))
    }

    /// Writes a class into a free cell. Returns `false` (and leaves the grid
    /// untouched) when the slot is missing, a break, or already occupied.
    pub fn place(&mut self, slot: Slot, cell: Cell) -> bool {
        if !cell.is_occupied() {
            return false;
        }
        match self
            .days
            .get_mut(slot.day)
            .and_then(|d| d.get_mut(slot.period))
        {
            Some(target) if matches!(target, Cell::Free) => {
                *target = cell;
                true
            }
            _ => false,
        }
    }

    /// Periods of a day that hold the subject.
    pub fn periods_for(&self, day: usize, subject_id: &str) -> Vec<usize> {
        self.days
            .get(day)
            .map(|cells| {
                cells
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.subject_id() == Some(subject_id))
                    .map(|(p, _)| p)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total periods placed for a subject across the week.
    pub fn placed_count(&self, subject_id: &str) -> usize {
        self.iter()
            .filter(|(_, c)| c.subject_id() == Some(subject_id))
            .count()
    }

    /// Occupied periods on a day.
    pub fn day_load(&self, day: usize) -> usize {
        self.days
            .get(day)
            .map(|cells| cells.iter().filter(|c| c.is_occupied()).count())
            .unwrap_or(0)
    }

    /// All cells in day-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Cell)> {
        self.days.iter().enumerate().flat_map(|(d, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(p, c)| (Slot::new(d, p), c))
        })
    }
}
