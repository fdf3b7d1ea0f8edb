//! Slot context and candidate view for selection rule evaluation.

use crate::models::{Slot, Subject, SubjectCategory};

/// Runtime state of the slot being filled, passed to selection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotContext {
    /// Slot being filled.
    pub slot: Slot,
    /// Days left in the week, the current one included.
    pub days_left: usize,
    /// Whether the slot comes before lunch.
    pub before_lunch: bool,
    /// Consecutive theory-like periods ending just before the slot.
    pub theory_run: usize,
}

impl SlotContext {
    /// Creates a context for a slot, with one day left and no run.
    pub fn at(slot: Slot) -> Self {
        Self {
            slot,
            days_left: 1,
            before_lunch: true,
            theory_run: 0,
        }
    }

    /// Sets the days left.
    pub fn with_days_left(mut self, days: usize) -> Self {
        self.days_left = days;
        self
    }

    /// Sets whether the slot is before lunch.
    pub fn with_before_lunch(mut self, before: bool) -> Self {
        self.before_lunch = before;
        self
    }

    /// Sets the current theory run.
    pub fn with_theory_run(mut self, run: usize) -> Self {
        self.theory_run = run;
        self
    }
}

/// A subject as seen by the selection rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Subject id.
    pub subject_id: String,
    /// Category.
    pub category: SubjectCategory,
    /// Periods per session.
    pub block_size: usize,
    /// Weekly periods still to place.
    pub remaining_hours: u32,
    /// Prefers periods before lunch.
    pub prefers_morning: bool,
}

impl Candidate {
    /// Builds a candidate from a subject and its remaining balance.
    pub fn new(subject: &Subject, remaining_hours: u32) -> Self {
        Self {
            subject_id: subject.id.clone(),
            category: subject.category,
            block_size: subject.block_size,
            remaining_hours,
            prefers_morning: subject.prefers_morning,
        }
    }

    /// Sessions still to place.
    pub fn sessions_left(&self) -> usize {
        if self.block_size == 0 {
            return 0;
        }
        (self.remaining_hours as usize).div_ceil(self.block_size)
    }

    /// Theory run after placing this candidate on top of `run`.
    pub fn run_after(&self, run: usize) -> usize {
        if self.category.counts_toward_theory_run() {
            run + self.block_size
        } else {
            0
        }
    }
}
