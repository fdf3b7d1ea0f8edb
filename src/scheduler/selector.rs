//! Slot selection.
//!
//! # Algorithm
//!
//! For an open slot of a day block:
//! 1. Eligibility (hard): remaining balance ≥ block size > 0; not yet placed
//!    that day; the whole block fits inside the day block without crossing a
//!    break or a committed cell; teacher and room can be allocated for every
//!    period (and every batch).
//! 2. Candidates that would push the consecutive theory run past the cap
//!    are set aside as the fallback set.
//! 3. The rule engine ranks the preferred set; if it is empty, the best
//!    fallback is taken and the selection is marked relaxed.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 3 (direct heuristics)

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{allocate, Allocation, DayBlock, LabBlockPlacer, ResourceLedger};
use crate::config::GeneratorConfig;
use crate::dispatching::{Candidate, RuleEngine, SlotContext};
use crate::models::{Catalogue, Grid, Section, Slot, Subject, SubjectCategory, ViolationKind};

/// Walk state of one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionState {
    remaining: BTreeMap<String, u32>,
    placed_today: BTreeSet<String>,
    run: usize,
}

impl SectionState {
    /// Balances of every non-fixed subject of the section.
    pub fn new(catalogue: &Catalogue, section: &Section) -> Self {
        let remaining = catalogue
            .section_subjects(section)
            .into_iter()
            .filter(|s| !s.is_fixed())
            .map(|s| (s.id.clone(), section.weekly_hours(s)))
            .collect();
        Self {
            remaining,
            placed_today: BTreeSet::new(),
            run: 0,
        }
    }

    /// Starts a new day: forgets the day's subjects and the theory run.
    pub fn start_day(&mut self) {
        self.placed_today.clear();
        self.run = 0;
    }

    /// Remaining periods of a subject.
    pub fn remaining(&self, subject_id: &str) -> u32 {
        self.remaining.get(subject_id).copied().unwrap_or(0)
    }

    /// Subjects with a positive balance, in id order.
    pub fn outstanding(&self) -> impl Iterator<Item = (&str, u32)> {
        self.remaining
            .iter()
            .filter(|(_, &h)| h > 0)
            .map(|(id, &h)| (id.as_str(), h))
    }

    /// Whether a subject was placed today.
    pub fn placed_today(&self, subject_id: &str) -> bool {
        self.placed_today.contains(subject_id)
    }

    /// Current consecutive theory run.
    pub fn run(&self) -> usize {
        self.run
    }

    /// Applies a committed block: balance, day mark, theory run.
    pub fn record(&mut self, subject: &Subject) {
        if let Some(h) = self.remaining.get_mut(&subject.id) {
            *h = h.saturating_sub(subject.block_size as u32);
        }
        self.placed_today.insert(subject.id.clone());
        self.observe(subject.category, subject.block_size);
    }

    /// Accounts for an occupied cell the walk passes over.
    pub fn observe(&mut self, category: SubjectCategory, periods: usize) {
        if category.counts_toward_theory_run() {
            self.run += periods;
        } else {
            self.run = 0;
        }
    }

    /// A free period breaks the run.
    pub fn reset_run(&mut self) {
        self.run = 0;
    }
}

/// A chosen subject with its resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Subject id.
    pub subject_id: String,
    /// Resources per batch.
    pub allocations: Vec<Allocation>,
}

/// Outcome of selection for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Best candidate of the preferred set.
    Accepted(Choice),
    /// Best fallback, chosen by relaxing the named soft rule.
    Relaxed(Choice, ViolationKind),
}

impl Selection {
    /// The chosen subject and resources.
    pub fn choice(&self) -> &Choice {
        match self {
            Self::Accepted(c) | Self::Relaxed(c, _) => c,
        }
    }

    /// Whether a soft rule was relaxed.
    pub fn is_relaxed(&self) -> bool {
        matches!(self, Self::Relaxed(..))
    }
}

/// What happened at one slot of a section walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotOutcome {
    /// A block starting here was committed.
    Assigned {
        slot: Slot,
        subject_id: String,
        relaxed: bool,
    },
    /// No candidate was eligible.
    LeftFree { slot: Slot },
}

/// Chooses the subject for an open slot.
#[derive(Debug, Clone)]
pub struct SlotSelector<'a> {
    catalogue: &'a Catalogue,
    config: &'a GeneratorConfig,
    engine: RuleEngine,
}

impl<'a> SlotSelector<'a> {
    /// Creates a selector with the engine derived from `config`.
    pub fn new(catalogue: &'a Catalogue, config: &'a GeneratorConfig) -> Self {
        Self {
            catalogue,
            config,
            engine: RuleEngine::for_config(config),
        }
    }

    /// Replaces the rule engine.
    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Selects the subject for `slot`, or `None` when nothing is eligible.
    pub fn select(
        &self,
        section: &Section,
        grid: &Grid,
        ledger: &ResourceLedger,
        state: &SectionState,
        block: &DayBlock,
        slot: Slot,
    ) -> Option<Selection> {
        let shape = &self.config.shape;
        let range = block.range?;
        let placer = LabBlockPlacer::new(shape);

        let mut preferred: Vec<(Candidate, Vec<Allocation>)> = Vec::new();
        let mut fallback: Vec<(Candidate, Vec<Allocation>)> = Vec::new();

        for subject in self.catalogue.section_subjects(section) {
            if subject.is_fixed() || subject.block_size == 0 {
                continue;
            }
            let remaining = state.remaining(&subject.id);
            if (remaining as usize) < subject.block_size || state.placed_today(&subject.id) {
                continue;
            }
            if !placer.fits(grid, slot, subject.block_size, range) {
                continue;
            }
            let slots = LabBlockPlacer::block_slots(slot, subject.block_size);
            let Some(allocations) = allocate(self.catalogue, ledger, section, subject, &slots)
            else {
                continue;
            };

            let candidate = Candidate::new(subject, remaining);
            if candidate.run_after(state.run()) > self.config.max_consecutive_theory {
                fallback.push((candidate, allocations));
            } else {
                preferred.push((candidate, allocations));
            }
        }

        let context = SlotContext::at(slot)
            .with_days_left(shape.day_count.saturating_sub(slot.day))
            .with_before_lunch(shape.is_before_lunch(slot.period))
            .with_theory_run(state.run());

        if let Some(choice) = self.best(preferred, &context) {
            return Some(Selection::Accepted(choice));
        }
        self.best(fallback, &context)
            .map(|choice| Selection::Relaxed(choice, ViolationKind::ConsecutiveTheory))
    }

    fn best(
        &self,
        mut pool: Vec<(Candidate, Vec<Allocation>)>,
        context: &SlotContext,
    ) -> Option<Choice> {
        let candidates: Vec<Candidate> = pool.iter().map(|(c, _)| c.clone()).collect();
        let index = self.engine.select_best(&candidates, context)?;
        let (candidate, allocations) = pool.swap_remove(index);
        Some(Choice {
            subject_id: candidate.subject_id,
            allocations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeekShape;
    use crate::models::{Assignment, Cell, Origin, ResourceKey, Teacher};
    use crate::scheduler::{Claim, Occupant};

    fn flat_config(periods: usize) -> GeneratorConfig {
        GeneratorConfig::default().with_shape(WeekShape::new(1, periods))
    }

    fn block(range: (usize, usize)) -> DayBlock {
        DayBlock {
            day: 0,
            target: range.1 - range.0 + 1,
            range: Some(range),
        }
    }

    #[test]
    fn test_state_bookkeeping() {
        let catalogue = Catalogue::new()
            .with_subject(Subject::theory("MA", 3))
            .with_subject(Subject::lab("DSL", 1));
        let section = Section::new("A").with_subjects(["MA", "DSL"]);
        let mut state = SectionState::new(&catalogue, &section);
        assert_eq!(state.remaining("MA"), 3);

        state.record(catalogue.subject("MA").unwrap());
        assert_eq!(state.remaining("MA"), 2);
        assert!(state.placed_today("MA"));
        assert_eq!(state.run(), 1);

        state.record(catalogue.subject("DSL").unwrap());
        assert_eq!(state.remaining("DSL"), 0);
        assert_eq!(state.run(), 0);
        assert_eq!(state.outstanding().collect::<Vec<_>>(), vec![("MA", 2)]);

        state.start_day();
        assert!(!state.placed_today("MA"));
    }

    #[test]
    fn test_picks_highest_credit_ratio() {
        let config = flat_config(4);
        let catalogue = Catalogue::new()
            .with_subject(Subject::theory("ENG", 1))
            .with_subject(Subject::theory("MA", 3));
        let section = Section::new("A").with_subjects(["ENG", "MA"]);
        let grid = Grid::new("A", &config.shape);
        let state = SectionState::new(&catalogue, &section);
        let selector = SlotSelector::new(&catalogue, &config);

        let sel = selector
            .select(&section, &grid, &ResourceLedger::new(), &state, &block((0, 3)), Slot::new(0, 0))
            .unwrap();
        assert_eq!(
            sel,
            Selection::Accepted(Choice {
                subject_id: "MA".into(),
                allocations: vec![Allocation {
                    batch: None,
                    teacher: None,
                    room: None
                }],
            })
        );
    }

    #[test]
    fn test_filters_placed_today_and_block_fit() {
        let config = flat_config(4);
        let catalogue = Catalogue::new()
            .with_subject(Subject::theory("MA", 3))
            .with_subject(Subject::lab("DSL", 1));
        let section = Section::new("A").with_subjects(["MA", "DSL"]);
        let grid = Grid::new("A", &config.shape);
        let mut state = SectionState::new(&catalogue, &section);
        state.record(catalogue.subject("MA").unwrap());
        let selector = SlotSelector::new(&catalogue, &config);

        // Lab does not fit in the last period of the block; MA already placed.
        let sel = selector.select(
            &section,
            &grid,
            &ResourceLedger::new(),
            &state,
            &block((0, 3)),
            Slot::new(0, 3),
        );
        assert!(sel.is_none());

        let sel = selector
            .select(&section, &grid, &ResourceLedger::new(), &state, &block((0, 3)), Slot::new(0, 1))
            .unwrap();
        assert_eq!(sel.choice().subject_id, "DSL");
    }

    #[test]
    fn test_busy_teacher_is_ineligible() {
        let config = flat_config(4);
        let catalogue = Catalogue::new()
            .with_subject(Subject::theory("MA", 3).with_teacher("T1"))
            .with_teacher(Teacher::new("T1"));
        let section = Section::new("A").with_subject("MA");
        let grid = Grid::new("A", &config.shape);
        let state = SectionState::new(&catalogue, &section);
        let mut ledger = ResourceLedger::new();
        ledger
            .reserve(Claim {
                slot: Slot::new(0, 0),
                key: ResourceKey::teacher("T1"),
                occupant: Occupant::new("B", None, "MA"),
            })
            .unwrap();
        let selector = SlotSelector::new(&catalogue, &config);

        assert!(selector
            .select(&section, &grid, &ledger, &state, &block((0, 3)), Slot::new(0, 0))
            .is_none());
        assert!(selector
            .select(&section, &grid, &ledger, &state, &block((0, 3)), Slot::new(0, 1))
            .is_some());
    }

    #[test]
    fn test_relaxes_theory_cap_only_without_alternative() {
        let config = flat_config(6).with_max_consecutive_theory(2);
        let catalogue = Catalogue::new()
            .with_subject(Subject::theory("MA", 3))
            .with_subject(Subject::project("PRJ", 2));
        let section = Section::new("A").with_subjects(["MA", "PRJ"]);
        let mut grid = Grid::new("A", &config.shape);
        for p in 0..2 {
            grid.place(
                Slot::new(0, p),
                Cell::Class(Assignment::new("X", SubjectCategory::Theory, Origin::Selected)),
            );
        }
        let mut state = SectionState::new(&catalogue, &section);
        state.observe(SubjectCategory::Theory, 2);
        let selector = SlotSelector::new(&catalogue, &config);
        let ledger = ResourceLedger::new();

        // The project block resets the run, so it is preferred.
        let sel = selector
            .select(&section, &grid, &ledger, &state, &block((0, 5)), Slot::new(0, 2))
            .unwrap();
        assert_eq!(sel.choice().subject_id, "PRJ");
        assert!(!sel.is_relaxed());

        // At the last period the project no longer fits: MA is relaxed in.
        let sel = selector
            .select(&section, &grid, &ledger, &state, &block((0, 5)), Slot::new(0, 5))
            .unwrap();
        assert!(sel.is_relaxed());
        assert_eq!(sel.choice().subject_id, "MA");
    }
}
