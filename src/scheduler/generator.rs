//! Deterministic timetable generator.
//!
//! # Algorithm
//!
//! 1. Validate the input and check each section's capacity.
//! 2. Pre-place every fixed subject of every section.
//! 3. For each section in input order, plan its day blocks, then walk
//!    every day block period by period, asking the [`SlotSelector`] for a
//!    subject and committing it through the [`LabBlockPlacer`].
//! 4. Optionally spill the section's outstanding balances into free
//!    blocks anywhere in the day, before the next section is walked.
//! 5. Validate the finished grids and score the report.
//!
//! Sections share one [`ResourceLedger`], so earlier sections get first
//! pick of contended teachers and rooms.
//!
//! # Complexity
//! O(s * d * p * n) where s=sections, d=days, p=periods/day, n=subjects/section.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::{
    allocate, place_fixed, plan_week, ConstraintValidator, DayBlock, LabBlockPlacer,
    ResourceLedger, SectionState, Selection, SlotOutcome, SlotSelector, TimetableKpi,
};
use crate::config::{GeneratorConfig, WeekShape};
use crate::dispatching::RuleEngine;
use crate::error::{GenerateError, GenerateResult};
use crate::models::{
    Catalogue, Cell, Grid, Origin, Section, Slot, Violation, ViolationReport,
};
use crate::validation::{check_capacity, validate_input};

/// A generated weekly timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    /// One grid per section, in input order.
    pub grids: Vec<Grid>,
    /// Violations found during generation and validation.
    pub report: ViolationReport,
    /// Every teacher and room commitment.
    pub ledger: ResourceLedger,
    /// Day blocks per section id.
    pub plans: BTreeMap<String, Vec<DayBlock>>,
    /// Walk trace per section id.
    pub outcomes: BTreeMap<String, Vec<SlotOutcome>>,
}

impl Timetable {
    /// Grid of a section.
    pub fn grid_for(&self, section_id: &str) -> Option<&Grid> {
        self.grids.iter().find(|g| g.section_id == section_id)
    }

    /// Whether the timetable has no hard violations.
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    /// Report score.
    pub fn score(&self) -> u32 {
        self.report.score
    }

    /// Quality metrics.
    pub fn kpi(&self, shape: &WeekShape) -> TimetableKpi {
        TimetableKpi::calculate(self, shape)
    }
}

/// Greedy weekly timetable generator.
///
/// # Example
///
/// ```
/// use u_timetable::config::{GeneratorConfig, WeekShape};
/// use u_timetable::models::{Catalogue, Section, Subject};
/// use u_timetable::scheduler::Generator;
///
/// let catalogue = Catalogue::new()
///     .with_subject(Subject::theory("MA", 3))
///     .with_subject(Subject::theory("PHY", 2));
/// let sections = vec![Section::new("A").with_subjects(["MA", "PHY"])];
///
/// let config = GeneratorConfig::default().with_shape(WeekShape::new(5, 6));
/// let timetable = Generator::new(config).generate(&catalogue, &sections).unwrap();
/// assert!(timetable.is_valid());
/// assert_eq!(timetable.grids[0].placed_count("MA"), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    rule_engine: Option<RuleEngine>,
}

impl Generator {
    /// Creates a generator.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            rule_engine: None,
        }
    }

    /// Sets a rule engine for subject selection.
    ///
    /// When unset, the engine is derived from the configuration.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = Some(engine);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the timetable of every section.
    ///
    /// # Errors
    /// [`GenerateError::InvalidInput`] if the catalogue or sections fail
    /// validation, [`GenerateError::InsufficientCapacity`] if a section's
    /// hours cannot fit the week.
    pub fn generate(&self, catalogue: &Catalogue, sections: &[Section]) -> GenerateResult<Timetable> {
        let config = &self.config;
        let shape = &config.shape;

        validate_input(catalogue, sections, config).map_err(GenerateError::InvalidInput)?;
        for section in sections {
            check_capacity(catalogue, section, shape)?;
        }

        info!(
            sections = sections.len(),
            subjects = catalogue.subjects.len(),
            days = shape.day_count,
            "generating timetable"
        );

        let mut grids: Vec<Grid> = sections.iter().map(|s| Grid::new(&s.id, shape)).collect();
        let mut ledger = ResourceLedger::new();
        let mut report = ViolationReport::new();
        let fixed = place_fixed(catalogue, sections, shape, &mut grids, &mut ledger, &mut report);

        let selector = match &self.rule_engine {
            Some(engine) => SlotSelector::new(catalogue, config).with_engine(engine.clone()),
            None => SlotSelector::new(catalogue, config),
        };
        let walk = Walk {
            catalogue,
            config,
            selector,
            placer: LabBlockPlacer::new(shape),
        };

        let mut plans = BTreeMap::new();
        let mut outcomes = BTreeMap::new();

        for ((section, grid), fixed_periods) in sections.iter().zip(grids.iter_mut()).zip(&fixed) {
            let weekly: usize = catalogue
                .section_subjects(section)
                .iter()
                .map(|s| section.weekly_hours(s) as usize)
                .sum();
            let plan = plan_week(shape, weekly, fixed_periods, config);
            let targets: Vec<usize> = plan.iter().map(|b| b.target).collect();
            debug!(section = %section.id, weekly, ?targets, "planned day blocks");

            let mut state = SectionState::new(catalogue, section);
            let mut trace = walk.run(section, grid, &mut ledger, &mut state, &plan, &mut report);
            if config.spill_outside_blocks {
                walk.spill(section, grid, &mut ledger, &mut state, &mut trace);
            }

            plans.insert(section.id.clone(), plan);
            outcomes.insert(section.id.clone(), trace);
        }

        ConstraintValidator::new(catalogue, config).validate(sections, &grids, &mut report);

        info!(
            score = report.score,
            hard = report.hard_count(),
            soft = report.soft_count(),
            "timetable generated"
        );

        Ok(Timetable {
            grids,
            report,
            ledger,
            plans,
            outcomes,
        })
    }
}

/// Generates a timetable with the engine derived from `config`.
pub fn generate(
    catalogue: &Catalogue,
    sections: &[Section],
    config: &GeneratorConfig,
) -> GenerateResult<Timetable> {
    Generator::new(config.clone()).generate(catalogue, sections)
}

struct Walk<'a> {
    catalogue: &'a Catalogue,
    config: &'a GeneratorConfig,
    selector: SlotSelector<'a>,
    placer: LabBlockPlacer<'a>,
}

impl Walk<'_> {
    /// Fills one section's day blocks.
    fn run(
        &self,
        section: &Section,
        grid: &mut Grid,
        ledger: &mut ResourceLedger,
        state: &mut SectionState,
        plan: &[DayBlock],
        report: &mut ViolationReport,
    ) -> Vec<SlotOutcome> {
        let mut trace = Vec::new();

        for block in plan {
            state.start_day();
            let Some((start, end)) = block.range else {
                continue;
            };

            let mut period = start;
            while period <= end {
                let slot = Slot::new(block.day, period);
                match grid.cell(slot) {
                    None | Some(Cell::Break) => {
                        period += 1;
                        continue;
                    }
                    Some(cell) if cell.is_occupied() => {
                        if let Some(category) = cell.category() {
                            state.observe(category, 1);
                        }
                        period += 1;
                        continue;
                    }
                    Some(_) => {}
                }

                let Some(selection) = self.selector.select(section, grid, ledger, state, block, slot)
                else {
                    debug!(section = %section.id, %slot, "slot left free");
                    state.reset_run();
                    trace.push(SlotOutcome::LeftFree { slot });
                    period += 1;
                    continue;
                };

                let choice = selection.choice();
                let Some(subject) = self.catalogue.subject(&choice.subject_id) else {
                    trace.push(SlotOutcome::LeftFree { slot });
                    period += 1;
                    continue;
                };

                match self.placer.commit(
                    grid,
                    ledger,
                    section,
                    subject,
                    slot,
                    subject.block_size,
                    &choice.allocations,
                    if selection.is_relaxed() {
                        Origin::Relaxed
                    } else {
                        Origin::Selected
                    },
                ) {
                    Ok(_) => {
                        if let Selection::Relaxed(_, kind) = &selection {
                            let cap = self.config.max_consecutive_theory;
                            debug!(
                                section = %section.id,
                                subject = %subject.id,
                                %slot,
                                run = state.run(),
                                "theory cap relaxed"
                            );
                            report.push(
                                Violation::new(
                                    *kind,
                                    &section.id,
                                    format!(
                                        "{} placed after {} theory periods in a row (cap {cap})",
                                        subject.id,
                                        state.run()
                                    ),
                                )
                                .at(slot)
                                .with_subject(&subject.id),
                            );
                        }
                        state.record(subject);
                        trace.push(SlotOutcome::Assigned {
                            slot,
                            subject_id: subject.id.clone(),
                            relaxed: selection.is_relaxed(),
                        });
                        period += subject.block_size;
                    }
                    Err(err) => {
                        warn!(
                            section = %section.id,
                            subject = %subject.id,
                            %slot,
                            error = %err,
                            "commit failed, slot left free"
                        );
                        state.reset_run();
                        trace.push(SlotOutcome::LeftFree { slot });
                        period += 1;
                    }
                }
            }
        }

        trace
    }

    /// Places outstanding balances in the earliest free block of any day
    /// that does not already hold the subject.
    fn spill(
        &self,
        section: &Section,
        grid: &mut Grid,
        ledger: &mut ResourceLedger,
        state: &mut SectionState,
        trace: &mut Vec<SlotOutcome>,
    ) {
        let shape = &self.config.shape;
        let Some(first) = shape.first_teaching_period() else {
            return;
        };
        let last = shape.periods_per_day.saturating_sub(1);

        for day in 0..shape.day_count {
            let pending: Vec<String> = state.outstanding().map(|(id, _)| id.to_string()).collect();

            for subject_id in pending {
                let Some(subject) = self.catalogue.subject(&subject_id) else {
                    continue;
                };
                if (state.remaining(&subject.id) as usize) < subject.block_size
                    || !grid.periods_for(day, &subject.id).is_empty()
                {
                    continue;
                }

                let found = self.placer.find_block(
                    grid,
                    day,
                    (first, last),
                    subject.block_size,
                    |slots| allocate(self.catalogue, &*ledger, section, subject, slots),
                );
                let Some((start, allocations)) = found else {
                    continue;
                };

                match self.placer.commit(
                    grid,
                    ledger,
                    section,
                    subject,
                    start,
                    subject.block_size,
                    &allocations,
                    Origin::Spilled,
                ) {
                    Ok(_) => {
                        debug!(section = %section.id, subject = %subject.id, slot = %start, "spilled");
                        state.record(subject);
                        trace.push(SlotOutcome::Assigned {
                            slot: start,
                            subject_id: subject.id.clone(),
                            relaxed: false,
                        });
                    }
                    Err(err) => {
                        warn!(
                            section = %section.id,
                            subject = %subject.id,
                            slot = %start,
                            error = %err,
                            "spill commit failed"
                        );
                    }
                }
            }
        }
    }
}
