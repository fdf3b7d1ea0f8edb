//! Constraint validation of finished grids.
//!
//! # Hard checks
//! - A (slot, resource) held by more than one occupant across all grids
//! - Placed periods of a subject differ from its weekly hours
//! - Lab/project run of the wrong length on a day
//! - Fixed subject missing from, or outside, its mandated cells
//! - More than one session of a subject on a day
//! - Split subject cell without every batch of the section
//!
//! # Soft checks
//! - Theory-like run above the cap (one entry per over-cap period)
//! - Day loads differing by more than the tolerance
//! - First period used on more days than allowed (one entry per extra day)
//! - Free teaching period between classes of the same day
//!
//! # Score
//! `ceiling − Σ penalties`, floored at zero.

use std::collections::{BTreeMap, BTreeSet};

use super::{Occupant, SectionKpi};
use crate::config::{GeneratorConfig, ScoreWeights};
use crate::models::{
    Catalogue, Cell, Grid, ResourceKey, Section, Severity, Slot, Subject, Violation,
    ViolationKind, ViolationReport,
};

/// Re-walks finished grids and reports violations.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintValidator<'a> {
    catalogue: &'a Catalogue,
    config: &'a GeneratorConfig,
}

impl<'a> ConstraintValidator<'a> {
    /// Creates a validator.
    pub fn new(catalogue: &'a Catalogue, config: &'a GeneratorConfig) -> Self {
        Self { catalogue, config }
    }

    /// Appends every violation of `grids` to `report` and sets its score.
    ///
    /// `grids` is parallel to `sections`.
    pub fn validate(&self, sections: &[Section], grids: &[Grid], report: &mut ViolationReport) {
        self.check_clashes(grids, report);

        for (section, grid) in sections.iter().zip(grids) {
            for subject in self.catalogue.section_subjects(section) {
                if subject.is_fixed() {
                    self.check_fixed(section, grid, subject, report);
                } else {
                    self.check_hours(section, grid, subject, report);
                    self.check_days(section, grid, subject, report);
                }
                if section.splits(subject) {
                    self.check_batches(section, grid, subject, report);
                }
            }

            let kpi = SectionKpi::calculate(grid, &self.config.shape);
            self.check_theory_runs(section, grid, report);
            self.check_load(section, &kpi, report);
            self.check_first_period(section, &kpi, report);
            for &gap in &kpi.idle_gaps {
                report.push(
                    Violation::new(
                        ViolationKind::IdleGap,
                        &section.id,
                        "free period between classes",
                    )
                    .at(gap),
                );
            }
        }

        report.score = score(
            report,
            &self.config.weights,
            self.config.first_period_penalty_weight,
        );
    }

    fn check_clashes(&self, grids: &[Grid], report: &mut ViolationReport) {
        let mut holders: BTreeMap<(Slot, ResourceKey), Vec<Occupant>> = BTreeMap::new();
        for grid in grids {
            for (slot, cell) in grid.iter() {
                for a in cell.assignments() {
                    for key in a.resource_keys() {
                        holders.entry((slot, key)).or_default().push(Occupant::new(
                            &grid.section_id,
                            a.batch.clone(),
                            &a.subject_id,
                        ));
                    }
                }
            }
        }

        for ((slot, key), occupants) in holders {
            for extra in occupants.iter().skip(1) {
                report.push(
                    Violation::new(
                        ViolationKind::ResourceClash,
                        &extra.section_id,
                        format!(
                            "{key} double-booked: {} ({}) and {} ({})",
                            occupants[0].section_id,
                            occupants[0].subject_id,
                            extra.section_id,
                            extra.subject_id
                        ),
                    )
                    .at(slot)
                    .with_subject(&extra.subject_id)
                    .with_resource(key.clone()),
                );
            }
        }
    }

    fn check_hours(
        &self,
        section: &Section,
        grid: &Grid,
        subject: &Subject,
        report: &mut ViolationReport,
    ) {
        let target = section.weekly_hours(subject) as usize;
        let placed = grid.placed_count(&subject.id);
        if placed != target {
            report.push(
                Violation::new(
                    ViolationKind::UnmetHours,
                    &section.id,
                    format!("{} placed {placed} of {target} periods", subject.id),
                )
                .with_subject(&subject.id),
            );
        }
    }

    fn check_days(
        &self,
        section: &Section,
        grid: &Grid,
        subject: &Subject,
        report: &mut ViolationReport,
    ) {
        let shape = &self.config.shape;
        for day in 0..grid.days.len() {
            let periods = grid.periods_for(day, &subject.id);
            let Some(&first) = periods.first() else {
                continue;
            };

            if subject.category.is_block() {
                let runs = contiguous_runs(&periods);
                let whole = runs.iter().all(|&(start, len)| {
                    len == subject.block_size && shape.is_contiguous(start, len)
                });
                if !whole {
                    report.push(
                        Violation::new(
                            ViolationKind::BrokenBlock,
                            &section.id,
                            format!(
                                "{} block of {} is split or of the wrong length",
                                subject.id, subject.block_size
                            ),
                        )
                        .at(Slot::new(day, first))
                        .with_subject(&subject.id),
                    );
                }
            }

            if periods.len() > subject.block_size {
                report.push(
                    Violation::new(
                        ViolationKind::SameDayRepeat,
                        &section.id,
                        format!("{} has {} periods on one day", subject.id, periods.len()),
                    )
                    .on_day(day)
                    .with_subject(&subject.id),
                );
            }
        }
    }

    fn check_fixed(
        &self,
        section: &Section,
        grid: &Grid,
        subject: &Subject,
        report: &mut ViolationReport,
    ) {
        let mandated: BTreeSet<Slot> = subject
            .fixed
            .iter()
            .flat_map(|f| f.periods().map(move |p| Slot::new(f.day, p)))
            .collect();
        let actual: BTreeSet<Slot> = grid
            .iter()
            .filter(|(_, c)| c.subject_id() == Some(subject.id.as_str()))
            .map(|(s, _)| s)
            .collect();

        for &slot in mandated.difference(&actual) {
            report.push(
                Violation::new(
                    ViolationKind::FixedDisplaced,
                    &section.id,
                    format!("{} missing from its fixed cell", subject.id),
                )
                .at(slot)
                .with_subject(&subject.id),
            );
        }
        for &slot in actual.difference(&mandated) {
            report.push(
                Violation::new(
                    ViolationKind::FixedDisplaced,
                    &section.id,
                    format!("{} placed outside its fixed cells", subject.id),
                )
                .at(slot)
                .with_subject(&subject.id),
            );
        }
    }

    fn check_batches(
        &self,
        section: &Section,
        grid: &Grid,
        subject: &Subject,
        report: &mut ViolationReport,
    ) {
        let expected: BTreeSet<&str> = section.batches.iter().map(String::as_str).collect();
        for (slot, cell) in grid.iter() {
            if cell.subject_id() != Some(subject.id.as_str()) {
                continue;
            }
            let present: BTreeSet<&str> = cell
                .assignments()
                .iter()
                .filter_map(|a| a.batch.as_deref())
                .collect();
            let missing: Vec<&str> = expected.difference(&present).copied().collect();
            if !missing.is_empty() {
                report.push(
                    Violation::new(
                        ViolationKind::BatchCoverage,
                        &section.id,
                        format!("{} cell lacks batches {}", subject.id, missing.join(", ")),
                    )
                    .at(slot)
                    .with_subject(&subject.id),
                );
            }
        }
    }

    fn check_theory_runs(&self, section: &Section, grid: &Grid, report: &mut ViolationReport) {
        let cap = self.config.max_consecutive_theory;
        for (day, cells) in grid.days.iter().enumerate() {
            let mut run = 0;
            for (period, cell) in cells.iter().enumerate() {
                match cell {
                    Cell::Break => continue,
                    Cell::Free => {
                        run = 0;
                        continue;
                    }
                    _ => {}
                }
                if cell.category().is_some_and(|c| c.counts_toward_theory_run()) {
                    run += 1;
                } else {
                    run = 0;
                }
                if run > cap {
                    let mut v = Violation::new(
                        ViolationKind::ConsecutiveTheory,
                        &section.id,
                        format!("{run} theory periods in a row (cap {cap})"),
                    )
                    .at(Slot::new(day, period));
                    if let Some(id) = cell.subject_id() {
                        v = v.with_subject(id);
                    }
                    report.push(v);
                }
            }
        }
    }

    fn check_load(&self, section: &Section, kpi: &SectionKpi, report: &mut ViolationReport) {
        let spread = kpi.load_spread();
        if spread > self.config.load_tolerance {
            report.push(Violation::new(
                ViolationKind::LoadImbalance,
                &section.id,
                format!(
                    "day loads {:?} differ by {spread} (tolerance {})",
                    kpi.load_by_day, self.config.load_tolerance
                ),
            ));
        }
    }

    fn check_first_period(&self, section: &Section, kpi: &SectionKpi, report: &mut ViolationReport) {
        let Some(first) = self.config.shape.first_teaching_period() else {
            return;
        };
        let allowance = self.config.first_period_allowance;
        for &day in kpi.first_period_days.iter().skip(allowance) {
            report.push(
                Violation::new(
                    ViolationKind::DiscouragedPeriod,
                    &section.id,
                    format!(
                        "first period used on {} days (allowance {allowance})",
                        kpi.first_period_days.len()
                    ),
                )
                .at(Slot::new(day, first)),
            );
        }
    }
}

/// Maximal runs of consecutive positions, as (start, length).
fn contiguous_runs(periods: &[usize]) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &p in periods {
        match runs.last_mut() {
            Some((start, len)) if *start + *len == p => *len += 1,
            _ => runs.push((p, 1)),
        }
    }
    runs
}

/// Score of a report: `ceiling − Σ penalties`, floored at zero.
pub fn score(report: &ViolationReport, weights: &ScoreWeights, first_period_weight: u32) -> u32 {
    let penalty: u64 = report
        .violations
        .iter()
        .map(|v| match v.kind {
            ViolationKind::DiscouragedPeriod => u64::from(first_period_weight),
            k if k.severity() == Severity::Hard => u64::from(weights.hard_penalty),
            _ => u64::from(weights.soft_penalty),
        })
        .sum();
    u64::from(weights.ceiling).saturating_sub(penalty) as u32
}
