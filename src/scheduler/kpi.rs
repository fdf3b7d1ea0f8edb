//! Timetable quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill rate | Occupied teaching periods / weekly capacity |
//! | Load by day | Occupied periods per day |
//! | Load spread | Heaviest day minus lightest day |
//! | First-period days | Days whose first teaching period is used |
//! | Longest theory run | Longest chain of theory-like periods (breaks do not cut it) |
//! | Idle gaps | Free teaching periods between classes of the same day |
//! | Resource load | Periods held per teacher/room |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Timetable;
use crate::config::WeekShape;
use crate::models::{Cell, Grid, ResourceKey, Slot};

/// Quality indicators of one section grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionKpi {
    /// Section id.
    pub section_id: String,
    /// Occupied teaching periods.
    pub filled: usize,
    /// Teaching periods in the week.
    pub capacity: usize,
    /// Occupied periods per day.
    pub load_by_day: Vec<usize>,
    /// Days whose first teaching period is occupied.
    pub first_period_days: Vec<usize>,
    /// Longest run of theory-like periods.
    pub longest_theory_run: usize,
    /// Free teaching periods between classes.
    pub idle_gaps: Vec<Slot>,
}

impl SectionKpi {
    /// Computes KPIs of one grid.
    pub fn calculate(grid: &Grid, shape: &WeekShape) -> Self {
        let first = shape.first_teaching_period();
        let mut load_by_day = Vec::with_capacity(grid.days.len());
        let mut first_period_days = Vec::new();
        let mut longest_theory_run = 0;
        let mut idle_gaps = Vec::new();

        for (day, cells) in grid.days.iter().enumerate() {
            load_by_day.push(grid.day_load(day));

            if first.is_some_and(|p| cells.get(p).is_some_and(Cell::is_occupied)) {
                first_period_days.push(day);
            }

            let mut run = 0;
            for cell in cells {
                match cell {
                    Cell::Break => {}
                    Cell::Free => run = 0,
                    occupied => {
                        if occupied
                            .category()
                            .is_some_and(|c| c.counts_toward_theory_run())
                        {
                            run += 1;
                            longest_theory_run = longest_theory_run.max(run);
                        } else {
                            run = 0;
                        }
                    }
                }
            }

            let occupied: Vec<usize> = cells
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_occupied())
                .map(|(p, _)| p)
                .collect();
            if let (Some(&lo), Some(&hi)) = (occupied.first(), occupied.last()) {
                idle_gaps.extend(
                    (lo..=hi)
                        .filter(|&p| matches!(cells[p], Cell::Free))
                        .map(|p| Slot::new(day, p)),
                );
            }
        }

        Self {
            section_id: grid.section_id.clone(),
            filled: load_by_day.iter().sum(),
            capacity: shape.weekly_capacity(),
            load_by_day,
            first_period_days,
            longest_theory_run,
            idle_gaps,
        }
    }

    /// Fraction of the week filled (0.0..1.0).
    pub fn fill_rate(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.filled as f64 / self.capacity as f64
        }
    }

    /// Heaviest day minus lightest day.
    pub fn load_spread(&self) -> usize {
        let max = self.load_by_day.iter().copied().max().unwrap_or(0);
        let min = self.load_by_day.iter().copied().min().unwrap_or(0);
        max - min
    }
}

/// Quality indicators of a whole timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableKpi {
    /// Per-section indicators, in section order.
    pub sections: Vec<SectionKpi>,
    /// Periods held per resource.
    pub resource_load: BTreeMap<ResourceKey, usize>,
    /// Mean fill rate over sections.
    pub avg_fill_rate: f64,
    /// Hard violations in the report.
    pub hard_violations: usize,
    /// Soft violations in the report.
    pub soft_violations: usize,
    /// Report score.
    pub score: u32,
}

impl TimetableKpi {
    /// Computes KPIs of a timetable.
    pub fn calculate(timetable: &Timetable, shape: &WeekShape) -> Self {
        let sections: Vec<SectionKpi> = timetable
            .grids
            .iter()
            .map(|g| SectionKpi::calculate(g, shape))
            .collect();

        let mut resource_load = BTreeMap::new();
        for (_, key, _) in timetable.ledger.iter() {
            *resource_load.entry(key.clone()).or_insert(0) += 1;
        }

        let avg_fill_rate = if sections.is_empty() {
            0.0
        } else {
            sections.iter().map(SectionKpi::fill_rate).sum::<f64>() / sections.len() as f64
        };

        Self {
            sections,
            resource_load,
            avg_fill_rate,
            hard_violations: timetable.report.hard_count(),
            soft_violations: timetable.report.soft_count(),
            score: timetable.report.score,
        }
    }

    /// Whether the timetable has no hard violations and reaches `min_score`.
    pub fn meets_thresholds(&self, min_score: u32) -> bool {
        self.hard_violations == 0 && self.score >= min_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Origin, SubjectCategory};

    fn class(id: &str, category: SubjectCategory) -> Cell {
        Cell::Class(Assignment::new(id, category, Origin::Selected))
    }

    #[test]
    fn test_section_kpi() {
        let shape = WeekShape::default();
        let mut grid = Grid::new("A", &shape);
        // Day 0: P1 P2 | P3 . | P5 -> gap at position 4.
        grid.place(Slot::new(0, 0), class("MA", SubjectCategory::Theory));
        grid.place(Slot::new(0, 1), class("PHY", SubjectCategory::Theory));
        grid.place(Slot::new(0, 3), class("ENG", SubjectCategory::Theory));
        grid.place(Slot::new(0, 6), class("CHE", SubjectCategory::Theory));
        // Day 1: lab cuts the run.
        grid.place(Slot::new(1, 1), class("MA", SubjectCategory::Theory));
        grid.place(Slot::new(1, 3), class("DSL", SubjectCategory::Lab));
        grid.place(Slot::new(1, 4), class("DSL", SubjectCategory::Lab));

        let kpi = SectionKpi::calculate(&grid, &shape);
        assert_eq!(kpi.filled, 7);
        assert_eq!(kpi.capacity, 42);
        assert_eq!(kpi.load_by_day, vec![4, 3, 0, 0, 0, 0]);
        assert_eq!(kpi.first_period_days, vec![0]);
        assert_eq!(kpi.longest_theory_run, 3);
        assert_eq!(kpi.idle_gaps, vec![Slot::new(0, 4)]);
        assert_eq!(kpi.load_spread(), 4);
        assert!((kpi.fill_rate() - 7.0 / 42.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_grid() {
        let shape = WeekShape::default();
        let kpi = SectionKpi::calculate(&Grid::new("A", &shape), &shape);
        assert_eq!(kpi.filled, 0);
        assert!(kpi.idle_gaps.is_empty());
        assert_eq!(kpi.longest_theory_run, 0);
        assert_eq!(kpi.load_spread(), 0);
    }
}
