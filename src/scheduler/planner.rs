//! Day-block planning.
//!
//! # Algorithm
//!
//! 1. Spread the weekly total over the days: `base = weekly / days`, and the
//!    remainder one each onto the earliest days.
//! 2. For each day, slide a window of `target` consecutive teaching periods
//!    over the day (breaks inside the window are skipped, not counted). The
//!    window is widened to the fixed span when the day has fixed periods,
//!    and must contain all of them.
//! 3. Among admissible windows prefer, in order: not spanning lunch (unless
//!    the target exceeds the lunch-span threshold), then starting at the
//!    second teaching period, then the first, then later starts.
//!
//! The planner never fails. Targets above the day's capacity are clamped to
//! the full day; missing hours surface later in the violation report.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{GeneratorConfig, WeekShape};

/// The planned period range of one section on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBlock {
    /// Day index.
    pub day: usize,
    /// Periods the day should carry.
    pub target: usize,
    /// Inclusive (first, last) period positions, `None` for an empty day.
    pub range: Option<(usize, usize)>,
}

impl DayBlock {
    /// Whether a position lies inside the block.
    pub fn contains(&self, period: usize) -> bool {
        self.range
            .is_some_and(|(start, end)| start <= period && period <= end)
    }

    /// Teaching positions of the block, in order.
    pub fn teaching_periods(&self, shape: &WeekShape) -> Vec<usize> {
        match self.range {
            Some((start, end)) => (start..=end).filter(|&p| !shape.is_break(p)).collect(),
            None => Vec::new(),
        }
    }

    /// Whether the block crosses the lunch break.
    pub fn spans_lunch(&self, shape: &WeekShape) -> bool {
        match (self.range, shape.lunch_period) {
            (Some((start, end)), Some(lunch)) => start < lunch && lunch < end,
            _ => false,
        }
    }
}

/// Spreads `weekly` periods over `days`, remainder first.
pub fn day_targets(weekly: usize, days: usize) -> Vec<usize> {
    if days == 0 {
        return Vec::new();
    }
    let base = weekly / days;
    let remainder = weekly % days;
    (0..days)
        .map(|d| base + usize::from(d < remainder))
        .collect()
}

/// Plans one day.
///
/// `fixed` holds the positions of that day already committed by fixed
/// subjects.
pub fn plan_day(
    shape: &WeekShape,
    day: usize,
    target: usize,
    fixed: &BTreeSet<usize>,
    config: &GeneratorConfig,
) -> DayBlock {
    let teaching = shape.teaching_periods();
    let n = teaching.len();

    // Fixed positions as indices into the teaching list.
    let fixed_idx: Vec<usize> = teaching
        .iter()
        .enumerate()
        .filter(|(_, p)| fixed.contains(p))
        .map(|(i, _)| i)
        .collect();

    let mut width = target.min(n);
    if let (Some(&lo), Some(&hi)) = (fixed_idx.first(), fixed_idx.last()) {
        width = width.max(hi - lo + 1);
    }
    if width == 0 {
        return DayBlock {
            day,
            target,
            range: None,
        };
    }

    let may_span = target > config.effective_lunch_threshold();
    let spans = |s: usize| match shape.lunch_period {
        Some(lunch) => teaching[s] < lunch && lunch < teaching[s + width - 1],
        None => false,
    };
    let start_rank = |s: usize| {
        if !config.prefer_second_period_start {
            return s;
        }
        match s {
            1 => 0,
            0 => 1,
            _ => s,
        }
    };

    let best = (0..=n - width)
        .filter(|&s| {
            fixed_idx
                .iter()
                .all(|&i| s <= i && i < s + width)
        })
        .min_by_key(|&s| (usize::from(spans(s) && !may_span), start_rank(s)));

    let range = match best {
        Some(s) => Some((teaching[s], teaching[s + width - 1])),
        None => teaching.first().zip(teaching.last()).map(|(&a, &b)| (a, b)),
    };
    DayBlock { day, target, range }
}

/// Plans every day of the week for one section.
///
/// `weekly` is the section's total weekly periods, fixed ones included.
pub fn plan_week(
    shape: &WeekShape,
    weekly: usize,
    fixed_by_day: &BTreeMap<usize, BTreeSet<usize>>,
    config: &GeneratorConfig,
) -> Vec<DayBlock> {
    let empty = BTreeSet::new();
    day_targets(weekly, shape.day_count)
        .into_iter()
        .enumerate()
        .map(|(day, target)| {
            let fixed = fixed_by_day.get(&day).unwrap_or(&empty);
            plan_day(shape, day, target, fixed, config)
        })
        .collect()
}
