//! Generator configuration and week shape.
//!
//! A week is `day_count` days of `periods_per_day` positions each. Some
//! positions are breaks (short break, lunch) and are never assignable; the
//! rest are teaching periods. Period indices are 0-based positions in the
//! day, breaks included, so a lab block is contiguous exactly when its
//! indices are consecutive and none of them is a break.
//!
//! Configuration files are TOML; every field has a default, so a file only
//! needs to list what it overrides:
//!
//! ```
//! use u_timetable::config::GeneratorConfig;
//!
//! let config = GeneratorConfig::from_toml_str(
//!     r#"
//!     max_consecutive_theory = 2
//!
//!     [shape]
//!     day_count = 5
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.max_consecutive_theory, 2);
//! assert_eq!(config.shape.day_count, 5);
//! assert_eq!(config.shape.periods_per_day, 9);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::GenerateResult;

/// Day/period structure of the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekShape {
    /// Number of working days.
    pub day_count: usize,
    /// Positions per day, breaks included.
    pub periods_per_day: usize,
    /// Positions that are breaks.
    pub break_periods: BTreeSet<usize>,
    /// The break that separates morning from afternoon, if any.
    pub lunch_period: Option<usize>,
    /// Display names, indexed by day.
    pub day_names: Vec<String>,
}

impl Default for WeekShape {
    /// Six days; P1 P2 | short break | P3 P4 | lunch | P5 P6 P7.
    fn default() -> Self {
        Self {
            day_count: 6,
            periods_per_day: 9,
            break_periods: BTreeSet::from([2, 5]),
            lunch_period: Some(5),
            day_names: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl WeekShape {
    /// Creates a shape with no breaks.
    pub fn new(day_count: usize, periods_per_day: usize) -> Self {
        Self {
            day_count,
            periods_per_day,
            break_periods: BTreeSet::new(),
            lunch_period: None,
            day_names: Vec::new(),
        }
    }

    /// Marks a position as a break.
    pub fn with_break(mut self, period: usize) -> Self {
        self.break_periods.insert(period);
        self
    }

    /// Marks a position as the lunch break.
    pub fn with_lunch(mut self, period: usize) -> Self {
        self.break_periods.insert(period);
        self.lunch_period = Some(period);
        self
    }

    /// Whether a position is a break (out-of-range positions count as breaks).
    #[inline]
    pub fn is_break(&self, period: usize) -> bool {
        period >= self.periods_per_day || self.break_periods.contains(&period)
    }

    /// Teaching period indices of one day, in order.
    pub fn teaching_periods(&self) -> Vec<usize> {
        (0..self.periods_per_day)
            .filter(|p| !self.break_periods.contains(p))
            .collect()
    }

    /// Teaching periods per day.
    pub fn teaching_count(&self) -> usize {
        self.teaching_periods().len()
    }

    /// Teaching periods in the whole week.
    pub fn weekly_capacity(&self) -> usize {
        self.day_count * self.teaching_count()
    }

    /// First teaching period of a day.
    pub fn first_teaching_period(&self) -> Option<usize> {
        (0..self.periods_per_day).find(|p| !self.break_periods.contains(p))
    }

    /// Number of teaching periods before lunch.
    ///
    /// `None` when there is no lunch or when lunch does not actually split
    /// the teaching periods into two non-empty halves.
    pub fn lunch_split(&self) -> Option<usize> {
        let lunch = self.lunch_period?;
        let teaching = self.teaching_periods();
        let before = teaching.iter().filter(|&&p| p < lunch).count();
        (before > 0 && before < teaching.len()).then_some(before)
    }

    /// Whether a position comes before lunch (always true without a lunch).
    pub fn is_before_lunch(&self, period: usize) -> bool {
        self.lunch_period.map_or(true, |lunch| period < lunch)
    }

    /// Whether `len` positions starting at `start` are all teaching periods.
    pub fn is_contiguous(&self, start: usize, len: usize) -> bool {
        len > 0 && (start..start + len).all(|p| !self.is_break(p))
    }

    /// Display name of a day.
    pub fn day_name(&self, day: usize) -> String {
        self.day_names
            .get(day)
            .cloned()
            .unwrap_or_else(|| format!("Day {}", day + 1))
    }
}

/// Penalties used to turn a violation report into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Score of a timetable without violations.
    pub ceiling: u32,
    /// Deducted per hard violation.
    pub hard_penalty: u32,
    /// Deducted per soft violation (except first-period use).
    pub soft_penalty: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            ceiling: 1000,
            hard_penalty: 100,
            soft_penalty: 5,
        }
    }
}

/// Tunables of one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Grid shape.
    pub shape: WeekShape,
    /// Soft cap on consecutive theory-like periods.
    pub max_consecutive_theory: usize,
    /// Place morning-preferred subjects before lunch when possible.
    pub prefer_morning: bool,
    /// Days per week a section may use its first period without penalty.
    pub first_period_allowance: usize,
    /// Penalty per first-period use beyond the allowance.
    pub first_period_penalty_weight: u32,
    /// Largest acceptable difference between the heaviest and lightest day.
    pub load_tolerance: usize,
    /// A day block may span lunch only when its target exceeds this.
    /// `None` derives it from the shape (teaching periods before lunch).
    pub lunch_span_threshold: Option<usize>,
    /// Start day blocks at the second teaching period when they still fit.
    pub prefer_second_period_start: bool,
    /// Place outstanding balances outside the day blocks after the walk.
    pub spill_outside_blocks: bool,
    /// Score penalties.
    pub weights: ScoreWeights,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            shape: WeekShape::default(),
            max_consecutive_theory: 3,
            prefer_morning: true,
            first_period_allowance: 3,
            first_period_penalty_weight: 2,
            load_tolerance: 2,
            lunch_span_threshold: None,
            prefer_second_period_start: true,
            spill_outside_blocks: true,
            weights: ScoreWeights::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> GenerateResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> GenerateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Sets the week shape.
    pub fn with_shape(mut self, shape: WeekShape) -> Self {
        self.shape = shape;
        self
    }

    /// Sets the consecutive theory cap.
    pub fn with_max_consecutive_theory(mut self, max: usize) -> Self {
        self.max_consecutive_theory = max;
        self
    }

    /// Enables or disables the morning preference rule.
    pub fn with_prefer_morning(mut self, prefer: bool) -> Self {
        self.prefer_morning = prefer;
        self
    }

    /// Sets the lunch-span threshold explicitly.
    pub fn with_lunch_span_threshold(mut self, threshold: usize) -> Self {
        self.lunch_span_threshold = Some(threshold);
        self
    }

    /// Enables or disables the spill pass.
    pub fn with_spill(mut self, spill: bool) -> Self {
        self.spill_outside_blocks = spill;
        self
    }

    /// Sets the first-period allowance.
    pub fn with_first_period_allowance(mut self, allowance: usize) -> Self {
        self.first_period_allowance = allowance;
        self
    }

    /// Sets the load tolerance.
    pub fn with_load_tolerance(mut self, tolerance: usize) -> Self {
        self.load_tolerance = tolerance;
        self
    }

    /// Effective lunch-span threshold.
    pub fn effective_lunch_threshold(&self) -> usize {
        self.lunch_span_threshold
            .or_else(|| self.shape.lunch_split())
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape() {
        let shape = WeekShape::default();
        assert_eq!(shape.teaching_periods(), vec![0, 1, 3, 4, 6, 7, 8]);
        assert_eq!(shape.teaching_count(), 7);
        assert_eq!(shape.weekly_capacity(), 42);
        assert_eq!(shape.first_teaching_period(), Some(0));
        assert_eq!(shape.lunch_split(), Some(4));
        assert_eq!(shape.day_name(0), "Mon");
        assert_eq!(shape.day_name(9), "Day 10");
    }

    #[test]
    fn test_break_contiguity() {
        let shape = WeekShape::default();
        assert!(shape.is_contiguous(0, 2)); // P1-P2
        assert!(!shape.is_contiguous(1, 2)); // P2 | short break
        assert!(shape.is_contiguous(3, 2)); // P3-P4
        assert!(!shape.is_contiguous(4, 2)); // P4 | lunch
        assert!(shape.is_contiguous(6, 3)); // P5-P7
        assert!(!shape.is_contiguous(7, 3)); // runs off the day
        assert!(!shape.is_contiguous(0, 0));
    }

    #[test]
    fn test_before_lunch() {
        let shape = WeekShape::default();
        assert!(shape.is_before_lunch(4));
        assert!(!shape.is_before_lunch(6));

        let flat = WeekShape::new(5, 6);
        assert!(flat.is_before_lunch(5));
        assert_eq!(flat.lunch_split(), None);
    }

    #[test]
    fn test_lunch_at_edge_does_not_split() {
        let shape = WeekShape::new(1, 4).with_lunch(0);
        assert_eq!(shape.lunch_split(), None);
    }

    #[test]
    fn test_effective_threshold() {
        let config = GeneratorConfig::default();
        assert_eq!(config.effective_lunch_threshold(), 4);

        let config = GeneratorConfig::default().with_lunch_span_threshold(2);
        assert_eq!(config.effective_lunch_threshold(), 2);

        let config = GeneratorConfig::default().with_shape(WeekShape::new(5, 6));
        assert_eq!(config.effective_lunch_threshold(), usize::MAX);
    }

    #[test]
    fn test_partial_toml() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            prefer_morning = false
            lunch_span_threshold = 3

            [shape]
            day_count = 5
            periods_per_day = 8
            break_periods = [2, 5]
            lunch_period = 5

            [weights]
            hard_penalty = 250
            "#,
        )
        .unwrap();

        assert!(!config.prefer_morning);
        assert_eq!(config.lunch_span_threshold, Some(3));
        assert_eq!(config.shape.day_count, 5);
        assert_eq!(config.shape.teaching_count(), 6);
        assert_eq!(config.weights.hard_penalty, 250);
        assert_eq!(config.weights.ceiling, 1000);
        assert_eq!(config.max_consecutive_theory, 3);
    }

    #[test]
    fn test_malformed_toml() {
        let err = GeneratorConfig::from_toml_str("max_consecutive_theory = \"three\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = GeneratorConfig::from_file(Path::new("/nonexistent/u-timetable.toml"));
        assert!(matches!(err, Err(crate::error::GenerateError::ConfigRead(_))));
    }
}
