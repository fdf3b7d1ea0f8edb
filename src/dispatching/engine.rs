//! Rule engine for multi-criteria subject selection.
//!
//! Composes selection rules in sequence with a final tie-breaking strategy.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, Candidate, RuleScore, SelectionRule, SlotContext};
use crate::config::GeneratorConfig;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Leave tied candidates in input order (stable sort).
    #[default]
    Stable,
    /// Deterministic by subject ID (lexicographic).
    ById,
}

/// A composable rule engine for candidate ranking.
///
/// Rules are applied in order; a later rule is consulted only when every
/// earlier rule scores two candidates within `epsilon` of each other.
///
/// # Example
/// ```
/// use u_timetable::dispatching::{rules, RuleEngine, TieBreaker};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::CreditRatio)
///     .with_final_tie_breaker(TieBreaker::ById);
/// assert_eq!(engine.rule_names(), vec!["CREDIT_RATIO"]);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn SelectionRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::Stable,
            epsilon: 1e-9,
        }
    }

    /// The engine used by the generator: credit ratio, then morning
    /// preference when enabled, then subject id.
    pub fn for_config(config: &GeneratorConfig) -> Self {
        let engine = Self::new().with_rule(rules::CreditRatio);
        let engine = if config.prefer_morning {
            engine.with_rule(rules::MorningFirst)
        } else {
            engine
        };
        engine.with_final_tie_breaker(TieBreaker::ById)
    }

    /// Appends a rule.
    pub fn with_rule<R: SelectionRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts candidates by priority (highest priority first).
    ///
    /// Returns indices into the original candidate slice.
    pub fn sort_indices(&self, candidates: &[Candidate], context: &SlotContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..candidates.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&candidates[a], &candidates[b], context));
        indices
    }

    /// Returns the index of the highest-priority candidate.
    pub fn select_best(&self, candidates: &[Candidate], context: &SlotContext) -> Option<usize> {
        self.sort_indices(candidates, context).first().copied()
    }

    /// Evaluates a single candidate and returns scores from each rule.
    pub fn evaluate(&self, candidate: &Candidate, context: &SlotContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|r| r.evaluate(candidate, context))
            .collect()
    }

    fn compare(&self, a: &Candidate, b: &Candidate, context: &SlotContext) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a, context);
            let score_b = rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        match self.tie_breaker {
            TieBreaker::Stable => Ordering::Equal,
            TieBreaker::ById => a.subject_id.cmp(&b.subject_id),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
