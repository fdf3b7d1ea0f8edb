//! Selection rules and rule engine for slot filling.
//!
//! When a slot of a day block is open, every eligible subject becomes a
//! [`Candidate`] and the [`RuleEngine`] ranks them. Rules are evaluated in
//! sequence; the next rule is consulted only on ties, and the subject id
//! settles whatever is still tied.
//!
//! # Usage
//!
//! ```
//! use u_timetable::dispatching::{rules, Candidate, RuleEngine, SlotContext, TieBreaker};
//! use u_timetable::models::{Slot, Subject};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::CreditRatio)
//!     .with_rule(rules::MorningFirst)
//!     .with_final_tie_breaker(TieBreaker::ById);
//!
//! let candidates = vec![
//!     Candidate::new(&Subject::theory("PHY", 2), 2),
//!     Candidate::new(&Subject::theory("MA", 4), 4),
//! ];
//! let ctx = SlotContext::at(Slot::new(0, 1)).with_days_left(6);
//! assert_eq!(engine.select_best(&candidates, &ctx), Some(1));
//! ```
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::{Candidate, SlotContext};
pub use engine::{RuleEngine, TieBreaker};

use std::fmt::Debug;

/// Score returned by a selection rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A selection rule that ranks candidate subjects for a slot.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for subjects that should be placed first.
pub trait SelectionRule: Send + Sync + Debug {
    /// Rule name (e.g., "CREDIT_RATIO").
    fn name(&self) -> &'static str;

    /// Evaluates a candidate for the slot described by `context`.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, candidate: &Candidate, context: &SlotContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
