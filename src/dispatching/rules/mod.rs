//! Built-in selection rules.
//!
//! - **CREDIT_RATIO**: credit-based round robin
//! - **MORNING_FIRST**: morning-preferred subjects before lunch
//!
//! # Score Convention
//! All rules return lower scores for higher priority candidates.

use super::{Candidate, RuleScore, SelectionRule, SlotContext};

/// Credit-based round robin.
///
/// Prioritizes subjects with more sessions left per remaining day, so a
/// subject that needs a session on every remaining day is never starved.
/// Sessions rather than periods are counted, which puts a two-period lab
/// with one weekly session on the same footing as a one-period theory.
#[derive(Debug, Clone, Copy)]
pub struct CreditRatio;

impl SelectionRule for CreditRatio {
    fn name(&self) -> &'static str {
        "CREDIT_RATIO"
    }

    fn evaluate(&self, candidate: &Candidate, context: &SlotContext) -> RuleScore {
        let days = context.days_left.max(1) as f64;
        -(candidate.sessions_left() as f64 / days)
    }

    fn description(&self) -> &'static str {
        "Remaining sessions per remaining day"
    }
}

/// Morning preference.
///
/// Morning-preferred subjects go first before lunch and last after it.
/// Neutral for everything else.
#[derive(Debug, Clone, Copy)]
pub struct MorningFirst;

impl SelectionRule for MorningFirst {
    fn name(&self) -> &'static str {
        "MORNING_FIRST"
    }

    fn evaluate(&self, candidate: &Candidate, context: &SlotContext) -> RuleScore {
        match (candidate.prefers_morning, context.before_lunch) {
            (false, _) => 0.0,
            (true, true) => -1.0,
            (true, false) => 1.0,
        }
    }

    fn description(&self) -> &'static str {
        "Morning-preferred subjects before lunch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Slot, Subject};

    fn ctx(days_left: usize, before_lunch: bool) -> SlotContext {
        SlotContext::at(Slot::new(0, 0))
            .with_days_left(days_left)
            .with_before_lunch(before_lunch)
    }

    #[test]
    fn test_credit_ratio() {
        let ma = Candidate::new(&Subject::theory("MA", 4), 4);
        let phy = Candidate::new(&Subject::theory("PHY", 2), 2);
        let c = ctx(4, true);
        assert!((CreditRatio.evaluate(&ma, &c) - -1.0).abs() < 1e-10);
        assert!((CreditRatio.evaluate(&phy, &c) - -0.5).abs() < 1e-10);
    }

    #[test]
    fn test_credit_ratio_lab_counts_sessions() {
        // A one-session lab competes with a one-hour theory, not a two-hour one.
        let lab = Candidate::new(&Subject::lab("DSL", 1), 2);
        let theory = Candidate::new(&Subject::theory("ENG", 1), 1);
        let c = ctx(6, true);
        assert!(
            (CreditRatio.evaluate(&lab, &c) - CreditRatio.evaluate(&theory, &c)).abs() < 1e-10
        );
    }

    #[test]
    fn test_credit_ratio_zero_days() {
        let ma = Candidate::new(&Subject::theory("MA", 4), 2);
        assert!((CreditRatio.evaluate(&ma, &ctx(0, true)) - -2.0).abs() < 1e-10);
    }

    #[test]
    fn test_morning_first() {
        let lab = Candidate::new(&Subject::lab("DSL", 1), 2);
        let theory = Candidate::new(&Subject::theory("MA", 4), 4);
        assert!(MorningFirst.evaluate(&lab, &ctx(6, true)) < 0.0);
        assert!(MorningFirst.evaluate(&lab, &ctx(6, false)) > 0.0);
        assert!((MorningFirst.evaluate(&theory, &ctx(6, true))).abs() < 1e-10);
    }
}
