//! Fixed-slot pre-placement.
//!
//! Runs once for every section before any walk. Fixed placements bypass
//! selection and are never moved afterwards. A placement whose teacher or
//! room cannot be found is still committed, without the missing key, and
//! reported as unresolved.

use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use super::{allocate_partial, LabBlockPlacer, ResourceLedger};
use crate::config::WeekShape;
use crate::models::{
    Catalogue, Grid, Origin, Section, Slot, Violation, ViolationKind, ViolationReport,
};

/// Fixed positions of one section, by day.
pub type FixedPeriods = BTreeMap<usize, BTreeSet<usize>>;

/// Commits every fixed placement of every section.
///
/// `grids` is parallel to `sections`. Returns the fixed positions of each
/// section, in the same order.
pub fn place_fixed(
    catalogue: &Catalogue,
    sections: &[Section],
    shape: &WeekShape,
    grids: &mut [Grid],
    ledger: &mut ResourceLedger,
    report: &mut ViolationReport,
) -> Vec<FixedPeriods> {
    let placer = LabBlockPlacer::new(shape);
    let mut result = Vec::with_capacity(sections.len());

    for (section, grid) in sections.iter().zip(grids.iter_mut()) {
        let mut fixed_periods = FixedPeriods::new();

        for subject in catalogue.section_subjects(section) {
            for placement in &subject.fixed {
                let start = Slot::new(placement.day, placement.start);
                let slots = LabBlockPlacer::block_slots(start, placement.len());
                let (allocations, shortfalls) =
                    allocate_partial(catalogue, ledger, section, subject, &slots);

                for shortfall in &shortfalls {
                    warn!(
                        section = %section.id,
                        subject = %subject.id,
                        slot = %start,
                        resource = shortfall.resource,
                        "fixed placement committed without a free resource"
                    );
                    let mut message = format!(
                        "no free {} for fixed subject {}",
                        shortfall.resource, subject.id
                    );
                    if let Some(batch) = &shortfall.batch {
                        message.push_str(&format!(" (batch {batch})"));
                    }
                    report.push(
                        Violation::new(ViolationKind::UnresolvedResource, &section.id, message)
                            .at(start)
                            .with_subject(&subject.id),
                    );
                }

                match placer.commit(
                    grid,
                    ledger,
                    section,
                    subject,
                    start,
                    placement.len(),
                    &allocations,
                    Origin::Fixed,
                ) {
                    Ok(slots) => {
                        fixed_periods
                            .entry(placement.day)
                            .or_default()
                            .extend(slots.iter().map(|s| s.period));
                    }
                    Err(err) => {
                        warn!(
                            section = %section.id,
                            subject = %subject.id,
                            slot = %start,
                            error = %err,
                            "fixed placement failed"
                        );
                    }
                }
            }
        }

        result.push(fixed_periods);
    }

    result
}
