//! Contiguous block placement.
//!
//! Every placement goes through [`LabBlockPlacer::commit`], single periods
//! included: grid cells are checked first, then all ledger claims are
//! reserved in one all-or-nothing call, then the cells are written. A
//! split subject becomes one batch-rotation cell per period holding every
//! batch's assignment.

use thiserror::Error;

use super::{Allocation, Claim, LedgerClash, Occupant, ResourceLedger};
use crate::config::WeekShape;
use crate::models::{Assignment, Cell, Grid, Origin, Section, Slot, Subject};

/// Why a block could not be committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("block of {len} at {slot} crosses a break or leaves the day")]
    NotContiguous { slot: Slot, len: usize },

    #[error("cell {0} is not free")]
    CellTaken(Slot),

    #[error(transparent)]
    Clash(#[from] LedgerClash),

    #[error("no allocation given for {0}")]
    NoAllocation(String),
}

/// Finds and commits contiguous blocks.
#[derive(Debug, Clone, Copy)]
pub struct LabBlockPlacer<'a> {
    shape: &'a WeekShape,
}

impl<'a> LabBlockPlacer<'a> {
    /// Creates a placer for a week shape.
    pub fn new(shape: &'a WeekShape) -> Self {
        Self { shape }
    }

    /// Slots of a block starting at `start`.
    pub fn block_slots(start: Slot, len: usize) -> Vec<Slot> {
        (start.period..start.period + len)
            .map(|p| Slot::new(start.day, p))
            .collect()
    }

    /// Whether a block of `len` starting at `start` avoids breaks, stays
    /// inside `within` (inclusive positions), and finds every cell free.
    pub fn fits(&self, grid: &Grid, start: Slot, len: usize, within: (usize, usize)) -> bool {
        let (lo, hi) = within;
        start.period >= lo
            && start.period + len > 0
            && start.period + len - 1 <= hi
            && self.shape.is_contiguous(start.period, len)
            && Self::block_slots(start, len)
                .into_iter()
                .all(|s| grid.is_free(s))
    }

    /// Earliest block of `len` on `day`, starting at or after `from` and
    /// ending at or before `to`, for which `allocate` finds resources.
    pub fn find_block<F>(
        &self,
        grid: &Grid,
        day: usize,
        (from, to): (usize, usize),
        len: usize,
        mut allocate: F,
    ) -> Option<(Slot, Vec<Allocation>)>
    where
        F: FnMut(&[Slot]) -> Option<Vec<Allocation>>,
    {
        if len == 0 {
            return None;
        }
        (from..=to).find_map(|period| {
            let start = Slot::new(day, period);
            if !self.fits(grid, start, len, (from, to)) {
                return None;
            }
            allocate(&Self::block_slots(start, len)).map(|a| (start, a))
        })
    }

    /// Commits a block atomically into the grid and the ledger.
    ///
    /// Returns the slots written.
    #[allow(clippy::too_many_arguments)]
    pub fn commit(
        &self,
        grid: &mut Grid,
        ledger: &mut ResourceLedger,
        section: &Section,
        subject: &Subject,
        start: Slot,
        len: usize,
        allocations: &[Allocation],
        origin: Origin,
    ) -> Result<Vec<Slot>, PlacementError> {
        if !self.shape.is_contiguous(start.period, len) {
            return Err(PlacementError::NotContiguous { slot: start, len });
        }
        if allocations.is_empty() {
            return Err(PlacementError::NoAllocation(subject.id.clone()));
        }
        let slots = Self::block_slots(start, len);
        if let Some(&taken) = slots.iter().find(|&&s| !grid.is_free(s)) {
            return Err(PlacementError::CellTaken(taken));
        }

        let claims: Vec<Claim> = slots
            .iter()
            .flat_map(|&slot| {
                allocations.iter().flat_map(move |a| {
                    a.keys().into_iter().map(move |key| Claim {
                        slot,
                        key,
                        occupant: Occupant::new(&section.id, a.batch.clone(), &subject.id),
                    })
                })
            })
            .collect();
        ledger.reserve_all(claims)?;

        let assignments: Vec<Assignment> = allocations
            .iter()
            .map(|a| Assignment {
                subject_id: subject.id.clone(),
                batch: a.batch.clone(),
                category: subject.category,
                teacher: a.teacher.clone(),
                room: a.room.clone(),
                origin,
            })
            .collect();
        let rotation = assignments.len() > 1 || assignments.iter().any(|a| a.batch.is_some());

        for &slot in &slots {
            let cell = if rotation {
                Cell::BatchRotation(assignments.clone())
            } else {
                Cell::Class(assignments[0].clone())
            };
            grid.place(slot, cell);
        }
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceKey, SubjectCategory};

    fn shape() -> WeekShape {
        WeekShape::default()
    }

    fn alloc(batch: Option<&str>, teacher: &str, room: &str) -> Allocation {
        Allocation {
            batch: batch.map(String::from),
            teacher: Some(teacher.into()),
            room: Some(room.into()),
        }
    }

    #[test]
    fn test_fits_respects_breaks_and_range() {
        let shape = shape();
        let placer = LabBlockPlacer::new(&shape);
        let grid = Grid::new("A", &shape);
        assert!(placer.fits(&grid, Slot::new(0, 0), 2, (0, 8)));
        assert!(!placer.fits(&grid, Slot::new(0, 1), 2, (0, 8))); // short break
        assert!(!placer.fits(&grid, Slot::new(0, 4), 2, (0, 8))); // lunch
        assert!(!placer.fits(&grid, Slot::new(0, 6), 2, (0, 6))); // leaves range
        assert!(placer.fits(&grid, Slot::new(0, 7), 2, (0, 8)));
        assert!(!placer.fits(&grid, Slot::new(0, 8), 2, (0, 8))); // leaves day
    }

    #[test]
    fn test_find_block_earliest() {
        let shape = shape();
        let placer = LabBlockPlacer::new(&shape);
        let mut grid = Grid::new("A", &shape);
        grid.place(
            Slot::new(0, 0),
            Cell::Class(Assignment::new("MA", SubjectCategory::Theory, Origin::Selected)),
        );

        let found = placer.find_block(&grid, 0, (0, 8), 2, |_| Some(vec![alloc(None, "T", "L")]));
        assert_eq!(found.map(|(s, _)| s), Some(Slot::new(0, 3)));

        // Allocation refused at P3-P4: next block after lunch.
        let found = placer.find_block(&grid, 0, (0, 8), 2, |slots| {
            (slots[0].period != 3).then(|| vec![alloc(None, "T", "L")])
        });
        assert_eq!(found.map(|(s, _)| s), Some(Slot::new(0, 6)));
    }

    #[test]
    fn test_commit_batch_rotation() {
        let shape = shape();
        let placer = LabBlockPlacer::new(&shape);
        let mut grid = Grid::new("A", &shape);
        let mut ledger = ResourceLedger::new();
        let section = Section::new("A").with_batches(["B1", "B2"]);
        let lab = Subject::lab("DSL", 1).batched();
        let allocations = vec![
            alloc(Some("B1"), "T1", "LAB-1"),
            alloc(Some("B2"), "T2", "LAB-2"),
        ];

        let slots = placer
            .commit(
                &mut grid,
                &mut ledger,
                &section,
                &lab,
                Slot::new(0, 0),
                2,
                &allocations,
                Origin::Selected,
            )
            .unwrap();
        assert_eq!(slots, vec![Slot::new(0, 0), Slot::new(0, 1)]);
        assert_eq!(ledger.len(), 8);
        match grid.cell(Slot::new(0, 1)) {
            Some(Cell::BatchRotation(list)) => assert_eq!(list.len(), 2),
            other => panic!("expected rotation, got {other:?}"),
        }
        let holder = ledger
            .occupant(Slot::new(0, 1), &ResourceKey::room("LAB-2"))
            .unwrap();
        assert_eq!(holder.batch.as_deref(), Some("B2"));
    }

    #[test]
    fn test_commit_is_atomic_on_clash() {
        let shape = shape();
        let placer = LabBlockPlacer::new(&shape);
        let mut grid = Grid::new("A", &shape);
        let mut ledger = ResourceLedger::new();
        ledger
            .reserve(Claim {
                slot: Slot::new(0, 1),
                key: ResourceKey::teacher("T1"),
                occupant: Occupant::new("B", None, "PHY"),
            })
            .unwrap();

        let section = Section::new("A");
        let lab = Subject::lab("DSL", 1);
        let err = placer
            .commit(
                &mut grid,
                &mut ledger,
                &section,
                &lab,
                Slot::new(0, 0),
                2,
                &[alloc(None, "T1", "LAB-1")],
                Origin::Selected,
            )
            .unwrap_err();
        assert!(matches!(err, PlacementError::Clash(_)));
        assert!(grid.is_free(Slot::new(0, 0)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_commit_refuses_taken_cell_and_breaks() {
        let shape = shape();
        let placer = LabBlockPlacer::new(&shape);
        let mut grid = Grid::new("A", &shape);
        let mut ledger = ResourceLedger::new();
        let section = Section::new("A");
        let ma = Subject::theory("MA", 3);
        let a = [alloc(None, "T1", "R1")];

        placer
            .commit(&mut grid, &mut ledger, &section, &ma, Slot::new(0, 0), 1, &a, Origin::Selected)
            .unwrap();
        let err = placer
            .commit(&mut grid, &mut ledger, &section, &ma, Slot::new(0, 0), 1, &a, Origin::Selected)
            .unwrap_err();
        assert_eq!(err, PlacementError::CellTaken(Slot::new(0, 0)));

        let err = placer
            .commit(&mut grid, &mut ledger, &section, &ma, Slot::new(0, 1), 2, &a, Origin::Selected)
            .unwrap_err();
        assert!(matches!(err, PlacementError::NotContiguous { .. }));
        assert!(matches!(
            grid.cell(Slot::new(0, 0)),
            Some(Cell::Class(x)) if x.teacher.as_deref() == Some("T1")
        ));
    }
}
