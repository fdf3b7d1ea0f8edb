//! Timetable construction, validation and KPI evaluation.
//!
//! # Algorithm
//!
//! [`Generator`] is a deterministic greedy constructor. Fixed subjects are
//! pre-placed, each section's week is cut into day blocks by the
//! [`planner`](plan_week), and every block is walked period by period by
//! the [`SlotSelector`]. Multi-period subjects go through the
//! [`LabBlockPlacer`]; all teacher and room commitments of all sections
//! share one [`ResourceLedger`]. The finished grids are checked by the
//! [`ConstraintValidator`], which also scores them.
//!
//! It is not optimal: no backtracking, no search. Sections earlier in the
//! input get first pick of contended resources.
//!
//! # KPI
//!
//! [`TimetableKpi`] reports fill rate, daily load spread, first-period use,
//! theory runs, idle gaps and resource load.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

mod allocation;
mod fixed;
mod generator;
mod kpi;
mod lab;
mod ledger;
mod planner;
mod selector;
mod validator;

pub use allocation::{allocate, allocate_partial, Allocation, Shortfall};
pub use fixed::{place_fixed, FixedPeriods};
pub use generator::{generate, Generator, Timetable};
pub use kpi::{SectionKpi, TimetableKpi};
pub use lab::{LabBlockPlacer, PlacementError};
pub use ledger::{Claim, LedgerClash, Occupant, ResourceLedger};
pub use planner::{day_targets, plan_day, plan_week, DayBlock};
pub use selector::{Choice, SectionState, Selection, SlotOutcome, SlotSelector};
pub use validator::{score, ConstraintValidator};
