//! Timetabling domain models.
//!
//! Provides the input catalogue (subjects, sections, teachers, rooms) and the
//! output types (grids, assignments, violation reports).
//!
//! # Domain Mappings
//!
//! | u-timetable | College | School |
//! |-------------|---------|--------|
//! | Subject | Course | Lesson |
//! | Section | Class/Division | Form |
//! | Batch | Lab batch | Set/Group |
//! | Grid | Section timetable | Class timetable |

mod catalogue;
mod grid;
mod report;
mod resource;
mod section;
mod subject;

pub use catalogue::Catalogue;
pub use grid::{Assignment, Cell, Grid, Origin, Slot};
pub use report::{Severity, Violation, ViolationKind, ViolationReport};
pub use resource::{ResourceKey, Room, Teacher};
pub use section::Section;
pub use subject::{FixedPlacement, Subject, SubjectCategory};
