//! Deterministic weekly timetable engine.
//!
//! Builds a week-long grid for every section of an academic department:
//! credit-driven theory periods, contiguous lab blocks split across
//! batches, fixed institutional slots, and one resource ledger so that no
//! teacher or room is ever double-booked.
//!
//! # Modules
//!
//! - **`config`**: Week shape and generator tunables, loadable from TOML
//! - **`models`**: Domain types: `Subject`, `Section`, `Teacher`, `Room`,
//!   `Catalogue`, `Grid`, `Cell`, `ViolationReport`
//! - **`dispatching`**: Selection rules and the sequential `RuleEngine`
//! - **`scheduler`**: Day-block planner, slot selector, lab block placer,
//!   resource ledger, generator, constraint validator and KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown
//!   references, block sizes, fixed slots, capacity)
//! - **`error`**: `GenerateError`
//!
//! # Example
//!
//! ```
//! use u_timetable::{generate, GeneratorConfig};
//! use u_timetable::models::{Catalogue, Room, Section, Subject, Teacher};
//!
//! let catalogue = Catalogue::new()
//!     .with_teacher(Teacher::new("T1"))
//!     .with_room(Room::new("R101", "classroom"))
//!     .with_subject(Subject::theory("MA", 4).with_teacher("T1"))
//!     .with_subject(Subject::theory("ENG", 2));
//! let sections = vec![Section::new("CSE-A")
//!     .with_subjects(["MA", "ENG"])
//!     .with_home_room("R101")];
//!
//! let timetable = generate(&catalogue, &sections, &GeneratorConfig::default()).unwrap();
//! assert!(timetable.is_valid());
//! assert_eq!(timetable.grids[0].placed_count("MA"), 4);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - de Werra (1985), "An introduction to timetabling"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::{GeneratorConfig, WeekShape};
pub use error::{GenerateError, GenerateResult};
pub use scheduler::{generate, Generator, Timetable};
