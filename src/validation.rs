//! Input validation for timetabling requests.
//!
//! Checks structural integrity of the catalogue, the sections and the week
//! shape before generation. Detects:
//! - Duplicate IDs (subjects, teachers, rooms, sections, batches)
//! - References to unknown subjects, teachers and rooms
//! - Block sizes that do not match the category, or hours that do not
//!   divide into whole blocks
//! - More weekly sessions than days
//! - Fixed placements out of range, on a break, or overlapping
//!
//! Every problem is collected; validation never stops at the first one.
//! Capacity is checked separately by [`check_capacity`], which turns into
//! [`GenerateError::InsufficientCapacity`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::{GeneratorConfig, WeekShape};
use crate::error::{GenerateError, GenerateResult};
use crate::models::{Catalogue, Section, Slot, Subject};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A section references a subject that doesn't exist.
    UnknownSubject,
    /// A subject references a teacher that doesn't exist.
    UnknownTeacher,
    /// A room reference (home room or room kind) cannot be resolved.
    UnknownRoom,
    /// A section has no subjects.
    EmptySection,
    /// Block size inconsistent with the category or the weekly hours.
    InvalidBlock,
    /// More weekly sessions than days in the week.
    TooManySessions,
    /// A fixed placement is out of range, on a break, or overlapping.
    InvalidFixedSlot,
    /// The week shape is unusable.
    InvalidShape,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the week shape of a configuration.
///
/// Checks:
/// 1. At least one day and one teaching period per day
/// 2. Break positions inside the day
/// 3. Lunch inside the day and marked as a break
pub fn validate_config(config: &GeneratorConfig) -> ValidationResult {
    let mut errors = Vec::new();
    check_shape(&config.shape, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_shape(shape: &WeekShape, errors: &mut Vec<ValidationError>) {
    if shape.day_count == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidShape,
            "Week has no days",
        ));
    }
    if shape.teaching_count() == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidShape,
            "Day has no teaching periods",
        ));
    }
    for &b in &shape.break_periods {
        if b >= shape.periods_per_day {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShape,
                format!(
                    "Break position {b} outside a {}-period day",
                    shape.periods_per_day
                ),
            ));
        }
    }
    if let Some(lunch) = shape.lunch_period {
        if !shape.break_periods.contains(&lunch) || lunch >= shape.periods_per_day {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShape,
                format!("Lunch position {lunch} is not a break inside the day"),
            ));
        }
    }
}

/// Validates the input of a generation request.
///
/// Checks:
/// 1. Week shape (see [`validate_config`])
/// 2. No duplicate subject, teacher, room or section IDs
/// 3. Subjects: known teachers, resolvable room kinds, block sizes
///    matching the category, fixed placements in range and off breaks
/// 4. Sections: non-empty, known subjects and home room, unique batches,
///    hours in whole blocks, no more sessions than days, fixed placements
///    that match the hours and do not overlap
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    catalogue: &Catalogue,
    sections: &[Section],
    config: &GeneratorConfig,
) -> ValidationResult {
    let mut errors = Vec::new();
    let shape = &config.shape;

    check_shape(shape, &mut errors);

    let teacher_ids = unique_ids(
        catalogue.teachers.iter().map(|t| t.id.as_str()),
        "teacher",
        &mut errors,
    );
    let room_ids = unique_ids(
        catalogue.rooms.iter().map(|r| r.id.as_str()),
        "room",
        &mut errors,
    );
    unique_ids(
        catalogue.subjects.iter().map(|s| s.id.as_str()),
        "subject",
        &mut errors,
    );
    unique_ids(
        sections.iter().map(|s| s.id.as_str()),
        "section",
        &mut errors,
    );

    for subject in &catalogue.subjects {
        check_subject(subject, shape, &teacher_ids, catalogue, &mut errors);
    }

    for section in sections {
        check_section(section, catalogue, shape, &room_ids, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn unique_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    label: &str,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {label} ID: {id}"),
            ));
        }
    }
    seen
}

fn check_subject(
    subject: &Subject,
    shape: &WeekShape,
    teacher_ids: &HashSet<&str>,
    catalogue: &Catalogue,
    errors: &mut Vec<ValidationError>,
) {
    for t in &subject.teachers {
        if !teacher_ids.contains(t.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTeacher,
                format!("Subject '{}' references unknown teacher '{t}'", subject.id),
            ));
        }
    }

    if let Some(kind) = &subject.room_kind {
        if catalogue.rooms_of_kind(kind).is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownRoom,
                format!(
                    "Subject '{}' needs a '{kind}' room but none exists",
                    subject.id
                ),
            ));
        }
    }

    let block_ok = if subject.category.is_block() {
        subject.block_size >= 2
    } else {
        subject.block_size == 1
    };
    if !block_ok {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidBlock,
            format!(
                "Subject '{}' ({:?}) has block size {}",
                subject.id, subject.category, subject.block_size
            ),
        ));
    }

    for fixed in &subject.fixed {
        let in_range = fixed.day < shape.day_count
            && fixed.start <= fixed.end
            && fixed.end < shape.periods_per_day;
        if !in_range {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFixedSlot,
                format!(
                    "Subject '{}' fixed at day {} periods {}..={} is out of range",
                    subject.id, fixed.day, fixed.start, fixed.end
                ),
            ));
        } else if fixed.periods().any(|p| shape.is_break(p)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFixedSlot,
                format!(
                    "Subject '{}' fixed at day {} periods {}..={} covers a break",
                    subject.id, fixed.day, fixed.start, fixed.end
                ),
            ));
        }
    }

    let mut fixed_days = BTreeSet::new();
    for fixed in &subject.fixed {
        if !fixed_days.insert(fixed.day) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFixedSlot,
                format!(
                    "Subject '{}' has two fixed placements on day {}",
                    subject.id, fixed.day
                ),
            ));
        }
    }
}

fn check_section(
    section: &Section,
    catalogue: &Catalogue,
    shape: &WeekShape,
    room_ids: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if section.subjects.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptySection,
            format!("Section '{}' has no subjects", section.id),
        ));
    }

    if let Some(room) = &section.home_room {
        if !room_ids.contains(room.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownRoom,
                format!(
                    "Section '{}' references unknown home room '{room}'",
                    section.id
                ),
            ));
        }
    }

    let mut batches = HashSet::new();
    for b in &section.batches {
        if !batches.insert(b.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate batch ID in section '{}': {b}", section.id),
            ));
        }
    }

    let mut required = HashSet::new();
    let mut fixed_cells: BTreeMap<Slot, &str> = BTreeMap::new();

    for id in &section.subjects {
        if !required.insert(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Section '{}' lists subject '{id}' twice", section.id),
            ));
            continue;
        }
        let Some(subject) = catalogue.subject(id) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownSubject,
                format!("Section '{}' references unknown subject '{id}'", section.id),
            ));
            continue;
        };

        let hours = section.weekly_hours(subject);

        if subject.is_fixed() {
            if hours as usize != subject.fixed_period_count() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidFixedSlot,
                    format!(
                        "Section '{}': subject '{id}' needs {hours} periods but is fixed at {}",
                        section.id,
                        subject.fixed_period_count()
                    ),
                ));
            }
            for fixed in &subject.fixed {
                for period in fixed.periods() {
                    let slot = Slot::new(fixed.day, period);
                    if let Some(other) = fixed_cells.insert(slot, id.as_str()) {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::InvalidFixedSlot,
                            format!(
                                "Section '{}': fixed subjects '{other}' and '{id}' overlap at {slot}",
                                section.id
                            ),
                        ));
                    }
                }
            }
            continue;
        }

        if subject.block_size > 0 && hours as usize % subject.block_size != 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBlock,
                format!(
                    "Section '{}': subject '{id}' has {hours} hours, not a multiple of block size {}",
                    section.id, subject.block_size
                ),
            ));
        }

        let sessions = subject.sessions_for(hours);
        if sessions > shape.day_count {
            errors.push(ValidationError::new(
                ValidationErrorKind::TooManySessions,
                format!(
                    "Section '{}': subject '{id}' needs {sessions} sessions in a {}-day week",
                    section.id, shape.day_count
                ),
            ));
        }
    }
}

/// Checks that a section's non-fixed hours fit the periods fixed subjects
/// leave over.
pub fn check_capacity(
    catalogue: &Catalogue,
    section: &Section,
    shape: &WeekShape,
) -> GenerateResult<()> {
    let mut fixed_cells = BTreeSet::new();
    let mut required = 0usize;

    for subject in catalogue.section_subjects(section) {
        if subject.is_fixed() {
            for fixed in &subject.fixed {
                fixed_cells.extend(
                    fixed
                        .periods()
                        .filter(|&p| !shape.is_break(p))
                        .map(|p| Slot::new(fixed.day, p)),
                );
            }
        } else {
            required += section.weekly_hours(subject) as usize;
        }
    }

    let available = shape.weekly_capacity().saturating_sub(fixed_cells.len());
    if required > available {
        return Err(GenerateError::InsufficientCapacity {
            section: section.id.clone(),
            required,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FixedPlacement, Room, Teacher};

    fn sample_catalogue() -> Catalogue {
        Catalogue::new()
            .with_subject(Subject::theory("MA", 4).with_teacher("T1"))
            .with_subject(
                Subject::lab("DSL", 1)
                    .with_teachers(["T1", "T2"])
                    .with_room_kind("computer-lab"),
            )
            .with_subject(Subject::activity("LIB", 1).with_fixed(FixedPlacement::single(5, 8)))
            .with_teacher(Teacher::new("T1"))
            .with_teacher(Teacher::new("T2"))
            .with_room(Room::new("R101", "classroom"))
            .with_room(Room::new("LAB-1", "computer-lab"))
    }

    fn sample_section() -> Section {
        Section::new("CSE-A")
            .with_subjects(["MA", "DSL", "LIB"])
            .with_batches(["B1", "B2"])
            .with_home_room("R101")
    }

    fn kinds(errors: &[ValidationError]) -> Vec<ValidationErrorKind> {
        errors.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_valid_input() {
        let config = GeneratorConfig::default();
        assert!(validate_input(&sample_catalogue(), &[sample_section()], &config).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let catalogue = sample_catalogue()
            .with_subject(Subject::theory("MA", 2))
            .with_teacher(Teacher::new("T1"));
        let sections = vec![sample_section(), sample_section()];

        let errors =
            validate_input(&catalogue, &sections, &GeneratorConfig::default()).unwrap_err();
        let dups: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::DuplicateId)
            .collect();
        assert_eq!(dups.len(), 3);
        assert!(dups.iter().any(|e| e.message.contains("subject")));
        assert!(dups.iter().any(|e| e.message.contains("teacher")));
        assert!(dups.iter().any(|e| e.message.contains("section")));
    }

    #[test]
    fn test_duplicate_batch() {
        let section = sample_section().with_batches(["B1", "B1"]);
        let errors =
            validate_input(&sample_catalogue(), &[section], &GeneratorConfig::default())
                .unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::DuplicateId]);
    }

    #[test]
    fn test_unknown_references() {
        let catalogue = sample_catalogue()
            .with_subject(Subject::theory("PHY", 3).with_teacher("NOBODY"))
            .with_subject(Subject::lab("CHL", 1).with_room_kind("chem-lab"));
        let section = sample_section()
            .with_subjects(["PHY", "CHL", "GHOST"])
            .with_home_room("R999");

        let errors =
            validate_input(&catalogue, &[section], &GeneratorConfig::default()).unwrap_err();
        let k = kinds(&errors);
        assert!(k.contains(&ValidationErrorKind::UnknownTeacher));
        assert!(k.contains(&ValidationErrorKind::UnknownSubject));
        assert_eq!(
            k.iter()
                .filter(|&&x| x == ValidationErrorKind::UnknownRoom)
                .count(),
            2
        );
    }

    #[test]
    fn test_empty_section() {
        let errors = validate_input(
            &sample_catalogue(),
            &[Section::new("EMPTY")],
            &GeneratorConfig::default(),
        )
        .unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::EmptySection]);
    }

    #[test]
    fn test_invalid_blocks() {
        let catalogue = sample_catalogue()
            .with_subject(Subject::theory("BAD1", 2).with_block_size(2))
            .with_subject(Subject::lab("BAD2", 1).with_block_size(1))
            .with_subject(Subject::project("ODD", 3));
        let section = Section::new("X").with_subjects(["BAD1", "BAD2", "ODD"]);

        let errors =
            validate_input(&catalogue, &[section], &GeneratorConfig::default()).unwrap_err();
        let blocks = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidBlock)
            .count();
        // BAD1 and BAD2 by category; ODD because 3 hours is not whole 2-period blocks.
        assert_eq!(blocks, 3);
    }

    #[test]
    fn test_too_many_sessions() {
        let section = Section::new("X").with_subject("MA").with_hours("MA", 7);
        let errors =
            validate_input(&sample_catalogue(), &[section], &GeneratorConfig::default())
                .unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::TooManySessions]);
    }

    #[test]
    fn test_fixed_slot_errors() {
        let catalogue = sample_catalogue()
            .with_subject(Subject::activity("ON-BREAK", 1).with_fixed(FixedPlacement::single(0, 2)))
            .with_subject(Subject::activity("OUT", 1).with_fixed(FixedPlacement::single(9, 0)))
            .with_subject(Subject::activity("CLASH", 1).with_fixed(FixedPlacement::single(5, 8)))
            .with_subject(Subject::activity("SHORT", 3).with_fixed(FixedPlacement::single(4, 0)));
        let section = Section::new("X").with_subjects(["LIB", "ON-BREAK", "OUT", "CLASH", "SHORT"]);

        let errors =
            validate_input(&catalogue, &[section], &GeneratorConfig::default()).unwrap_err();
        let fixed: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidFixedSlot)
            .collect();
        assert_eq!(fixed.len(), 4);
        assert!(fixed.iter().any(|e| e.message.contains("covers a break")));
        assert!(fixed.iter().any(|e| e.message.contains("out of range")));
        assert!(fixed.iter().any(|e| e.message.contains("overlap")));
        assert!(fixed.iter().any(|e| e.message.contains("fixed at 1")));
    }

    #[test]
    fn test_invalid_shape() {
        let config = GeneratorConfig::default().with_shape(
            WeekShape::new(0, 3).with_break(0).with_break(1).with_break(2).with_break(7),
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::InvalidShape));
    }

    #[test]
    fn test_lunch_must_be_break() {
        let mut shape = WeekShape::new(5, 6);
        shape.lunch_period = Some(3);
        let config = GeneratorConfig::default().with_shape(shape);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("Lunch"));
    }

    #[test]
    fn test_capacity() {
        let shape = WeekShape::default();
        let catalogue = sample_catalogue();
        assert!(check_capacity(&catalogue, &sample_section(), &shape).is_ok());

        // 42 teaching periods; LIB takes one, so 41 remain.
        let section = sample_section().with_hours("MA", 40);
        match check_capacity(&catalogue, &section, &shape) {
            Err(GenerateError::InsufficientCapacity {
                section,
                required,
                available,
            }) => {
                assert_eq!(section, "CSE-A");
                assert_eq!(required, 42);
                assert_eq!(available, 41);
            }
            other => panic!("expected capacity error, got {other:?}"),
        }
    }
}
