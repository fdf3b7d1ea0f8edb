//! Catalogue: the static input of a generation run.

use serde::{Deserialize, Serialize};

use super::{Room, Section, Subject, Teacher};

/// Subjects, teachers and rooms known to a generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    /// Subject definitions.
    pub subjects: Vec<Subject>,
    /// Teacher roster.
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    /// Room inventory.
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Catalogue {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Looks up a subject.
    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Looks up a teacher.
    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    /// Looks up a room.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Rooms of a kind, sorted by id.
    pub fn rooms_of_kind(&self, kind: &str) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self.rooms.iter().filter(|r| r.kind == kind).collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    /// Subjects required by a section, in the section's order.
    ///
    /// Unknown ids are skipped; input validation reports them.
    pub fn section_subjects<'a>(&'a self, section: &Section) -> Vec<&'a Subject> {
        section
            .subjects
            .iter()
            .filter_map(|id| self.subject(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalogue {
        Catalogue::new()
            .with_subject(Subject::theory("MA", 4))
            .with_subject(Subject::lab("DSL", 1))
            .with_teacher(Teacher::new("T1"))
            .with_room(Room::new("LAB-2", "computer-lab"))
            .with_room(Room::new("R101", "classroom"))
            .with_room(Room::new("LAB-1", "computer-lab"))
    }

    #[test]
    fn test_lookups() {
        let c = sample();
        assert!(c.subject("MA").is_some());
        assert!(c.subject("PHY").is_none());
        assert!(c.teacher("T1").is_some());
        assert_eq!(c.room("R101").map(|r| r.kind.as_str()), Some("classroom"));
    }

    #[test]
    fn test_rooms_of_kind_sorted() {
        let c = sample();
        let ids: Vec<&str> = c
            .rooms_of_kind("computer-lab")
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["LAB-1", "LAB-2"]);
        assert!(c.rooms_of_kind("auditorium").is_empty());
    }

    #[test]
    fn test_section_subjects_order() {
        let c = sample();
        let section = Section::new("A").with_subjects(["DSL", "XYZ", "MA"]);
        let ids: Vec<&str> = c
            .section_subjects(&section)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["DSL", "MA"]);
    }
}
