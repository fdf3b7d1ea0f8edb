//! Teacher and room model.
//!
//! Teachers and rooms are the shared resources of a generation run. A
//! resource is identified in the ledger by a [`ResourceKey`], which keeps the
//! teacher and room namespaces apart so a teacher and a room may share an id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::Slot;

/// Ledger key of a shared resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKey {
    /// A teacher, by id.
    Teacher(String),
    /// A room, by id.
    Room(String),
}

impl ResourceKey {
    /// Teacher key.
    pub fn teacher(id: impl Into<String>) -> Self {
        Self::Teacher(id.into())
    }

    /// Room key.
    pub fn room(id: impl Into<String>) -> Self {
        Self::Room(id.into())
    }

    /// The underlying id.
    pub fn id(&self) -> &str {
        match self {
            Self::Teacher(id) | Self::Room(id) => id,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Teacher(id) => write!(f, "teacher:{id}"),
            Self::Room(id) => write!(f, "room:{id}"),
        }
    }
}

/// A teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Slots the teacher cannot teach in.
    #[serde(default)]
    pub unavailable: BTreeSet<Slot>,
}

impl Teacher {
    /// Creates a teacher available all week.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            unavailable: BTreeSet::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks a slot as unavailable.
    pub fn with_unavailable(mut self, slot: Slot) -> Self {
        self.unavailable.insert(slot);
        self
    }

    /// Marks a whole day as unavailable.
    pub fn with_day_off(mut self, day: usize, periods_per_day: usize) -> Self {
        self.unavailable
            .extend((0..periods_per_day).map(|period| Slot::new(day, period)));
        self
    }

    /// Whether the teacher can teach at a slot.
    #[inline]
    pub fn is_available(&self, slot: Slot) -> bool {
        !self.unavailable.contains(&slot)
    }

    /// Ledger key of this teacher.
    pub fn key(&self) -> ResourceKey {
        ResourceKey::teacher(&self.id)
    }
}

/// A room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Room kind (e.g. "classroom", "computer-lab").
    pub kind: String,
}

impl Room {
    /// Creates a room of the given kind.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind: kind.into(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Ledger key of this room.
    pub fn key(&self) -> ResourceKey {
        ResourceKey::room(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_namespaces() {
        let t = ResourceKey::teacher("X1");
        let r = ResourceKey::room("X1");
        assert_ne!(t, r);
        assert_eq!(t.id(), r.id());
        assert_eq!(t.to_string(), "teacher:X1");
        assert_eq!(r.to_string(), "room:X1");
    }

    #[test]
    fn test_teacher_availability() {
        let t = Teacher::new("T1")
            .with_name("Dr. Rao")
            .with_unavailable(Slot::new(0, 0))
            .with_day_off(2, 9);
        assert!(!t.is_available(Slot::new(0, 0)));
        assert!(t.is_available(Slot::new(0, 1)));
        assert!(!t.is_available(Slot::new(2, 8)));
        assert_eq!(t.unavailable.len(), 10);
        assert_eq!(t.key(), ResourceKey::teacher("T1"));
    }

    #[test]
    fn test_room_builder() {
        let r = Room::new("LAB-1", "computer-lab").with_name("Lab 1");
        assert_eq!(r.kind, "computer-lab");
        assert_eq!(r.name, "Lab 1");
        assert_eq!(r.key(), ResourceKey::room("LAB-1"));
    }
}
