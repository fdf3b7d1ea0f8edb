//! Section model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Subject;

/// A student section: one grid, one set of required subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Required subject ids, in catalogue order.
    pub subjects: Vec<String>,
    /// Per-section weekly hour overrides (subject id → hours).
    #[serde(default)]
    pub hour_overrides: BTreeMap<String, u32>,
    /// Lab batch identifiers; empty when labs are not split.
    #[serde(default)]
    pub batches: Vec<String>,
    /// Room used by sessions without a room kind.
    #[serde(default)]
    pub home_room: Option<String>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subjects: Vec::new(),
            hour_overrides: BTreeMap::new(),
            batches: Vec::new(),
            home_room: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a required subject.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subjects.push(subject_id.into());
        self
    }

    /// Adds several required subjects.
    pub fn with_subjects<I, S>(mut self, subject_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects.extend(subject_ids.into_iter().map(Into::into));
        self
    }

    /// Overrides a subject's weekly hours for this section.
    pub fn with_hours(mut self, subject_id: impl Into<String>, hours: u32) -> Self {
        self.hour_overrides.insert(subject_id.into(), hours);
        self
    }

    /// Sets the lab batches.
    pub fn with_batches<I, S>(mut self, batches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batches = batches.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the home room.
    pub fn with_home_room(mut self, room_id: impl Into<String>) -> Self {
        self.home_room = Some(room_id.into());
        self
    }

    /// Weekly hours of a subject for this section.
    pub fn weekly_hours(&self, subject: &Subject) -> u32 {
        self.hour_overrides
            .get(&subject.id)
            .copied()
            .unwrap_or(subject.weekly_hours)
    }

    /// Whether the section requires a subject.
    pub fn requires(&self, subject_id: &str) -> bool {
        self.subjects.iter().any(|s| s == subject_id)
    }

    /// Whether a subject runs split across batches in this section.
    pub fn splits(&self, subject: &Subject) -> bool {
        subject.batched && !self.batches.is_empty()
    }
}
