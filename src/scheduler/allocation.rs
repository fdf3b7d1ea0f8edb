//! Teacher and room allocation for a prospective block.
//!
//! A block keeps the same teacher and room for all of its periods. Teachers
//! come from the subject's ordered candidate list; rooms come from the
//! section's home room (theory-like sessions) or from the pool of the
//! subject's room kind. When the subject is split across batches, every
//! batch gets its own teacher and room.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ResourceLedger;
use crate::models::{Catalogue, ResourceKey, Section, Slot, Subject};

/// Resources of one batch (or of the whole section) for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Batch id, when split.
    pub batch: Option<String>,
    /// Teacher id.
    pub teacher: Option<String>,
    /// Room id.
    pub room: Option<String>,
}

impl Allocation {
    /// Ledger keys of the allocation.
    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut keys = Vec::with_capacity(2);
        if let Some(t) = &self.teacher {
            keys.push(ResourceKey::teacher(t));
        }
        if let Some(r) = &self.room {
            keys.push(ResourceKey::room(r));
        }
        keys
    }
}

/// A resource the allocator needed but could not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    /// Batch concerned.
    pub batch: Option<String>,
    /// `"teacher"` or `"room"`.
    pub resource: &'static str,
}

enum Pick {
    NotNeeded,
    Found(String),
    Missing,
}

/// Finds free resources for every batch of a block, or `None` if any
/// required teacher or room is unavailable.
pub fn allocate(
    catalogue: &Catalogue,
    ledger: &ResourceLedger,
    section: &Section,
    subject: &Subject,
    slots: &[Slot],
) -> Option<Vec<Allocation>> {
    let (allocations, shortfalls) = allocate_partial(catalogue, ledger, section, subject, slots);
    shortfalls.is_empty().then_some(allocations)
}

/// Like [`allocate`], but leaves a resource empty instead of failing and
/// reports what is missing.
pub fn allocate_partial(
    catalogue: &Catalogue,
    ledger: &ResourceLedger,
    section: &Section,
    subject: &Subject,
    slots: &[Slot],
) -> (Vec<Allocation>, Vec<Shortfall>) {
    let batches: Vec<Option<String>> = if section.splits(subject) {
        section.batches.iter().cloned().map(Some).collect()
    } else {
        vec![None]
    };

    let rooms = room_candidates(catalogue, section, subject);
    let mut used_teachers = BTreeSet::new();
    let mut used_rooms = BTreeSet::new();
    let mut allocations = Vec::with_capacity(batches.len());
    let mut shortfalls = Vec::new();

    for batch in batches {
        let teacher = match pick_teacher(catalogue, ledger, subject, slots, &used_teachers) {
            Pick::Found(id) => {
                used_teachers.insert(id.clone());
                Some(id)
            }
            Pick::Missing => {
                shortfalls.push(Shortfall {
                    batch: batch.clone(),
                    resource: "teacher",
                });
                None
            }
            Pick::NotNeeded => None,
        };

        let room = match pick_room(ledger, &rooms, slots, &used_rooms) {
            Pick::Found(id) => {
                used_rooms.insert(id.clone());
                Some(id)
            }
            Pick::Missing => {
                shortfalls.push(Shortfall {
                    batch: batch.clone(),
                    resource: "room",
                });
                None
            }
            Pick::NotNeeded => None,
        };

        allocations.push(Allocation {
            batch,
            teacher,
            room,
        });
    }

    (allocations, shortfalls)
}

fn pick_teacher(
    catalogue: &Catalogue,
    ledger: &ResourceLedger,
    subject: &Subject,
    slots: &[Slot],
    taken: &BTreeSet<String>,
) -> Pick {
    if subject.teachers.is_empty() {
        return Pick::NotNeeded;
    }
    subject
        .teachers
        .iter()
        .filter(|id| !taken.contains(*id))
        .find(|id| {
            let available = catalogue
                .teacher(id)
                .map_or(true, |t| slots.iter().all(|&s| t.is_available(s)));
            let key = ResourceKey::teacher(id.as_str());
            available && slots.iter().all(|&s| ledger.is_free(s, &key))
        })
        .map_or(Pick::Missing, |id| Pick::Found(id.clone()))
}

fn pick_room(
    ledger: &ResourceLedger,
    candidates: &[String],
    slots: &[Slot],
    taken: &BTreeSet<String>,
) -> Pick {
    if candidates.is_empty() {
        return Pick::NotNeeded;
    }
    candidates
        .iter()
        .filter(|id| !taken.contains(*id))
        .find(|id| {
            let key = ResourceKey::room(id.as_str());
            slots.iter().all(|&s| ledger.is_free(s, &key))
        })
        .map_or(Pick::Missing, |id| Pick::Found(id.clone()))
}

/// Rooms a subject may use in a section, in order of preference.
fn room_candidates(catalogue: &Catalogue, section: &Section, subject: &Subject) -> Vec<String> {
    if let Some(kind) = &subject.room_kind {
        return catalogue
            .rooms_of_kind(kind)
            .into_iter()
            .map(|r| r.id.clone())
            .collect();
    }

    let Some(home) = &section.home_room else {
        return Vec::new();
    };
    let mut rooms = vec![home.clone()];
    if let Some(home_room) = catalogue.room(home) {
        rooms.extend(
            catalogue
                .rooms_of_kind(&home_room.kind)
                .into_iter()
                .filter(|r| r.id != *home)
                .map(|r| r.id.clone()),
        );
    }
    rooms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Room, Teacher};
    use crate::scheduler::{Claim, Occupant};

    fn catalogue() -> Catalogue {
        Catalogue::new()
            .with_subject(Subject::theory("MA", 4).with_teachers(["T1", "T2"]))
            .with_subject(
                Subject::lab("DSL", 1)
                    .with_teachers(["T1", "T2", "T3"])
                    .with_room_kind("lab")
                    .batched(),
            )
            .with_teacher(Teacher::new("T1").with_unavailable(Slot::new(1, 0)))
            .with_teacher(Teacher::new("T2"))
            .with_teacher(Teacher::new("T3"))
            .with_room(Room::new("R101", "classroom"))
            .with_room(Room::new("R102", "classroom"))
            .with_room(Room::new("LAB-2", "lab"))
            .with_room(Room::new("LAB-1", "lab"))
    }

    fn hold(ledger: &mut ResourceLedger, slot: Slot, key: ResourceKey) {
        ledger
            .reserve(Claim {
                slot,
                key,
                occupant: Occupant::new("OTHER", None, "X"),
            })
            .unwrap();
    }

    #[test]
    fn test_first_free_teacher_and_home_room() {
        let c = catalogue();
        let section = Section::new("A").with_home_room("R101");
        let ma = c.subject("MA").unwrap();
        let ledger = ResourceLedger::new();

        let alloc = allocate(&c, &ledger, &section, ma, &[Slot::new(0, 0)]).unwrap();
        assert_eq!(alloc.len(), 1);
        assert_eq!(alloc[0].teacher.as_deref(), Some("T1"));
        assert_eq!(alloc[0].room.as_deref(), Some("R101"));
        assert_eq!(alloc[0].batch, None);
    }

    #[test]
    fn test_skips_busy_and_unavailable_teachers() {
        let c = catalogue();
        let section = Section::new("A").with_home_room("R101");
        let ma = c.subject("MA").unwrap();
        let mut ledger = ResourceLedger::new();

        // T1 is unavailable at D2P1.
        let alloc = allocate(&c, &ledger, &section, ma, &[Slot::new(1, 0)]).unwrap();
        assert_eq!(alloc[0].teacher.as_deref(), Some("T2"));

        hold(&mut ledger, Slot::new(0, 0), ResourceKey::teacher("T1"));
        let alloc = allocate(&c, &ledger, &section, ma, &[Slot::new(0, 0)]).unwrap();
        assert_eq!(alloc[0].teacher.as_deref(), Some("T2"));

        hold(&mut ledger, Slot::new(0, 0), ResourceKey::teacher("T2"));
        assert!(allocate(&c, &ledger, &section, ma, &[Slot::new(0, 0)]).is_none());
    }

    #[test]
    fn test_home_room_falls_back_to_same_kind() {
        let c = catalogue();
        let section = Section::new("A").with_home_room("R101");
        let ma = c.subject("MA").unwrap();
        let mut ledger = ResourceLedger::new();
        hold(&mut ledger, Slot::new(0, 0), ResourceKey::room("R101"));

        let alloc = allocate(&c, &ledger, &section, ma, &[Slot::new(0, 0)]).unwrap();
        assert_eq!(alloc[0].room.as_deref(), Some("R102"));
    }

    #[test]
    fn test_batches_get_distinct_resources() {
        let c = catalogue();
        let section = Section::new("A").with_batches(["B1", "B2"]);
        let dsl = c.subject("DSL").unwrap();
        let slots = [Slot::new(0, 0), Slot::new(0, 1)];

        let alloc = allocate(&c, &ResourceLedger::new(), &section, dsl, &slots).unwrap();
        assert_eq!(alloc.len(), 2);
        assert_eq!(alloc[0].batch.as_deref(), Some("B1"));
        assert_eq!(alloc[0].teacher.as_deref(), Some("T1"));
        assert_eq!(alloc[0].room.as_deref(), Some("LAB-1"));
        assert_eq!(alloc[1].teacher.as_deref(), Some("T2"));
        assert_eq!(alloc[1].room.as_deref(), Some("LAB-2"));
    }

    #[test]
    fn test_block_needs_room_free_for_every_period() {
        let c = catalogue();
        let section = Section::new("A").with_batches(["B1", "B2"]);
        let dsl = c.subject("DSL").unwrap();
        let mut ledger = ResourceLedger::new();
        hold(&mut ledger, Slot::new(0, 1), ResourceKey::room("LAB-2"));

        let slots = [Slot::new(0, 0), Slot::new(0, 1)];
        assert!(allocate(&c, &ledger, &section, dsl, &slots).is_none());

        let (partial, shortfalls) = allocate_partial(&c, &ledger, &section, dsl, &slots);
        assert_eq!(partial[1].room, None);
        assert_eq!(partial[1].teacher.as_deref(), Some("T2"));
        assert_eq!(
            shortfalls,
            vec![Shortfall {
                batch: Some("B2".into()),
                resource: "room"
            }]
        );
    }

    #[test]
    fn test_no_requirements() {
        let c = Catalogue::new().with_subject(Subject::activity("SPORTS", 2));
        let section = Section::new("A");
        let sports = c.subject("SPORTS").unwrap();
        let alloc = allocate(&c, &ResourceLedger::new(), &section, sports, &[Slot::new(0, 0)])
            .unwrap();
        assert!(alloc[0].keys().is_empty());
    }
}
