//! Shared resource ledger.
//!
//! One ledger is created per generation request and shared by every section.
//! It maps (slot, resource key) to the single occupant holding it. A second
//! claim on a held key is refused at commit time, so the ledger can never
//! contain a clash.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::models::{ResourceKey, Slot};

/// Who holds a resource in a slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Occupant {
    /// Section id.
    pub section_id: String,
    /// Batch id, when the class is split.
    pub batch: Option<String>,
    /// Subject id.
    pub subject_id: String,
}

impl Occupant {
    /// Creates an occupant.
    pub fn new(
        section_id: impl Into<String>,
        batch: Option<String>,
        subject_id: impl Into<String>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            batch,
            subject_id: subject_id.into(),
        }
    }
}

/// A request to hold one key in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Slot.
    pub slot: Slot,
    /// Resource.
    pub key: ResourceKey,
    /// Prospective holder.
    pub occupant: Occupant,
}

/// A claim refused because the key is already held.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{key} at {slot} is held by section {} ({})", .holder.section_id, .holder.subject_id)]
pub struct LedgerClash {
    /// Slot of the refused claim.
    pub slot: Slot,
    /// Contested resource.
    pub key: ResourceKey,
    /// Current holder.
    pub holder: Occupant,
}

/// Per-slot resource commitments of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLedger {
    entries: BTreeMap<(Slot, ResourceKey), Occupant>,
}

impl ResourceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a key is unheld in a slot.
    #[inline]
    pub fn is_free(&self, slot: Slot, key: &ResourceKey) -> bool {
        !self.entries.contains_key(&(slot, key.clone()))
    }

    /// Current holder of a key in a slot.
    pub fn occupant(&self, slot: Slot, key: &ResourceKey) -> Option<&Occupant> {
        self.entries.get(&(slot, key.clone()))
    }

    /// Holds one key.
    pub fn reserve(&mut self, claim: Claim) -> Result<(), LedgerClash> {
        self.reserve_all(vec![claim])
    }

    /// Holds every key of `claims`, or none of them.
    ///
    /// Fails on the first claim whose key is already held, either in the
    /// ledger or by an earlier claim of the same call.
    pub fn reserve_all(&mut self, claims: Vec<Claim>) -> Result<(), LedgerClash> {
        let mut pending: BTreeMap<(Slot, &ResourceKey), &Occupant> = BTreeMap::new();
        for claim in &claims {
            if let Some(holder) = self.occupant(claim.slot, &claim.key) {
                return Err(LedgerClash {
                    slot: claim.slot,
                    key: claim.key.clone(),
                    holder: holder.clone(),
                });
            }
            if let Some(holder) = pending.insert((claim.slot, &claim.key), &claim.occupant) {
                return Err(LedgerClash {
                    slot: claim.slot,
                    key: claim.key.clone(),
                    holder: holder.clone(),
                });
            }
        }

        for claim in claims {
            self.entries.insert((claim.slot, claim.key), claim.occupant);
        }
        Ok(())
    }

    /// Slots in which a key is held.
    pub fn load_of(&self, key: &ResourceKey) -> usize {
        self.entries.keys().filter(|(_, k)| k == key).count()
    }

    /// Every key held at least once.
    pub fn keys(&self) -> BTreeSet<&ResourceKey> {
        self.entries.keys().map(|(_, k)| k).collect()
    }

    /// Keys held in a slot.
    pub fn held_at(&self, slot: Slot) -> Vec<(&ResourceKey, &Occupant)> {
        self.entries
            .iter()
            .filter(|((s, _), _)| *s == slot)
            .map(|((_, k), o)| (k, o))
            .collect()
    }

    /// All entries in (slot, key) order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &ResourceKey, &Occupant)> {
        self.entries.iter().map(|((s, k), o)| (*s, k, o))
    }

    /// Entries as claims, for export.
    pub fn claims(&self) -> Vec<Claim> {
        self.iter()
            .map(|(slot, key, occupant)| Claim {
                slot,
                key: key.clone(),
                occupant: occupant.clone(),
            })
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
