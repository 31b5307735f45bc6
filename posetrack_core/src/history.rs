// posetrack_core/src/history.rs

//! A fixed-capacity, age-ordered store of recent pose samples.
//!
//! Slots are either vacant or occupied. Occupied slots always form a prefix of
//! the store and are sorted by ascending age, so the newest sample sits in
//! slot 0 and the oldest one is the first to fall off the tail.

use crate::types::PoseSample;

/// What `SampleHistory::insert` did with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The sample now occupies the slot at `index`.
    Inserted { index: usize },
    /// The sample is older than the retention horizon.
    TooOld,
    /// Every slot holds a newer sample, so this one would fall off immediately.
    Stale,
}

#[derive(Debug, Clone)]
pub struct SampleHistory {
    slots: Vec<Option<PoseSample>>,
    max_age: f64,
}

impl SampleHistory {
    /// Creates an empty history. A zero capacity is raised to one slot.
    pub fn new(capacity: usize, max_age: f64) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            max_age,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn max_age(&self) -> f64 {
        self.max_age
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Vacates every slot.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Occupied samples, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &PoseSample> + '_ {
        self.slots.iter().flatten()
    }

    pub fn newest(&self) -> Option<&PoseSample> {
        self.iter().next()
    }

    /// Advances every stored sample by `delta_seconds` of wall-clock time and
    /// vacates the ones that are now older than the retention horizon.
    ///
    /// Must be called before each insert with the time elapsed since the
    /// previous one, so that ages stay relative to the newest insert.
    pub fn age_all(&mut self, delta_seconds: f64) {
        let max_age = self.max_age;
        for slot in self.slots.iter_mut() {
            let expired = match slot {
                Some(sample) => {
                    sample.age += delta_seconds;
                    sample.age > max_age
                }
                None => false,
            };
            if expired {
                *slot = None;
            }
        }
    }

    /// Places a sample in age order, pushing older samples toward the tail.
    /// When the store is full the oldest sample is discarded.
    pub fn insert(&mut self, sample: PoseSample) -> InsertOutcome {
        if sample.age > self.max_age {
            return InsertOutcome::TooOld;
        }

        // The tail holds the oldest sample once the store is full.
        if let Some(Some(oldest)) = self.slots.last() {
            if oldest.age < sample.age {
                return InsertOutcome::Stale;
            }
        }

        let Some(index) = self.slots.iter().position(|slot| match slot {
            Some(stored) => stored.age >= sample.age,
            None => true,
        }) else {
            return InsertOutcome::Stale;
        };

        // The last slot (vacant or the oldest sample) wraps round to `index`
        // and is overwritten.
        self.slots[index..].rotate_right(1);
        self.slots[index] = Some(sample);

        InsertOutcome::Inserted { index }
    }
}
