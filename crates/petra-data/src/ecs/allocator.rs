// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entity identifier allocation and recycling.

use std::collections::VecDeque;

use petra_core::{Entity, NULL_SLOT};

/// Per-slot bookkeeping: the generation last issued for the slot and whether
/// that generation is currently alive.
#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    generation: u32,
    alive: bool,
}

/// Issues and recycles generational entity identifiers.
///
/// Slots are issued from `1` upward (slot `0` is the reserved null sentinel)
/// until the fixed capacity is reached; destroyed slots are recycled
/// **first-in, first-out** so reuse pressure spreads evenly across the slot
/// range instead of hammering the most recently freed slot. A recycled slot
/// comes back with its generation incremented, which is what lets stale
/// handles be told apart from the slot's new occupant.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Indexed by slot; entry `0` stays at its default and is never issued.
    slots: Vec<SlotState>,
    /// Destroyed slots awaiting reuse, oldest first.
    free: VecDeque<u32>,
    /// The next never-issued slot.
    next_slot: u32,
    live: u32,
}

impl EntityAllocator {
    /// Creates an allocator bounded to `capacity` simultaneously-live
    /// entities.
    pub fn new(capacity: u32) -> Self {
        Self {
            slots: vec![SlotState::default(); capacity as usize + 1],
            free: VecDeque::new(),
            next_slot: NULL_SLOT + 1,
            live: 0,
        }
    }

    /// Issues a new entity identifier.
    ///
    /// Destroyed slots are reused (FIFO) before fresh slots are touched;
    /// a fresh slot starts at generation `1`, a reused one at its previous
    /// generation plus one.
    ///
    /// # Panics
    /// Panics when the fixed capacity is exhausted; exceeding it is a
    /// programmer error, not a runtime condition to recover from.
    pub fn create(&mut self) -> Entity {
        let entity = if let Some(slot) = self.free.pop_front() {
            let state = &mut self.slots[slot as usize];
            state.generation += 1;
            state.alive = true;
            Entity {
                slot,
                generation: state.generation,
            }
        } else {
            assert!(
                self.next_slot < self.slots.len() as u32,
                "too many entities created (capacity {})",
                self.capacity()
            );
            let slot = self.next_slot;
            self.next_slot += 1;
            let state = &mut self.slots[slot as usize];
            state.generation = 1;
            state.alive = true;
            Entity {
                slot,
                generation: 1,
            }
        };
        self.live += 1;
        entity
    }

    /// Marks `entity`'s slot dead and enqueues it for reuse.
    ///
    /// # Panics
    /// Panics if `entity` is stale (its generation does not match the slot's
    /// current one) or already dead.
    pub fn destroy(&mut self, entity: Entity) {
        assert!(
            self.is_live(entity),
            "cannot destroy stale or dead entity {entity:?}"
        );
        self.slots[entity.slot as usize].alive = false;
        self.free.push_back(entity.slot);
        self.live -= 1;
    }

    /// Returns `true` if `entity` names the current live occupant of its
    /// slot: in range, alive, and with a matching generation.
    pub fn is_live(&self, entity: Entity) -> bool {
        if entity.slot == NULL_SLOT {
            return false;
        }
        match self.slots.get(entity.slot as usize) {
            Some(state) => state.alive && state.generation == entity.generation,
            None => false,
        }
    }

    /// The maximum number of simultaneously-live entities.
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32 - 1
    }

    /// The number of currently-live entities.
    pub fn live_count(&self) -> u32 {
        self.live
    }
}
