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

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The reserved slot value that denotes "no entity". It is never issued by
/// an allocator, and every component store keeps its cell for this slot
/// permanently vacant.
pub const NULL_SLOT: u32 = 0;

/// The default maximum number of simultaneously-live entities a world can
/// hold. Storage for every component kind is sized against this bound at
/// construction time, so it also caps total memory usage.
pub const DEFAULT_MAX_ENTITIES: u32 = 4096;

/// A unique identifier for an entity in the world.
///
/// It combines a slot index with a generation count to solve the "ABA
/// problem". When an entity is destroyed, its slot can be recycled for a new
/// entity, but the generation is incremented. This ensures that old `Entity`
/// handles pointing to a recycled slot become invalid and cannot
/// accidentally affect the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct Entity {
    /// The slot index shared by this entity and all of its components across
    /// every typed store.
    pub slot: u32,
    /// A generation counter incremented each time the slot is reused.
    /// Generation `0` marks an uninitialized handle; live entities start at
    /// generation `1`.
    pub generation: u32,
}

impl Entity {
    /// The "no entity" sentinel: slot `0`, generation `0`.
    pub const NULL: Entity = Entity {
        slot: NULL_SLOT,
        generation: 0,
    };

    /// Returns `true` if this handle is the null sentinel.
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.slot == NULL_SLOT
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}
