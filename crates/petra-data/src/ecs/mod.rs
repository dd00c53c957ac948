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

//! Implements Petra's slot-indexed entity storage.
//!
//! Every entity is a slot index; every component kind lives in its own
//! fixed-capacity pool addressed by that index. Identity is kept honest by
//! generation counters in the [`EntityAllocator`], shared immutable shape
//! data is deduplicated by the [`ShapeCache`], and the [`World`] enforces
//! the cross-store ordering contract (a rigid body can only exist while its
//! kinematic state and collider do).
//!
//! The primary entry point is the [`World`] struct.

mod allocator;
mod bitset;
mod components;
mod pool;
mod shape_cache;
mod world;

pub use allocator::EntityAllocator;
pub use bitset::PresenceBitset;
pub use components::*;
pub use pool::{ComponentPool, Iter, IterMut, SlotIter};
pub use shape_cache::{ShapeCache, ShapeHandle};
pub use world::World;

#[cfg(test)]
mod tests;
