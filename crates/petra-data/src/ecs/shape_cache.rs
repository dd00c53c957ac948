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

//! A deduplicating cache for shared, immutable collision shapes.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use petra_core::physics::CollisionShape;

/// A cheap-to-clone shared handle to an immutable collision shape.
///
/// Cloning a handle only bumps a reference count; the shape data itself is
/// never duplicated. Handles dereference to the underlying
/// [`CollisionShape`].
#[derive(Debug)]
pub struct ShapeHandle(Arc<CollisionShape>);

impl ShapeHandle {
    fn new(shape: CollisionShape) -> Self {
        Self(Arc::new(shape))
    }

    /// Returns the shape this handle refers to.
    pub fn shape(&self) -> &CollisionShape {
        &self.0
    }

    /// Returns `true` if both handles refer to the same underlying shape
    /// instance (not merely structurally equal shapes).
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Clone for ShapeHandle {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Deref for ShapeHandle {
    type Target = CollisionShape;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Structural identity of a shape: its kind plus the exact bit patterns of
/// its parameters. Two shapes share a cache entry if and only if their keys
/// are equal. No floating-point tolerance is applied, so "almost equal"
/// shapes stay distinct resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ShapeKey {
    Box([u32; 3]),
    Cylinder([u32; 3]),
    Sphere(u32),
    Capsule(u32, u32),
}

impl ShapeKey {
    fn of(shape: &CollisionShape) -> Self {
        match *shape {
            CollisionShape::Box(half) => {
                Self::Box([half.x.to_bits(), half.y.to_bits(), half.z.to_bits()])
            }
            CollisionShape::Cylinder(half) => {
                Self::Cylinder([half.x.to_bits(), half.y.to_bits(), half.z.to_bits()])
            }
            CollisionShape::Sphere(radius) => Self::Sphere(radius.to_bits()),
            CollisionShape::Capsule(radius, height) => {
                Self::Capsule(radius.to_bits(), height.to_bits())
            }
        }
    }
}

#[derive(Debug)]
struct ShapeEntry {
    handle: ShapeHandle,
    /// Number of entity slots currently referencing this shape. Clones of
    /// the handle held elsewhere do not count; only acquire/release do.
    dependents: usize,
}

/// Content-addressed storage for collision shapes shared between entities.
///
/// Entities requesting structurally identical shape parameters receive the
/// same underlying shape instance. The cache keeps explicit dependent
/// counts: the entry (and its key) is destroyed when the last referencing
/// slot releases it, so a later identical request constructs a fresh
/// resource.
#[derive(Debug, Default)]
pub struct ShapeCache {
    unique_shapes: HashMap<ShapeKey, ShapeEntry>,
    by_slot: HashMap<u32, ShapeKey>,
}

impl ShapeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `slot` references `shape`, deduplicating against every
    /// structurally identical shape already cached, and returns the shared
    /// handle.
    ///
    /// # Panics
    /// Panics if `slot` already references a shape; replacing a collider
    /// requires an explicit release first.
    pub fn acquire(&mut self, slot: u32, shape: CollisionShape) -> ShapeHandle {
        assert!(
            !self.by_slot.contains_key(&slot),
            "slot {slot} already references a collision shape"
        );
        let key = ShapeKey::of(&shape);
        let entry = self
            .unique_shapes
            .entry(key)
            .or_insert_with(|| ShapeEntry {
                handle: ShapeHandle::new(shape),
                dependents: 0,
            });
        entry.dependents += 1;
        self.by_slot.insert(slot, key);
        entry.handle.clone()
    }

    /// Copies `source_slot`'s shape reference to `slot`, incrementing the
    /// dependent count. Returns `None` (a normal, non-fatal outcome) if the
    /// source slot references no shape.
    ///
    /// # Panics
    /// Panics if `slot` already references a shape.
    pub fn share_from(&mut self, slot: u32, source_slot: u32) -> Option<ShapeHandle> {
        let key = *self.by_slot.get(&source_slot)?;
        assert!(
            !self.by_slot.contains_key(&slot),
            "slot {slot} already references a collision shape"
        );
        let entry = self
            .unique_shapes
            .get_mut(&key)
            .expect("cache entry missing for a referenced shape key");
        entry.dependents += 1;
        self.by_slot.insert(slot, key);
        Some(entry.handle.clone())
    }

    /// Drops `slot`'s shape reference. When the last referencing slot is
    /// gone, the shape and its key entry are destroyed.
    ///
    /// # Panics
    /// Panics if `slot` references no shape.
    pub fn release(&mut self, slot: u32) {
        let key = self
            .by_slot
            .remove(&slot)
            .unwrap_or_else(|| panic!("slot {slot} has no collision shape to release"));
        let entry = self
            .unique_shapes
            .get_mut(&key)
            .expect("cache entry missing for a referenced shape key");
        entry.dependents -= 1;
        if entry.dependents == 0 {
            self.unique_shapes.remove(&key);
        }
    }

    /// Returns the shape handle referenced by `slot`, if any.
    pub fn get(&self, slot: u32) -> Option<&ShapeHandle> {
        let key = self.by_slot.get(&slot)?;
        self.unique_shapes.get(key).map(|entry| &entry.handle)
    }

    /// Returns `true` if `slot` references a shape.
    pub fn has(&self, slot: u32) -> bool {
        self.by_slot.contains_key(&slot)
    }

    /// The number of distinct shapes currently cached.
    pub fn unique_shapes(&self) -> usize {
        self.unique_shapes.len()
    }

    /// The number of slots referencing the same shape as `slot`, including
    /// `slot` itself; `None` if the slot references no shape.
    pub fn dependents_of(&self, slot: u32) -> Option<usize> {
        let key = self.by_slot.get(&slot)?;
        self.unique_shapes.get(key).map(|entry| entry.dependents)
    }
}
