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

//! The entity-facing orchestrator over every typed store.

use petra_core::math::{Transform, Vec3};
use petra_core::physics::{CollisionShape, PhysicsProvider, RigidBodyDesc};
use petra_core::{Entity, DEFAULT_MAX_ENTITIES};

use super::allocator::EntityAllocator;
use super::components::{KinematicState, RigidBody, Tag};
use super::pool::ComponentPool;
use super::shape_cache::{ShapeCache, ShapeHandle};

/// The central container for simulated entities and their components.
///
/// The `World` owns the identifier allocator, one [`ComponentPool`] per
/// component kind, the [`ShapeCache`], and the physics provider. It is the
/// layer that upholds the cross-store composition rule (**a rigid body may
/// exist only while the same slot holds both a kinematic state and a
/// collider**), checking it on every attach and unwinding components in
/// dependency order on destroy.
///
/// Identifier hygiene: every entity-facing call validates the handle's
/// generation against the allocator, so a stale copy of a destroyed entity
/// can never alias its slot's new occupant. Mutating calls treat a stale
/// handle as a contract violation and panic; read-only lookups report it as
/// an ordinary absence.
pub struct World {
    allocator: EntityAllocator,
    kinematic_states: ComponentPool<KinematicState>,
    rigid_bodies: ComponentPool<RigidBody>,
    tags: ComponentPool<Tag>,
    shapes: ShapeCache,
    provider: Box<dyn PhysicsProvider>,
}

impl World {
    /// Creates a world bounded to [`DEFAULT_MAX_ENTITIES`] entities,
    /// simulated by `provider`.
    pub fn new(provider: Box<dyn PhysicsProvider>) -> Self {
        Self::with_capacity(provider, DEFAULT_MAX_ENTITIES)
    }

    /// Creates a world bounded to `capacity` simultaneously-live entities.
    /// All component storage is allocated up front against this bound.
    pub fn with_capacity(provider: Box<dyn PhysicsProvider>, capacity: u32) -> Self {
        Self {
            allocator: EntityAllocator::new(capacity),
            kinematic_states: ComponentPool::with_capacity(capacity),
            rigid_bodies: ComponentPool::with_capacity(capacity),
            tags: ComponentPool::with_capacity(capacity),
            shapes: ShapeCache::new(),
            provider,
        }
    }

    fn assert_live(&self, entity: Entity, action: &str) {
        assert!(
            self.allocator.is_live(entity),
            "{action}: entity {entity:?} is stale or was destroyed"
        );
    }

    // --- Entity lifecycle ---

    /// Creates a new, component-less entity.
    ///
    /// # Panics
    /// Panics when the world's fixed entity capacity is exhausted.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.create();
        log::debug!("created entity {entity:?}");
        entity
    }

    /// Destroys an entity and every component attached to it, unwinding in
    /// dependency order: rigid body first (unregistering it from the
    /// provider), then collider, then kinematic state, then tag. The
    /// identifier's slot returns to the allocator's reuse pool.
    ///
    /// This is the only supported way to shed a kinematic state or collider
    /// while a rigid body exists.
    ///
    /// # Panics
    /// Panics if `entity` is stale or already destroyed.
    pub fn destroy_entity(&mut self, entity: Entity) {
        self.assert_live(entity, "destroy_entity");
        let slot = entity.slot;
        if self.rigid_bodies.has(slot) {
            self.remove_rigid_body(entity);
        }
        if self.shapes.has(slot) {
            self.remove_collider(entity);
        }
        if self.kinematic_states.has(slot) {
            self.kinematic_states.remove(slot);
        }
        if self.tags.has(slot) {
            self.tags.remove(slot);
        }
        self.allocator.destroy(entity);
        log::debug!("destroyed entity {entity:?}");
    }

    /// The number of currently-live entities.
    pub fn live_entities(&self) -> u32 {
        self.allocator.live_count()
    }

    /// The maximum number of simultaneously-live entities.
    pub fn capacity(&self) -> u32 {
        self.allocator.capacity()
    }

    /// Returns `true` if `entity` is the current live occupant of its slot.
    pub fn is_live(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity)
    }

    // --- Kinematic state ---

    /// Attaches a kinematic state (world pose) to an entity.
    ///
    /// # Panics
    /// Panics if `entity` is stale or already has a kinematic state.
    pub fn add_kinematic_state(
        &mut self,
        entity: Entity,
        transform: Transform,
    ) -> &mut KinematicState {
        self.assert_live(entity, "add_kinematic_state");
        self.kinematic_states
            .add(entity.slot, KinematicState::new(transform))
    }

    /// Detaches an entity's kinematic state.
    ///
    /// # Panics
    /// Panics if `entity` is stale, has no kinematic state, or still has a
    /// rigid body (remove the rigid body first).
    pub fn remove_kinematic_state(&mut self, entity: Entity) {
        self.assert_live(entity, "remove_kinematic_state");
        assert!(
            !self.rigid_bodies.has(entity.slot),
            "cannot remove the kinematic state of slot {} while its rigid body exists",
            entity.slot
        );
        self.kinematic_states.remove(entity.slot);
    }

    /// Returns an entity's kinematic state, if present.
    pub fn kinematic_state(&self, entity: Entity) -> Option<&KinematicState> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        self.kinematic_states.get(entity.slot)
    }

    /// Returns an entity's kinematic state mutably, if present.
    pub fn kinematic_state_mut(&mut self, entity: Entity) -> Option<&mut KinematicState> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        self.kinematic_states.get_mut(entity.slot)
    }

    /// Returns `true` if the entity has a kinematic state.
    pub fn has_kinematic_state(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity) && self.kinematic_states.has(entity.slot)
    }

    // --- Colliders ---

    /// Attaches a box collider with the given half-extents, sharing the
    /// underlying shape with every entity using identical parameters.
    pub fn set_box_collider(&mut self, entity: Entity, half_extents: Vec3) -> ShapeHandle {
        self.set_collider(entity, CollisionShape::Box(half_extents))
    }

    /// Attaches a Y-axis cylinder collider with the given half-extents.
    pub fn set_cylinder_collider(&mut self, entity: Entity, half_extents: Vec3) -> ShapeHandle {
        self.set_collider(entity, CollisionShape::Cylinder(half_extents))
    }

    /// Attaches a sphere collider with the given radius.
    pub fn set_sphere_collider(&mut self, entity: Entity, radius: f32) -> ShapeHandle {
        self.set_collider(entity, CollisionShape::Sphere(radius))
    }

    /// Attaches a Y-axis capsule collider with the given radius and
    /// cylindrical-section height.
    pub fn set_capsule_collider(&mut self, entity: Entity, radius: f32, height: f32) -> ShapeHandle {
        self.set_collider(entity, CollisionShape::Capsule(radius, height))
    }

    /// Attaches `shape` to an entity, deduplicated through the shape cache.
    ///
    /// # Panics
    /// Panics if `entity` is stale or already has a collider.
    pub fn set_collider(&mut self, entity: Entity, shape: CollisionShape) -> ShapeHandle {
        self.assert_live(entity, "set_collider");
        self.shapes.acquire(entity.slot, shape)
    }

    /// Attaches to `entity` the same shape another entity already uses.
    /// Returns `None` (a normal outcome) if `source` is dead, stale, or has
    /// no collider.
    ///
    /// # Panics
    /// Panics if `entity` is stale or already has a collider.
    pub fn set_collider_from(&mut self, entity: Entity, source: Entity) -> Option<ShapeHandle> {
        self.assert_live(entity, "set_collider_from");
        if !self.allocator.is_live(source) {
            return None;
        }
        self.shapes.share_from(entity.slot, source.slot)
    }

    /// Detaches an entity's collider, releasing its reference to the shared
    /// shape.
    ///
    /// # Panics
    /// Panics if `entity` is stale, has no collider, or still has a rigid
    /// body (remove the rigid body first).
    pub fn remove_collider(&mut self, entity: Entity) {
        self.assert_live(entity, "remove_collider");
        assert!(
            !self.rigid_bodies.has(entity.slot),
            "cannot remove the collider of slot {} while its rigid body exists",
            entity.slot
        );
        self.shapes.release(entity.slot);
    }

    /// Returns the entity's shared shape handle, if it has a collider.
    pub fn collision_shape(&self, entity: Entity) -> Option<&ShapeHandle> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        self.shapes.get(entity.slot)
    }

    /// Returns `true` if the entity has a collider.
    pub fn has_collider(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity) && self.shapes.has(entity.slot)
    }

    /// Read access to the shape cache (dedup counts, dependent counts).
    pub fn shape_cache(&self) -> &ShapeCache {
        &self.shapes
    }

    // --- Rigid bodies ---

    /// Attaches a rigid body and registers it with the physics provider.
    ///
    /// The body is seeded from the entity's current kinematic-state pose and
    /// its collider; its local inertia is derived from the shape and `mass`
    /// (a zero mass makes the body static).
    ///
    /// # Panics
    /// Panics if `entity` is stale, already has a rigid body, or lacks
    /// either a kinematic state or a collider.
    pub fn add_rigid_body(&mut self, entity: Entity, mass: f32, restitution: f32) -> &RigidBody {
        self.assert_live(entity, "add_rigid_body");
        let slot = entity.slot;
        let transform = self.kinematic_states.get(slot).map(|state| state.transform);
        let shape = self.shapes.get(slot).map(|handle| *handle.shape());
        let (transform, shape) = match (transform, shape) {
            (Some(transform), Some(shape)) => (transform, shape),
            _ => panic!(
                "cannot add a rigid body to slot {slot} without a kinematic state and a collider"
            ),
        };

        let desc = RigidBodyDesc {
            transform,
            mass,
            restitution,
            shape,
            local_inertia: shape.local_inertia(mass),
        };
        let handle = self.provider.register_body(&desc);
        log::debug!("registered body {handle:?} for entity slot {slot}");
        self.rigid_bodies.add(
            slot,
            RigidBody {
                handle,
                mass,
                restitution,
            },
        )
    }

    /// Detaches an entity's rigid body, unregistering it from the physics
    /// provider before the component is dropped.
    ///
    /// # Panics
    /// Panics if `entity` is stale or has no rigid body.
    pub fn remove_rigid_body(&mut self, entity: Entity) {
        self.assert_live(entity, "remove_rigid_body");
        let slot = entity.slot;
        let handle = self
            .rigid_bodies
            .get(slot)
            .map(|body| body.handle)
            .unwrap_or_else(|| panic!("cannot remove a non-existent rigid body from slot {slot}"));
        self.provider.unregister_body(handle);
        log::debug!("unregistered body {handle:?} for entity slot {slot}");
        self.rigid_bodies.remove(slot);
    }

    /// Returns an entity's rigid-body component, if present.
    pub fn rigid_body(&self, entity: Entity) -> Option<&RigidBody> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        self.rigid_bodies.get(entity.slot)
    }

    /// Returns `true` if the entity has a rigid body.
    pub fn has_rigid_body(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity) && self.rigid_bodies.has(entity.slot)
    }

    // --- Tags ---

    /// Attaches a label to an entity.
    ///
    /// # Panics
    /// Panics if `entity` is stale or already has a tag.
    pub fn add_tag(&mut self, entity: Entity, name: impl Into<String>) -> &Tag {
        self.assert_live(entity, "add_tag");
        self.tags.add(entity.slot, Tag::new(name))
    }

    /// Detaches an entity's label.
    ///
    /// # Panics
    /// Panics if `entity` is stale or has no tag.
    pub fn remove_tag(&mut self, entity: Entity) {
        self.assert_live(entity, "remove_tag");
        self.tags.remove(entity.slot);
    }

    /// Returns an entity's label, if present.
    pub fn tag(&self, entity: Entity) -> Option<&str> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        self.tags.get(entity.slot).map(|tag| tag.name.as_str())
    }

    /// Returns `true` if the entity has a label.
    pub fn has_tag(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity) && self.tags.has(entity.slot)
    }

    // --- Simulation ---

    /// Advances the simulation, splitting `dt` into at most `max_substeps`
    /// fixed substeps of `fixed_dt` seconds, then writes every registered
    /// body's integrated pose back into its kinematic state. After this call
    /// the component data is the authoritative source of positions.
    pub fn step_simulation(&mut self, dt: f32, max_substeps: u32, fixed_dt: f32) {
        self.provider.advance(dt, max_substeps, fixed_dt);
        for (slot, body) in self.rigid_bodies.iter() {
            if let Some(transform) = self.provider.body_transform(body.handle) {
                if let Some(state) = self.kinematic_states.get_mut(slot) {
                    state.transform = transform;
                }
            }
        }
    }

    /// Advances the simulation by a single fixed step of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.step_simulation(dt, 1, 1.0 / 60.0);
    }

    /// Returns the provider's global gravity vector.
    pub fn gravity(&self) -> Vec3 {
        self.provider.gravity()
    }

    /// Sets the provider's global gravity vector.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.provider.set_gravity(gravity);
    }

    // --- Iteration ---

    /// The pool of every rigid-body component, for bulk read-only iteration.
    pub fn rigid_bodies(&self) -> &ComponentPool<RigidBody> {
        &self.rigid_bodies
    }

    /// The pool of every rigid-body component, for bulk mutation.
    pub fn rigid_bodies_mut(&mut self) -> &mut ComponentPool<RigidBody> {
        &mut self.rigid_bodies
    }

    /// The pool of every kinematic-state component, for bulk read-only
    /// iteration.
    pub fn kinematic_states(&self) -> &ComponentPool<KinematicState> {
        &self.kinematic_states
    }

    /// The pool of every kinematic-state component, for bulk mutation.
    pub fn kinematic_states_mut(&mut self) -> &mut ComponentPool<KinematicState> {
        &mut self.kinematic_states
    }

    /// The pool of every tag component, for bulk read-only iteration.
    pub fn tags(&self) -> &ComponentPool<Tag> {
        &self.tags
    }
}
