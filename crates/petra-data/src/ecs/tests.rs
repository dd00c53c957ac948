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

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use petra_core::math::{Transform, Vec3};
use petra_core::physics::{BodyHandle, CollisionShape, PhysicsProvider, RigidBodyDesc};

use super::allocator::EntityAllocator;
use super::pool::ComponentPool;
use super::shape_cache::{ShapeCache, ShapeHandle};
use super::world::World;

// --- SCRIPTED PROVIDER FOR ORCHESTRATOR TESTS ---

/// Everything the scripted provider records, shared with the test body via
/// an `Arc` so it stays observable after the provider moves into the world.
#[derive(Default)]
struct ProviderState {
    next_id: u64,
    gravity: Vec3,
    bodies: HashMap<u64, Transform>,
    registered: Vec<u64>,
    unregistered: Vec<u64>,
    advances: Vec<(f32, u32, f32)>,
}

/// A stand-in engine: registration hands out sequential handles, and every
/// `advance` sinks each registered body by `dt` along -Y so pose write-back
/// is observable without real integration.
#[derive(Clone, Default)]
struct ScriptedProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl ScriptedProvider {
    fn state(&self) -> Arc<Mutex<ProviderState>> {
        self.state.clone()
    }
}

impl PhysicsProvider for ScriptedProvider {
    fn advance(&mut self, dt: f32, max_substeps: u32, fixed_dt: f32) {
        let mut state = self.state.lock().unwrap();
        state.advances.push((dt, max_substeps, fixed_dt));
        for transform in state.bodies.values_mut() {
            transform.translation.y -= dt;
        }
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.state.lock().unwrap().gravity = gravity;
    }

    fn gravity(&self) -> Vec3 {
        self.state.lock().unwrap().gravity
    }

    fn register_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.bodies.insert(id, desc.transform);
        state.registered.push(id);
        BodyHandle(id)
    }

    fn unregister_body(&mut self, handle: BodyHandle) {
        let mut state = self.state.lock().unwrap();
        state.bodies.remove(&handle.0);
        state.unregistered.push(handle.0);
    }

    fn body_transform(&self, handle: BodyHandle) -> Option<Transform> {
        self.state.lock().unwrap().bodies.get(&handle.0).copied()
    }

    fn set_body_transform(&mut self, handle: BodyHandle, transform: Transform) {
        if let Some(slot) = self.state.lock().unwrap().bodies.get_mut(&handle.0) {
            *slot = transform;
        }
    }
}

fn scripted_world(capacity: u32) -> (World, Arc<Mutex<ProviderState>>) {
    let provider = ScriptedProvider::default();
    let state = provider.state();
    (World::with_capacity(Box::new(provider), capacity), state)
}

// --- ALLOCATOR ---

#[test]
fn allocator_issues_unique_nonzero_slots() {
    let mut allocator = EntityAllocator::new(64);
    let mut seen = Vec::new();
    for _ in 0..64 {
        let entity = allocator.create();
        assert_ne!(entity.slot, 0, "the null slot must never be issued");
        assert_eq!(entity.generation, 1);
        assert!(!seen.contains(&entity.slot), "slot issued twice");
        seen.push(entity.slot);
    }
    assert_eq!(allocator.live_count(), 64);
}

#[test]
fn allocator_recycles_fifo_with_bumped_generation() {
    let mut allocator = EntityAllocator::new(8);
    let a = allocator.create();
    let b = allocator.create();

    // Destroy in order; FIFO reuse must hand back a's slot first.
    allocator.destroy(a);
    allocator.destroy(b);

    let reused_a = allocator.create();
    assert_eq!(reused_a.slot, a.slot);
    assert_eq!(reused_a.generation, a.generation + 1);

    let reused_b = allocator.create();
    assert_eq!(reused_b.slot, b.slot);
    assert_eq!(reused_b.generation, b.generation + 1);
}

#[test]
fn allocator_invalidates_stale_handles() {
    let mut allocator = EntityAllocator::new(4);
    let stale = allocator.create();
    allocator.destroy(stale);
    let fresh = allocator.create();

    assert_eq!(fresh.slot, stale.slot);
    assert!(allocator.is_live(fresh));
    assert!(!allocator.is_live(stale));
}

#[test]
#[should_panic(expected = "too many entities created")]
fn allocator_capacity_exhaustion_panics() {
    let mut allocator = EntityAllocator::new(2);
    allocator.create();
    allocator.create();
    allocator.create();
}

#[test]
#[should_panic(expected = "cannot destroy stale or dead entity")]
fn allocator_double_destroy_panics() {
    let mut allocator = EntityAllocator::new(4);
    let entity = allocator.create();
    allocator.destroy(entity);
    allocator.destroy(entity);
}

// --- COMPONENT POOL ---

#[test]
fn pool_add_get_remove_roundtrip() {
    let mut pool: ComponentPool<String> = ComponentPool::with_capacity(16);

    let value = pool.add(3, "crate".to_owned());
    assert_eq!(value, "crate");

    assert!(pool.has(3));
    assert_eq!(pool.get(3).map(String::as_str), Some("crate"));
    assert_eq!(pool.len(), 1);

    pool.remove(3);
    assert!(!pool.has(3));
    assert!(pool.get(3).is_none());
    assert!(pool.is_empty());
}

#[test]
fn pool_get_mut_updates_in_place() {
    let mut pool: ComponentPool<u32> = ComponentPool::with_capacity(8);
    pool.add(1, 41);
    *pool.get_mut(1).unwrap() += 1;
    assert_eq!(pool.get(1), Some(&42));
}

#[test]
#[should_panic(expected = "null entity slot")]
fn pool_add_to_null_slot_panics() {
    let mut pool: ComponentPool<u32> = ComponentPool::with_capacity(8);
    pool.add(0, 7);
}

#[test]
#[should_panic(expected = "cannot add the same component twice")]
fn pool_duplicate_add_panics() {
    let mut pool: ComponentPool<u32> = ComponentPool::with_capacity(8);
    pool.add(2, 1);
    pool.add(2, 2);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn pool_add_beyond_capacity_panics() {
    let mut pool: ComponentPool<u32> = ComponentPool::with_capacity(8);
    pool.add(9, 1);
}

#[test]
#[should_panic(expected = "cannot remove a non-existent component")]
fn pool_remove_absent_panics() {
    let mut pool: ComponentPool<u32> = ComponentPool::with_capacity(8);
    pool.remove(5);
}

#[test]
fn pool_iteration_skips_gaps() {
    let mut pool: ComponentPool<u32> = ComponentPool::with_capacity(16);
    for slot in 1..=6 {
        pool.add(slot, slot * 10);
    }
    pool.remove(2);
    pool.remove(5);

    // 6 adds and 2 removes leave exactly 4 distinct slots, in order.
    let present: Vec<u32> = pool.slots().collect();
    assert_eq!(present, vec![1, 3, 4, 6]);
    for slot in present {
        assert!(pool.has(slot));
    }
    assert_eq!(pool.len(), 4);

    let values: Vec<(u32, u32)> = pool.iter().map(|(slot, v)| (slot, *v)).collect();
    assert_eq!(values, vec![(1, 10), (3, 30), (4, 40), (6, 60)]);
}

#[test]
fn pool_empty_iteration_is_immediately_exhausted() {
    let pool: ComponentPool<u32> = ComponentPool::with_capacity(16);
    assert_eq!(pool.slots().next(), None);
    assert_eq!(pool.iter().next(), None);
}

#[test]
fn pool_cursors_are_independent() {
    let mut pool: ComponentPool<u32> = ComponentPool::with_capacity(16);
    pool.add(1, 1);
    pool.add(4, 4);
    pool.add(9, 9);

    let mut first = pool.slots();
    let mut second = pool.slots();
    assert_eq!(first.next(), Some(1));
    assert_eq!(first.next(), Some(4));
    // The second cursor starts from the beginning regardless of the first.
    assert_eq!(second.next(), Some(1));
    assert_eq!(first.next(), Some(9));
    assert_eq!(second.next(), Some(4));
}

#[test]
fn pool_iter_mut_updates_every_present_slot() {
    let mut pool: ComponentPool<u32> = ComponentPool::with_capacity(16);
    pool.add(2, 1);
    pool.add(7, 1);
    for (_, value) in pool.iter_mut() {
        *value += 1;
    }
    assert_eq!(pool.get(2), Some(&2));
    assert_eq!(pool.get(7), Some(&2));
}

/// Increments a shared counter when dropped, to account for teardown.
struct Droppable(Arc<AtomicUsize>);

impl Drop for Droppable {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn pool_drops_live_components_exactly_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    {
        let mut pool: ComponentPool<Droppable> = ComponentPool::with_capacity(16);
        pool.add(1, Droppable(drops.clone()));
        pool.add(2, Droppable(drops.clone()));
        pool.add(3, Droppable(drops.clone()));
        pool.remove(2);
        assert_eq!(drops.load(Ordering::SeqCst), 1, "explicit remove drops");
    }
    // Pool teardown must drop the two remaining components, and nothing else.
    assert_eq!(drops.load(Ordering::SeqCst), 3);
}

// --- SHAPE CACHE ---

#[test]
fn cache_deduplicates_identical_descriptors() {
    let mut cache = ShapeCache::new();
    let first = cache.acquire(1, CollisionShape::Sphere(1.0));
    let second = cache.acquire(2, CollisionShape::Sphere(1.0));

    assert!(ShapeHandle::ptr_eq(&first, &second));
    assert_eq!(cache.unique_shapes(), 1);
    assert_eq!(cache.dependents_of(1), Some(2));
}

#[test]
fn cache_distinguishes_near_equal_shapes() {
    let mut cache = ShapeCache::new();
    let a = cache.acquire(1, CollisionShape::Sphere(1.0));
    let b = cache.acquire(2, CollisionShape::Sphere(1.0 + f32::EPSILON));

    // Bit-exact keying: almost-equal radii are distinct resources.
    assert!(!ShapeHandle::ptr_eq(&a, &b));
    assert_eq!(cache.unique_shapes(), 2);
}

#[test]
fn cache_share_from_copies_the_reference() {
    let mut cache = ShapeCache::new();
    let first = cache.acquire(1, CollisionShape::Box(Vec3::ONE));
    let shared = cache.share_from(2, 1).expect("source has a shape");

    assert!(ShapeHandle::ptr_eq(&first, &shared));
    assert_eq!(cache.dependents_of(2), Some(2));
}

#[test]
fn cache_share_from_missing_source_is_none() {
    let mut cache = ShapeCache::new();
    assert!(cache.share_from(2, 1).is_none());
}

#[test]
fn cache_release_evicts_on_last_dependent() {
    let mut cache = ShapeCache::new();
    let stale = cache.acquire(1, CollisionShape::Sphere(2.5));
    cache.acquire(2, CollisionShape::Sphere(2.5));

    cache.release(1);
    assert_eq!(cache.unique_shapes(), 1, "one dependent left");
    cache.release(2);
    assert_eq!(cache.unique_shapes(), 0, "last release evicts");

    // A fresh acquire with identical parameters constructs a new resource.
    let fresh = cache.acquire(3, CollisionShape::Sphere(2.5));
    assert!(!ShapeHandle::ptr_eq(&stale, &fresh));
}

#[test]
#[should_panic(expected = "has no collision shape to release")]
fn cache_release_absent_panics() {
    let mut cache = ShapeCache::new();
    cache.release(1);
}

#[test]
#[should_panic(expected = "already references a collision shape")]
fn cache_double_acquire_same_slot_panics() {
    let mut cache = ShapeCache::new();
    cache.acquire(1, CollisionShape::Sphere(1.0));
    cache.acquire(1, CollisionShape::Sphere(2.0));
}

// --- WORLD / ORCHESTRATOR ---

#[test]
fn world_composes_a_full_entity() {
    // --- SETUP ---
    let (mut world, state) = scripted_world(64);
    let entity = world.create_entity();

    // --- ACTION ---
    world.add_kinematic_state(entity, Transform::from_translation(Vec3::new(0.0, 10.0, 0.0)));
    world.set_box_collider(entity, Vec3::new(2.0, 1.0, 2.0));
    world.add_rigid_body(entity, 1.0, 0.0);
    world.add_tag(entity, "crate");

    // --- ASSERTIONS ---
    assert!(world.has_kinematic_state(entity));
    assert!(world.has_collider(entity));
    assert!(world.has_rigid_body(entity));
    assert_eq!(world.tag(entity), Some("crate"));
    assert_eq!(
        state.lock().unwrap().registered.len(),
        1,
        "the body is registered with the engine exactly once"
    );

    let body = world.rigid_body(entity).unwrap();
    assert_eq!(body.mass, 1.0);
    assert!(!body.is_static());
}

#[test]
#[should_panic(expected = "without a kinematic state and a collider")]
fn world_rejects_body_without_collider() {
    let (mut world, _) = scripted_world(8);
    let entity = world.create_entity();
    world.add_kinematic_state(entity, Transform::IDENTITY);
    world.add_rigid_body(entity, 1.0, 0.0);
}

#[test]
#[should_panic(expected = "without a kinematic state and a collider")]
fn world_rejects_body_without_kinematic_state() {
    let (mut world, _) = scripted_world(8);
    let entity = world.create_entity();
    world.set_sphere_collider(entity, 1.0);
    world.add_rigid_body(entity, 1.0, 0.0);
}

#[test]
#[should_panic(expected = "while its rigid body exists")]
fn world_rejects_kinematic_detach_under_a_body() {
    let (mut world, _) = scripted_world(8);
    let entity = world.create_entity();
    world.add_kinematic_state(entity, Transform::IDENTITY);
    world.set_sphere_collider(entity, 1.0);
    world.add_rigid_body(entity, 1.0, 0.0);
    world.remove_kinematic_state(entity);
}

#[test]
#[should_panic(expected = "while its rigid body exists")]
fn world_rejects_collider_detach_under_a_body() {
    let (mut world, _) = scripted_world(8);
    let entity = world.create_entity();
    world.add_kinematic_state(entity, Transform::IDENTITY);
    world.set_sphere_collider(entity, 1.0);
    world.add_rigid_body(entity, 1.0, 0.0);
    world.remove_collider(entity);
}

#[test]
#[should_panic(expected = "cannot add the same component twice")]
fn world_rejects_duplicate_kinematic_state() {
    let (mut world, _) = scripted_world(8);
    let entity = world.create_entity();
    world.add_kinematic_state(entity, Transform::IDENTITY);
    world.add_kinematic_state(entity, Transform::IDENTITY);
}

#[test]
fn world_detach_order_allows_full_unwind() {
    let (mut world, state) = scripted_world(8);
    let entity = world.create_entity();
    world.add_kinematic_state(entity, Transform::IDENTITY);
    world.set_sphere_collider(entity, 1.0);
    world.add_rigid_body(entity, 2.0, 0.5);

    // Body first, then the parts it depended on.
    world.remove_rigid_body(entity);
    world.remove_collider(entity);
    world.remove_kinematic_state(entity);

    assert!(!world.has_rigid_body(entity));
    assert!(!world.has_collider(entity));
    assert!(!world.has_kinematic_state(entity));
    assert_eq!(state.lock().unwrap().unregistered.len(), 1);
}

#[test]
fn world_destroy_leaves_no_residue() {
    // --- SETUP ---
    let (mut world, state) = scripted_world(64);
    let entity = world.create_entity();
    world.add_kinematic_state(entity, Transform::from_translation(Vec3::Y * 5.0));
    world.set_box_collider(entity, Vec3::ONE);
    world.add_rigid_body(entity, 1.0, 0.0);
    world.add_tag(entity, "doomed");

    // --- ACTION ---
    world.destroy_entity(entity);

    // --- ASSERTIONS ---
    // The stores themselves are empty, not merely hidden behind a dead id.
    assert!(world.rigid_bodies().is_empty());
    assert!(world.kinematic_states().is_empty());
    assert!(world.tags().is_empty());
    assert_eq!(world.shape_cache().unique_shapes(), 0);
    assert_eq!(world.live_entities(), 0);

    let state = state.lock().unwrap();
    assert_eq!(state.registered.len(), 1);
    assert_eq!(
        state.unregistered, state.registered,
        "every registered body was unregistered exactly once"
    );

    // The slot returns to the reuse pool with a bumped generation.
    drop(state);
    let reborn = world.create_entity();
    assert_eq!(reborn.slot, entity.slot);
    assert_eq!(reborn.generation, entity.generation + 1);
    assert!(!world.has_kinematic_state(reborn));
    assert!(!world.has_collider(reborn));
    assert!(!world.has_rigid_body(reborn));
    assert!(!world.has_tag(reborn));
}

#[test]
#[should_panic(expected = "is stale or was destroyed")]
fn world_rejects_mutation_through_a_stale_handle() {
    let (mut world, _) = scripted_world(8);
    let stale = world.create_entity();
    world.destroy_entity(stale);
    // The slot is recycled by a different entity...
    let _current = world.create_entity();
    // ...so the old handle must not be able to touch it.
    world.add_tag(stale, "impostor");
}

#[test]
fn world_stale_handle_reads_as_absent() {
    let (mut world, _) = scripted_world(8);
    let stale = world.create_entity();
    world.add_kinematic_state(stale, Transform::IDENTITY);
    world.destroy_entity(stale);
    let current = world.create_entity();
    world.add_kinematic_state(current, Transform::IDENTITY);

    // Reads through the stale copy see nothing, not the new occupant.
    assert!(!world.is_live(stale));
    assert!(world.kinematic_state(stale).is_none());
    assert!(!world.has_kinematic_state(stale));
    assert!(world.has_kinematic_state(current));
}

#[test]
fn world_shares_shapes_between_entities() {
    let (mut world, _) = scripted_world(8);
    let a = world.create_entity();
    let b = world.create_entity();
    let c = world.create_entity();

    world.set_capsule_collider(a, 0.5, 2.0);
    let shared = world.set_collider_from(b, a);
    assert!(shared.is_some());
    assert_eq!(world.shape_cache().unique_shapes(), 1);
    assert_eq!(world.shape_cache().dependents_of(a.slot), Some(2));

    // Sharing from an entity without a collider is a normal miss.
    assert!(world.set_collider_from(c, c).is_none());
}

#[test]
fn world_step_writes_poses_back() {
    let (mut world, state) = scripted_world(8);
    let entity = world.create_entity();
    world.add_kinematic_state(entity, Transform::from_translation(Vec3::Y * 10.0));
    world.set_sphere_collider(entity, 1.0);
    world.add_rigid_body(entity, 1.0, 0.0);

    for _ in 0..3 {
        world.step_simulation(1.0, 1, 1.0);
    }

    // The scripted provider sinks bodies by dt per advance; the kinematic
    // state must reflect the integrated pose without any extra sync call.
    let y = world.kinematic_state(entity).unwrap().transform.translation.y;
    assert_eq!(y, 7.0);
    assert_eq!(state.lock().unwrap().advances, vec![(1.0, 1, 1.0); 3]);
}

#[test]
fn world_gravity_passthrough() {
    let (mut world, _) = scripted_world(8);
    let gravity = Vec3::new(0.0, -3.7, 0.0);
    world.set_gravity(gravity);
    assert_eq!(world.gravity(), gravity);
}

#[test]
#[should_panic(expected = "too many entities created")]
fn world_capacity_is_enforced() {
    let (mut world, _) = scripted_world(1);
    world.create_entity();
    world.create_entity();
}
