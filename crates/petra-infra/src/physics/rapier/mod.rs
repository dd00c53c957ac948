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

//! Rapier implementation of the physics provider.

use std::collections::HashMap;

use petra_core::math::{Transform, Vec3};
use petra_core::physics::{BodyHandle, CollisionShape, PhysicsProvider, RigidBodyDesc};
use rapier3d::prelude::*;

mod conversions;

use conversions::{from_rapier_quat, from_rapier_vec, to_rapier_quat, to_rapier_vec};

/// Implementation of the `PhysicsProvider` trait using the Rapier3D physics
/// engine.
///
/// Registered bodies are tracked in a private map from the opaque
/// [`BodyHandle`]s we issue to Rapier's own generational handles, so a
/// caller's handle stays stable no matter what Rapier does internally.
/// Stepping follows fixed-substep semantics: wall-clock time accumulates
/// and is consumed in whole `fixed_dt` slices, at most `max_substeps` per
/// call.
pub struct RapierPhysicsProvider {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    bodies: HashMap<u64, rapier3d::dynamics::RigidBodyHandle>,
    next_body_id: u64,
    accumulator: f32,
}

impl Default for RapierPhysicsProvider {
    fn default() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: HashMap::new(),
            next_body_id: 0,
            accumulator: 0.0,
        }
    }
}

impl RapierPhysicsProvider {
    /// Creates a provider with default parameters and standard gravity.
    pub fn new() -> Self {
        Self::default()
    }

    fn step_once(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}

impl PhysicsProvider for RapierPhysicsProvider {
    fn advance(&mut self, dt: f32, max_substeps: u32, fixed_dt: f32) {
        if max_substeps == 0 {
            // Variable-length stepping: consume dt in one slice.
            self.integration_parameters.dt = dt;
            self.step_once();
            return;
        }

        self.accumulator += dt;
        let pending = (self.accumulator / fixed_dt) as u32;
        if pending == 0 {
            return;
        }
        self.accumulator -= pending as f32 * fixed_dt;
        if pending > max_substeps {
            log::warn!(
                "dropping {} physics substep(s); dt outran the substep budget",
                pending - max_substeps
            );
        }

        self.integration_parameters.dt = fixed_dt;
        for _ in 0..pending.min(max_substeps) {
            self.step_once();
        }
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_rapier_vec(gravity);
    }

    fn gravity(&self) -> Vec3 {
        from_rapier_vec(self.gravity)
    }

    fn register_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle {
        // A zero mass denotes a static body, which needs no mass properties.
        let builder = if desc.mass == 0.0 {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic().additional_mass_properties(MassProperties::new(
                rapier3d::na::Point3::origin(),
                desc.mass,
                to_rapier_vec(desc.local_inertia),
            ))
        };
        let body = builder
            .translation(to_rapier_vec(desc.transform.translation))
            .rotation(to_rapier_quat(desc.transform.rotation).scaled_axis())
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        let shape = match desc.shape {
            CollisionShape::Box(half) => SharedShape::cuboid(half.x, half.y, half.z),
            CollisionShape::Cylinder(half) => SharedShape::cylinder(half.y, half.x),
            CollisionShape::Sphere(radius) => SharedShape::ball(radius),
            CollisionShape::Capsule(radius, height) => SharedShape::capsule_y(height * 0.5, radius),
        };
        // Zero density: the body's mass comes entirely from the descriptor.
        let collider = ColliderBuilder::new(shape)
            .restitution(desc.restitution)
            .density(0.0)
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        self.next_body_id += 1;
        let handle = BodyHandle(self.next_body_id);
        self.bodies.insert(handle.0, body_handle);
        handle
    }

    fn unregister_body(&mut self, handle: BodyHandle) {
        let Some(body_handle) = self.bodies.remove(&handle.0) else {
            log::warn!("ignoring unregister of unknown body {handle:?}");
            return;
        };
        self.rigid_body_set.remove(
            body_handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    fn body_transform(&self, handle: BodyHandle) -> Option<Transform> {
        let body_handle = self.bodies.get(&handle.0)?;
        let body = self.rigid_body_set.get(*body_handle)?;
        Some(Transform::from_parts(
            from_rapier_vec(*body.translation()),
            from_rapier_quat(*body.rotation()),
        ))
    }

    fn set_body_transform(&mut self, handle: BodyHandle, transform: Transform) {
        let Some(body_handle) = self.bodies.get(&handle.0) else {
            return;
        };
        if let Some(body) = self.rigid_body_set.get_mut(*body_handle) {
            body.set_translation(to_rapier_vec(transform.translation), true);
            body.set_rotation(to_rapier_quat(transform.rotation), true);
        }
    }
}
