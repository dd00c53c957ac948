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

//! # Physics Abstractions
//!
//! Universal traits and types for physics simulation providers.
//!
//! The storage layer never integrates motion or resolves collisions itself;
//! it hands body descriptors to a [`PhysicsProvider`] and reads authoritative
//! poses back after each step. Everything a provider needs to know about a
//! body is captured in [`RigidBodyDesc`].

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::math::{Transform, Vec3};

/// Opaque handle to a rigid body registered with a physics provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct BodyHandle(pub u64);

/// Supported collision shapes, described by their exact parameters.
///
/// Shapes are immutable values: once constructed they are shared between
/// every entity that requests identical parameters, so none of the variants
/// carries per-entity state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    /// Box with half-extents along each axis.
    Box(Vec3),
    /// Y-axis cylinder with half-extents (`x` is the radius, `y` the half-height).
    Cylinder(Vec3),
    /// Sphere with a radius.
    Sphere(f32),
    /// Y-axis capsule with a radius and the full height of its cylindrical section.
    Capsule(f32, f32),
}

impl CollisionShape {
    /// Computes the principal local inertia of the shape for the given mass.
    ///
    /// A zero mass denotes a static body and yields a zero inertia vector.
    /// Cylinders and capsules use the box approximation over their bounding
    /// half-extents.
    pub fn local_inertia(&self, mass: f32) -> Vec3 {
        if mass == 0.0 {
            return Vec3::ZERO;
        }
        match *self {
            CollisionShape::Box(half) => box_inertia(mass, half),
            CollisionShape::Cylinder(half) => box_inertia(mass, half),
            CollisionShape::Sphere(radius) => {
                let elem = 0.4 * mass * radius * radius;
                Vec3::splat(elem)
            }
            CollisionShape::Capsule(radius, height) => {
                let half = Vec3::new(radius, radius + height * 0.5, radius);
                box_inertia(mass, half)
            }
        }
    }
}

fn box_inertia(mass: f32, half: Vec3) -> Vec3 {
    let lx = 2.0 * half.x;
    let ly = 2.0 * half.y;
    let lz = 2.0 * half.z;
    let twelfth = mass / 12.0;
    Vec3::new(
        twelfth * (ly * ly + lz * lz),
        twelfth * (lx * lx + lz * lz),
        twelfth * (lx * lx + ly * ly),
    )
}

/// Description for registering a rigid body with a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    /// Initial world pose, read from the body's kinematic state at
    /// registration time.
    pub transform: Transform,
    /// Mass of the body in kg. A mass of `0.0` denotes a static body.
    pub mass: f32,
    /// Coefficient of restitution (bounciness) in `[0.0, 1.0]`.
    pub restitution: f32,
    /// The body's collision shape.
    pub shape: CollisionShape,
    /// Principal local inertia, derived from the shape and mass.
    pub local_inertia: Vec3,
}

/// Interface contract for any physics engine implementation (e.g., Rapier).
///
/// Providers own all broad-phase/narrow-phase and solver state; callers own
/// the component data. A handle returned by [`register_body`] stays valid
/// until the matching [`unregister_body`] call, after which the provider
/// must not retain any reference derived from the descriptor.
///
/// [`register_body`]: PhysicsProvider::register_body
/// [`unregister_body`]: PhysicsProvider::unregister_body
pub trait PhysicsProvider: Send + Sync {
    /// Advances the simulation, splitting `dt` into at most `max_substeps`
    /// fixed substeps of `fixed_dt` seconds each. Passing `0` for
    /// `max_substeps` performs a single variable step of `dt`.
    fn advance(&mut self, dt: f32, max_substeps: u32, fixed_dt: f32);

    /// Sets the global gravity vector.
    fn set_gravity(&mut self, gravity: Vec3);

    /// Returns the global gravity vector.
    fn gravity(&self) -> Vec3;

    /// Registers a rigid body described by `desc` and returns its handle.
    fn register_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle;

    /// Removes a rigid body (and any collision state derived from it) from
    /// the simulation.
    fn unregister_body(&mut self, handle: BodyHandle);

    /// Returns the current world pose of a registered body, or `None` for a
    /// handle the provider does not know.
    fn body_transform(&self, handle: BodyHandle) -> Option<Transform>;

    /// Manually sets the world pose of a registered body.
    fn set_body_transform(&mut self, handle: BodyHandle, transform: Transform);
}
