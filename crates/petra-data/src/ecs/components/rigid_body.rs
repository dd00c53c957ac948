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

use petra_core::physics::BodyHandle;
use serde::{Deserialize, Serialize};

/// Component representing a rigid body in the physics simulation.
///
/// It exists only while the entity also has a kinematic state and a
/// collider; the orchestrator enforces that ordering on attach and detach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    /// Opaque handle issued by the physics provider at registration.
    pub handle: BodyHandle,
    /// Mass of the body in kilograms. `0.0` denotes a static body.
    pub mass: f32,
    /// Coefficient of restitution (bounciness).
    pub restitution: f32,
}

impl RigidBody {
    /// Returns `true` if the body is static (zero mass).
    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }
}
