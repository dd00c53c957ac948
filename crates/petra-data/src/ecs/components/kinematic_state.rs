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

use petra_core::math::Transform;
use serde::{Deserialize, Serialize};

/// Component holding an entity's authoritative world pose.
///
/// The pose set here seeds the rigid body at registration time; after each
/// simulation step the orchestrator writes the provider's integrated pose
/// back, so reading this component always yields the current position and
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicState {
    /// Current world transform.
    pub transform: Transform,
}

impl KinematicState {
    /// Creates a kinematic state at the given pose.
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    /// Returns the current world transform.
    pub fn world_transform(&self) -> Transform {
        self.transform
    }

    /// Sets the world transform. For an entity with a registered rigid body
    /// this takes effect on the body only at (re-)registration; the provider
    /// owns the pose in between.
    pub fn set_world_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
}
