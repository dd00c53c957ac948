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

//! Rigid transforms (world poses) for simulated bodies.

use serde::{Deserialize, Serialize};

use super::{Quaternion, Vec3};

/// A rigid transform: a rotation followed by a translation.
///
/// This is the world-pose record a kinematic-state component owns and the
/// physics provider integrates. Unlike a full affine transform it carries no
/// scale, which keeps it closed under composition for rigid bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// The world-space position.
    pub translation: Vec3,
    /// The world-space orientation.
    pub rotation: Quaternion,
}

impl Transform {
    /// The identity transform, which results in no change.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quaternion::IDENTITY,
    };

    /// Creates a transform from a translation and a rotation.
    #[inline]
    pub const fn from_parts(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Creates a transform from a translation, with no rotation.
    #[inline]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quaternion::IDENTITY,
        }
    }

    /// Transforms a point from local space into world space.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.rotate(point) + self.translation
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
