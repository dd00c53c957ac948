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

//! Provides the mathematical primitives the storage layer traffics in.
//!
//! The simulation state of an entity is a rigid pose: a translation and a
//! rotation. This module contains the vector, quaternion, and transform
//! types that represent it, together with the small set of operations the
//! orchestrator and physics bridge need.
//!
//! All angular functions operate in **radians**.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

// --- Declare Sub-Modules ---

pub mod quaternion;
pub mod transform;
pub mod vector;

// --- Re-export Principal Types ---

pub use self::quaternion::Quaternion;
pub use self::transform::Transform;
pub use self::vector::Vec3;

/// Shorthand alias for [`Quaternion`].
pub type Quat = Quaternion;
