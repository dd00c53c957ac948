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

//! Implements the fixed-size bitset used to track component presence.

/// A simple bitset wrapped around a `Vec<u64>`.
///
/// One bit per entity slot, sized once at construction. A set bit means the
/// corresponding pool cell holds a live, constructed component; pools consult
/// it before every construct/destroy so a cell is never dropped while absent
/// or written while present.
#[derive(Debug, Clone)]
pub struct PresenceBitset {
    bits: Vec<u64>,
}

impl PresenceBitset {
    /// Creates a bitset able to hold `nbits` flags, all cleared.
    pub fn with_capacity(nbits: u32) -> Self {
        let words = (nbits as usize).div_ceil(64).max(1);
        Self {
            bits: vec![0; words],
        }
    }

    /// Sets the bit at the specified index to 1.
    pub fn set(&mut self, index: u32) {
        let word_idx = (index / 64) as usize;
        let bit_idx = index % 64;
        self.bits[word_idx] |= 1 << bit_idx;
    }

    /// Clears the bit at the specified index to 0.
    pub fn clear(&mut self, index: u32) {
        let word_idx = (index / 64) as usize;
        let bit_idx = index % 64;
        if word_idx < self.bits.len() {
            self.bits[word_idx] &= !(1 << bit_idx);
        }
    }

    /// Returns true if the bit at the specified index is set.
    /// Out-of-range indices read as cleared.
    pub fn is_set(&self, index: u32) -> bool {
        let word_idx = (index / 64) as usize;
        let bit_idx = index % 64;
        if let Some(word) = self.bits.get(word_idx) {
            (word & (1 << bit_idx)) != 0
        } else {
            false
        }
    }
}
