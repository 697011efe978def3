// curvegraph/renderer/src/staging.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CPU-side arrays that are uploaded to GPU buffers.

/// A growable array whose capacity is multiplied by a fixed factor whenever it fills up.
#[derive(Clone, Debug)]
pub struct StagingBuffer<T> where T: Copy {
    data: Vec<T>,
    growth_factor: f32,
}

impl<T> StagingBuffer<T> where T: Copy {
    pub fn new(initial_capacity: usize, growth_factor: f32) -> StagingBuffer<T> {
        StagingBuffer { data: Vec::with_capacity(initial_capacity), growth_factor }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn push(&mut self, value: T) {
        if self.data.len() == self.data.capacity() {
            self.grow_to(self.data.len() + 1);
        }
        self.data.push(value);
    }

    pub fn extend_from_slice(&mut self, values: &[T]) {
        let needed = self.data.len() + values.len();
        if needed > self.data.capacity() {
            self.grow_to(needed);
        }
        self.data.extend_from_slice(values);
    }

    /// Empties the buffer, keeping its capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear()
    }

    fn grow_to(&mut self, needed: usize) {
        let mut capacity = self.data.capacity().max(1);
        while capacity < needed {
            capacity = ((capacity as f32 * self.growth_factor).ceil() as usize).max(capacity + 1);
        }
        self.data.reserve_exact(capacity - self.data.len());
    }
}
