// Bounded sample queue between the decode thread and a device callback

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Duration;

/// Bounded FIFO of interleaved samples
///
/// The producer blocks (with a timeout) while the queue is full; the consumer
/// never blocks and zero-fills what it cannot read.
pub struct SampleQueue {
    samples: Mutex<VecDeque<f32>>,
    space: Condvar,
    capacity: usize,
}

impl SampleQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            space: Condvar::new(),
            capacity,
        }
    }

    /// Push as many samples as fit, waiting up to `wait` for room.
    pub fn push(&self, data: &[f32], wait: Duration) -> usize {
        self.push_aligned(data, 1, wait)
    }

    /// Like [`push`](Self::push), but only accepts whole groups of `align` samples.
    pub fn push_aligned(&self, data: &[f32], align: usize, wait: Duration) -> usize {
        let align = align.max(1);
        let mut samples = self.samples.lock();
        if self.capacity - samples.len().min(self.capacity) < align.min(data.len()) {
            self.space.wait_for(&mut samples, wait);
        }
        let free = self.capacity - samples.len().min(self.capacity);
        let fits = data.len().min(free);
        let accepted = fits - fits % align;
        samples.extend(&data[..accepted]);
        accepted
    }

    /// Fill `output` from the queue, padding with silence. Returns samples read.
    pub fn pop_into(&self, output: &mut [f32]) -> usize {
        let mut samples = self.samples.lock();
        let read = output.len().min(samples.len());
        for (slot, sample) in output.iter_mut().zip(samples.drain(..read)) {
            *slot = sample;
        }
        drop(samples);

        output[read..].fill(0.0);
        if read > 0 {
            self.space.notify_one();
        }
        read
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn clear(&self) {
        self.samples.lock().clear();
        self.space.notify_all();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
