//! A FIFO experience replay buffer over named observation streams.
use super::{
    base::{advance, gather},
    config::MultimodalReplayBufferConfig,
    MultimodalBatch, StreamBatch,
};
use crate::error::ReachAvoidError;
use anyhow::Result;
use ndarray::{Array1, Array2, ArrayD, Axis, IxDyn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;

/// One step of one observation stream.
#[derive(Debug, Clone)]
pub enum StreamValue {
    /// Floating-point stream.
    Float(ArrayD<f32>),

    /// Byte-valued stream, used for image-like streams.
    Byte(ArrayD<u8>),
}

/// Per-stream ring storage. The dtype is fixed at construction from the
/// stream name: names containing `"rgb"` are byte-valued.
enum StreamStore {
    Float(ArrayD<f32>),
    Byte(ArrayD<u8>),
}

impl StreamStore {
    fn new(name: &str, capacity: usize, shape: &[usize]) -> Self {
        let mut full = Vec::with_capacity(shape.len() + 1);
        full.push(capacity);
        full.extend_from_slice(shape);
        if name.contains("rgb") {
            StreamStore::Byte(ArrayD::zeros(IxDyn(&full)))
        } else {
            StreamStore::Float(ArrayD::zeros(IxDyn(&full)))
        }
    }

    fn write(&mut self, ix: usize, value: &StreamValue) {
        match (self, value) {
            (StreamStore::Float(buf), StreamValue::Float(v)) => {
                buf.index_axis_mut(Axis(0), ix).assign(v)
            }
            (StreamStore::Byte(buf), StreamValue::Byte(v)) => {
                buf.index_axis_mut(Axis(0), ix).assign(v)
            }
            _ => panic!("stream value dtype does not match the stream store"),
        }
    }

    // Gathers rows and inserts the time-window axis of size 1.
    fn sample(&self, ixs: &[usize]) -> StreamBatch {
        match self {
            StreamStore::Float(buf) => {
                StreamBatch::Float(buf.select(Axis(0), ixs).insert_axis(Axis(1)))
            }
            StreamStore::Byte(buf) => {
                StreamBatch::Byte(buf.select(Axis(0), ixs).insert_axis(Axis(1)))
            }
        }
    }
}

/// A fixed-capacity FIFO replay buffer whose observations are mappings from
/// stream name to array.
///
/// Lifecycle and sampling contract are identical to
/// [`ReplayBuffer`](super::ReplayBuffer); each stream keeps its own dtype.
/// Sampled stream batches carry a leading time-window axis of size 1 so that
/// single-step batches share the tensor layout of multi-step windows. Only
/// single-step windows are supported.
pub struct MultimodalReplayBuffer {
    capacity: usize,
    start_offset: usize,
    ptr: usize,
    size: usize,
    obs: HashMap<String, StreamStore>,
    next_obs: HashMap<String, StreamStore>,
    act: Array2<f32>,
    reward: Vec<f32>,
    done: Vec<f32>,
    target_margin: Vec<f32>,
    safety_margin: Vec<f32>,
    rng: StdRng,
}

impl MultimodalReplayBuffer {
    /// Creates a buffer with one ring store per configured stream.
    pub fn build(config: &MultimodalReplayBufferConfig, act_dim: usize) -> Self {
        let capacity = config.capacity;
        let mut obs = HashMap::new();
        let mut next_obs = HashMap::new();
        for (name, shape) in config.observation_shapes.iter() {
            obs.insert(name.clone(), StreamStore::new(name, capacity, shape));
            next_obs.insert(name.clone(), StreamStore::new(name, capacity, shape));
        }

        Self {
            capacity,
            start_offset: config.start_offset,
            ptr: 0,
            size: 0,
            obs,
            next_obs,
            act: Array2::zeros((capacity, act_dim)),
            reward: vec![0.; capacity],
            done: vec![0.; capacity],
            target_margin: vec![0.; capacity],
            safety_margin: vec![0.; capacity],
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Returns the current number of stored transitions.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the buffer holds no transitions.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the maximum number of transitions the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stores a transition, overwriting the oldest entry once full.
    ///
    /// # Panics
    ///
    /// Panics if a configured stream is missing from `obs`/`next_obs` or if a
    /// stream value does not match the dtype or shape fixed at construction.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        obs: &HashMap<String, StreamValue>,
        act: &Array1<f32>,
        reward: f32,
        next_obs: &HashMap<String, StreamValue>,
        done: bool,
        target_margin: f32,
        safety_margin: f32,
    ) {
        for (name, store) in self.obs.iter_mut() {
            store.write(self.ptr, &obs[name]);
        }
        for (name, store) in self.next_obs.iter_mut() {
            store.write(self.ptr, &next_obs[name]);
        }
        self.act.row_mut(self.ptr).assign(act);
        self.reward[self.ptr] = reward;
        self.done[self.ptr] = done as u8 as f32;
        self.target_margin[self.ptr] = target_margin;
        self.safety_margin[self.ptr] = safety_margin;
        self.ptr = advance(self.ptr, self.start_offset, self.capacity);
        self.size = (self.size + 1).min(self.capacity);
    }

    /// Samples a batch uniformly with replacement.
    ///
    /// Every stream batch has shape `(batch, 1, ...step_shape)` and actions
    /// have shape `(batch, 1, act_dim)`.
    ///
    /// # Errors
    ///
    /// Fails with [`ReachAvoidError::EmptyBuffer`] if no transition has been
    /// stored yet.
    pub fn sample(&mut self, batch_size: usize) -> Result<MultimodalBatch> {
        if self.size == 0 {
            return Err(ReachAvoidError::EmptyBuffer.into());
        }
        let ixs = (0..batch_size)
            .map(|_| self.rng.gen_range(0..self.size))
            .collect::<Vec<_>>();

        let obs = self
            .obs
            .iter()
            .map(|(name, store)| (name.clone(), store.sample(&ixs)))
            .collect();
        let next_obs = self
            .next_obs
            .iter()
            .map(|(name, store)| (name.clone(), store.sample(&ixs)))
            .collect();

        Ok(MultimodalBatch {
            obs,
            next_obs,
            act: self.act.select(Axis(0), &ixs).insert_axis(Axis(1)),
            reward: gather(&self.reward, &ixs),
            done: gather(&self.done, &ixs),
            target_margin: gather(&self.target_margin, &ixs),
            safety_margin: gather(&self.safety_margin, &ixs),
        })
    }

    /// Lifts a single raw observation map to a `(1, 1, ...step_shape)` batch,
    /// the shape expected when acting on one observation.
    pub fn batch_from_obs(
        obs: &HashMap<String, StreamValue>,
    ) -> HashMap<String, StreamBatch> {
        obs.iter()
            .map(|(name, value)| {
                let batch = match value {
                    StreamValue::Float(v) => StreamBatch::Float(
                        v.clone().insert_axis(Axis(0)).insert_axis(Axis(0)),
                    ),
                    StreamValue::Byte(v) => StreamBatch::Byte(
                        v.clone().insert_axis(Axis(0)).insert_axis(Axis(0)),
                    ),
                };
                (name.clone(), batch)
            })
            .collect()
    }
}
