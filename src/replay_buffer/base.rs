//! A FIFO experience replay buffer over flat observation vectors.
use super::{config::ReplayBufferConfig, TransitionBatch};
use crate::error::ReachAvoidError;
use anyhow::Result;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A single reach-avoid transition.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Observation before the step.
    pub obs: Array1<f32>,

    /// Action taken.
    pub act: Array1<f32>,

    /// Shaped reward.
    pub reward: f32,

    /// Observation after the step.
    pub next_obs: Array1<f32>,

    /// Whether the episode ended at this step.
    pub done: bool,

    /// Target margin `l(x)`, negative inside the goal region.
    pub target_margin: f32,

    /// Safety margin `g(x)`, positive when unsafe.
    pub safety_margin: f32,
}

/// A fixed-capacity FIFO replay buffer with uniform sampling.
///
/// Transitions are stored as parallel preallocated arrays. [`Self::store`] is
/// O(1) and never fails; once the buffer is full the oldest entry in the
/// wrapping region is overwritten. [`Self::sample`] draws indices uniformly
/// with replacement, which is an explicit simplicity choice — there is no
/// prioritization and no deduplication.
///
/// The buffer assumes a single writer; callers that parallelize environment
/// stepping must serialize calls to [`Self::store`] externally.
pub struct ReplayBuffer {
    capacity: usize,
    start_offset: usize,
    ptr: usize,
    size: usize,
    obs: Array2<f32>,
    act: Array2<f32>,
    next_obs: Array2<f32>,
    reward: Vec<f32>,
    done: Vec<f32>,
    target_margin: Vec<f32>,
    safety_margin: Vec<f32>,
    rng: StdRng,
}

impl ReplayBuffer {
    /// Creates a replay buffer for the given observation and action widths.
    pub fn build(config: &ReplayBufferConfig, obs_dim: usize, act_dim: usize) -> Self {
        let capacity = config.capacity;
        Self {
            capacity,
            start_offset: config.start_offset,
            ptr: 0,
            size: 0,
            obs: Array2::zeros((capacity, obs_dim)),
            act: Array2::zeros((capacity, act_dim)),
            next_obs: Array2::zeros((capacity, obs_dim)),
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
    pub fn store(&mut self, tr: &Transition) {
        self.obs.row_mut(self.ptr).assign(&tr.obs);
        self.act.row_mut(self.ptr).assign(&tr.act);
        self.next_obs.row_mut(self.ptr).assign(&tr.next_obs);
        self.reward[self.ptr] = tr.reward;
        self.done[self.ptr] = tr.done as u8 as f32;
        self.target_margin[self.ptr] = tr.target_margin;
        self.safety_margin[self.ptr] = tr.safety_margin;
        self.ptr = advance(self.ptr, self.start_offset, self.capacity);
        self.size = (self.size + 1).min(self.capacity);
    }

    /// Samples a batch of transitions uniformly with replacement.
    ///
    /// # Errors
    ///
    /// Fails with [`ReachAvoidError::EmptyBuffer`] if no transition has been
    /// stored yet.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch> {
        if self.size == 0 {
            return Err(ReachAvoidError::EmptyBuffer.into());
        }
        let ixs = (0..batch_size)
            .map(|_| self.rng.gen_range(0..self.size))
            .collect::<Vec<_>>();

        Ok(TransitionBatch {
            obs: self.obs.select(Axis(0), &ixs),
            act: self.act.select(Axis(0), &ixs),
            reward: gather(&self.reward, &ixs),
            next_obs: self.next_obs.select(Axis(0), &ixs),
            done: gather(&self.done, &ixs),
            target_margin: gather(&self.target_margin, &ixs),
            safety_margin: gather(&self.safety_margin, &ixs),
        })
    }

    /// Observation stored at the given ring index.
    pub fn obs_at(&self, ix: usize) -> ArrayView1<'_, f32> {
        self.obs.row(ix)
    }
}

// Wraps within [start, capacity); entries below start are never revisited.
pub(super) fn advance(ptr: usize, start: usize, capacity: usize) -> usize {
    if ptr + 1 < start {
        ptr + 1
    } else {
        start + (ptr + 1 - start) % (capacity - start)
    }
}

pub(super) fn gather(buf: &[f32], ixs: &[usize]) -> Array1<f32> {
    ixs.iter().map(|&ix| buf[ix]).collect()
}
