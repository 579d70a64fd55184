//! Batches of sampled transitions.
use ndarray::{Array1, Array2, Array3, ArrayD};
use std::collections::HashMap;

/// A batch of transitions sampled from a [`ReplayBuffer`](super::ReplayBuffer).
///
/// All fields are parallel along the leading batch axis. `done` is stored as
/// `f32` so the batch can be consumed directly by TD backup rules.
#[derive(Debug)]
pub struct TransitionBatch {
    /// Observations, shape `(batch, obs_dim)`.
    pub obs: Array2<f32>,

    /// Actions, shape `(batch, act_dim)`.
    pub act: Array2<f32>,

    /// Rewards.
    pub reward: Array1<f32>,

    /// Next observations, shape `(batch, obs_dim)`.
    pub next_obs: Array2<f32>,

    /// Termination flags, `1.0` where the episode ended.
    pub done: Array1<f32>,

    /// Target margins `l(x)`.
    pub target_margin: Array1<f32>,

    /// Safety margins `g(x)`.
    pub safety_margin: Array1<f32>,
}

impl TransitionBatch {
    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}

/// A sampled batch of one observation stream.
///
/// Shapes are `(batch, window, ...step_shape)`; the window axis currently
/// always has size 1 so that single-step batches share the tensor layout of
/// multi-step windows.
#[derive(Debug)]
pub enum StreamBatch {
    /// Floating-point stream.
    Float(ArrayD<f32>),

    /// Byte-valued stream, used for image-like streams.
    Byte(ArrayD<u8>),
}

impl StreamBatch {
    /// Shape of the batch, `(batch, window, ...step_shape)`.
    pub fn shape(&self) -> &[usize] {
        match self {
            StreamBatch::Float(a) => a.shape(),
            StreamBatch::Byte(a) => a.shape(),
        }
    }
}

/// A batch of transitions sampled from a
/// [`MultimodalReplayBuffer`](super::MultimodalReplayBuffer).
#[derive(Debug)]
pub struct MultimodalBatch {
    /// Observation streams, each of shape `(batch, 1, ...step_shape)`.
    pub obs: HashMap<String, StreamBatch>,

    /// Next-observation streams, each of shape `(batch, 1, ...step_shape)`.
    pub next_obs: HashMap<String, StreamBatch>,

    /// Actions, shape `(batch, 1, act_dim)`.
    pub act: Array3<f32>,

    /// Rewards.
    pub reward: Array1<f32>,

    /// Termination flags, `1.0` where the episode ended.
    pub done: Array1<f32>,

    /// Target margins `l(x)`.
    pub target_margin: Array1<f32>,

    /// Safety margins `g(x)`.
    pub safety_margin: Array1<f32>,
}

impl MultimodalBatch {
    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}
