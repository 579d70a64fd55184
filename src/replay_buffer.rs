//! Fixed-capacity transition buffers with uniform sampling.
mod base;
mod batch;
mod config;
mod multimodal;
pub use base::{ReplayBuffer, Transition};
pub use batch::{MultimodalBatch, StreamBatch, TransitionBatch};
pub use config::{MultimodalReplayBufferConfig, ReplayBufferConfig};
pub use multimodal::{MultimodalReplayBuffer, StreamValue};
