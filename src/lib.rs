#![warn(missing_docs)]
//! A library for reach-avoid reinforcement learning.
//!
//! The crate provides the data model of a reach-avoid training loop:
//! margin-based cost shaping ([`CostShaper`]), selectable termination
//! semantics ([`TerminationPolicy`]), fixed-capacity transition buffers with
//! uniform sampling ([`ReplayBuffer`], [`MultimodalReplayBuffer`]), bounded
//! retention of the best checkpoints ([`TopKTracker`]) and checkpoint
//! persistence ([`CheckpointWriter`]).
//!
//! Environments plug in through capability traits:
//! [`Margins`] exposes the target margin `l(x)` (negative inside the goal
//! set) and the safety margin `g(x)` (positive when a constraint is
//! violated), while [`SafetyChecks`] exposes the success/failure predicates
//! consumed by [`TerminationPolicy`].
//!
//! All structures are single-threaded and owned by the training loop; there
//! is no internal locking. Randomness is threaded explicitly through seeded
//! generators in the configurations rather than process-global state.
//!
//! [`CostShaper`]: cost::CostShaper
//! [`TerminationPolicy`]: termination::TerminationPolicy
//! [`ReplayBuffer`]: replay_buffer::ReplayBuffer
//! [`MultimodalReplayBuffer`]: replay_buffer::MultimodalReplayBuffer
//! [`TopKTracker`]: tracker::TopKTracker
//! [`CheckpointWriter`]: checkpoint::CheckpointWriter
pub mod checkpoint;
pub mod constraint;
pub mod cost;
pub mod error;
pub mod point_mass;
pub mod replay_buffer;
pub mod termination;
pub mod tracker;
pub mod util;

mod base;
pub use base::{Margins, SafeEnv, SafetyChecks, Step};
