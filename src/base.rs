//! Core capability traits of reach-avoid environments.
use crate::termination::FailureMode;
use anyhow::Result;
use std::collections::HashMap;

/// Margin functions of a reach-avoid problem.
///
/// The target margin `l(x)` is negative inside the goal region; the safety
/// margin `g(x)` is positive when the state violates a constraint. These two
/// signals drive the cost shaping in [`CostShaper`](crate::cost::CostShaper).
pub trait Margins {
    /// Signed distance-like signal to the goal region, negative inside it.
    fn target_margin(&self, state: &[f32]) -> f32;

    /// Signed constraint signal, positive when the state is unsafe.
    fn safety_margin(&self, state: &[f32]) -> f32;
}

/// Success and failure predicates of a reach-avoid environment.
///
/// [`TerminationPolicy`](crate::termination::TerminationPolicy) orchestrates
/// these capabilities; it never decides success or failure on its own.
pub trait SafetyChecks {
    /// Whether the current state is inside the goal region.
    fn check_success(&self) -> bool;

    /// Whether the current state violates a safety constraint.
    fn check_failure(&self) -> bool;

    /// A stricter failure predicate, for termination kinds that must not
    /// trust the shaped margin signal (e.g. physical contact checks).
    fn check_real_failure(&self) -> bool;

    /// Whether the state has left the training region.
    fn check_out_of_bounds(&self, state: &[f32]) -> bool;
}

/// Represents a reach-avoid environment.
///
/// This replaces an abstract-base-class hierarchy with a capability trait:
/// concrete environments implement margins, checks, stepping and rendering,
/// and the policies in this crate only consume the capability they need.
pub trait SafeEnv: Margins + SafetyChecks {
    /// Configuration of the environment.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Clone;

    /// Action of the environment.
    type Act;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: u64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    fn step(&mut self, act: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Renders the current state. The default implementation does nothing.
    fn render(&mut self) -> Result<()> {
        Ok(())
    }

    /// Shapes of the named observation streams emitted by this environment.
    ///
    /// Used to construct a
    /// [`MultimodalReplayBuffer`](crate::replay_buffer::MultimodalReplayBuffer);
    /// stream names containing `"rgb"` are stored byte-valued.
    fn observation_shapes(&self) -> HashMap<String, Vec<usize>>;
}

/// An observation, reward and termination tuple emitted at every step.
///
/// Carries the raw margin signals next to the shaped reward so that the
/// transition pushed into a replay buffer keeps `l(x)` and `g(x)` for
/// margin-aware backup rules.
pub struct Step<E: SafeEnv> {
    /// Observation after the step.
    pub obs: E::Obs,

    /// Shaped reward (or cost, depending on the configured return type).
    pub reward: f32,

    /// Whether the episode ended at this step.
    pub done: bool,

    /// Target margin `l(x)` at the new state, possibly overridden by shaping.
    pub target_margin: f32,

    /// Safety margin `g(x)` at the new state, possibly overridden by shaping.
    pub safety_margin: f32,

    /// How the episode ended, if a termination kind that tags it was used.
    pub failure_mode: Option<FailureMode>,
}
