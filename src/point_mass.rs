//! A minimal reach-avoid environment on the plane.
//!
//! A point mass moves in an axis-aligned box with a rectangular goal region
//! and a rectangular obstacle. Margins come from the signed-distance helpers
//! in [`util`](crate::util). The environment is intentionally small; it is
//! the in-tree collaborator used to exercise the policies and buffers.
use crate::{
    base::{Margins, SafeEnv, SafetyChecks, Step},
    cost::{CostConfig, CostShaper},
    termination::{DoneKind, TerminationPolicy},
    util::{signed_dist_rect, signed_dist_rect_obstacle},
};
use anyhow::Result;
use ndarray::Array1;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration of [`PointMassEnv`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PointMassConfig {
    /// Lower corner of the training region.
    pub bounds_min: [f32; 2],
    /// Upper corner of the training region.
    pub bounds_max: [f32; 2],
    /// Lower corner of the goal region.
    pub goal_min: [f32; 2],
    /// Upper corner of the goal region.
    pub goal_max: [f32; 2],
    /// Lower corner of the obstacle.
    pub obstacle_min: [f32; 2],
    /// Upper corner of the obstacle.
    pub obstacle_max: [f32; 2],
    /// Maximum displacement per step along each axis.
    pub step_size: f32,
    /// Uniform jitter applied to the start position at reset.
    pub reset_jitter: f32,
    /// Cost shaping configuration.
    pub cost: CostConfig,
    /// Termination semantics.
    pub done_kind: DoneKind,
}

impl Default for PointMassConfig {
    fn default() -> Self {
        Self {
            bounds_min: [-2.0, -2.0],
            bounds_max: [2.0, 2.0],
            goal_min: [0.9, 0.9],
            goal_max: [1.1, 1.1],
            obstacle_min: [-1.1, -1.1],
            obstacle_max: [-0.9, -0.9],
            step_size: 0.25,
            reset_jitter: 0.05,
            cost: CostConfig::default(),
            done_kind: DoneKind::All,
        }
    }
}

impl PointMassConfig {
    /// Sets the cost shaping configuration.
    pub fn cost(mut self, cost: CostConfig) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the termination semantics.
    pub fn done_kind(mut self, done_kind: DoneKind) -> Self {
        self.done_kind = done_kind;
        self
    }
}

/// A point mass in a box with a goal and an obstacle.
pub struct PointMassEnv {
    config: PointMassConfig,
    state: [f32; 2],
    shaper: CostShaper,
    termination: TerminationPolicy,
    rng: StdRng,
}

// Borrowed capability view, so the termination policy can consult the
// checks while being mutated itself.
struct PointMassView<'a> {
    config: &'a PointMassConfig,
    state: [f32; 2],
}

impl<'a> Margins for PointMassView<'a> {
    fn target_margin(&self, state: &[f32]) -> f32 {
        signed_dist_rect(state, &self.config.goal_min, &self.config.goal_max)
    }

    fn safety_margin(&self, state: &[f32]) -> f32 {
        signed_dist_rect_obstacle(state, &self.config.obstacle_min, &self.config.obstacle_max)
    }
}

impl<'a> SafetyChecks for PointMassView<'a> {
    fn check_success(&self) -> bool {
        self.target_margin(&self.state) < 0.0
    }

    fn check_failure(&self) -> bool {
        self.safety_margin(&self.state) > 0.0
    }

    // No separate contact model; the margin check is the real one here.
    fn check_real_failure(&self) -> bool {
        self.check_failure()
    }

    fn check_out_of_bounds(&self, state: &[f32]) -> bool {
        signed_dist_rect(state, &self.config.bounds_min, &self.config.bounds_max) > 0.0
    }
}

impl Margins for PointMassEnv {
    fn target_margin(&self, state: &[f32]) -> f32 {
        self.view().target_margin(state)
    }

    fn safety_margin(&self, state: &[f32]) -> f32 {
        self.view().safety_margin(state)
    }
}

impl SafetyChecks for PointMassEnv {
    fn check_success(&self) -> bool {
        self.view().check_success()
    }

    fn check_failure(&self) -> bool {
        self.view().check_failure()
    }

    fn check_real_failure(&self) -> bool {
        self.view().check_real_failure()
    }

    fn check_out_of_bounds(&self, state: &[f32]) -> bool {
        self.view().check_out_of_bounds(state)
    }
}

impl SafeEnv for PointMassEnv {
    type Config = PointMassConfig;
    type Obs = Array1<f32>;
    type Act = Array1<f32>;

    fn build(config: &Self::Config, seed: u64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            state: [0.0, 0.0],
            shaper: CostShaper::build(&config.cost),
            termination: TerminationPolicy::new(config.done_kind),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let j = self.config.reset_jitter;
        self.state = [
            self.rng.gen_range(-j..=j),
            self.rng.gen_range(-j..=j),
        ];
        self.termination.reset();
        Ok(Array1::from(self.state.to_vec()))
    }

    fn step(&mut self, act: &Self::Act) -> Result<Step<Self>> {
        let dx = act[0].clamp(-1.0, 1.0) * self.config.step_size;
        let dy = act[1].clamp(-1.0, 1.0) * self.config.step_size;
        self.state[0] += dx;
        self.state[1] += dy;

        let view = PointMassView {
            config: &self.config,
            state: self.state,
        };
        let success = view.check_success();
        let fail = view.check_failure();
        let l_x = view.target_margin(&self.state);
        let g_x = view.safety_margin(&self.state);
        let (reward, l_x, g_x) = self.shaper.apply_scalar(l_x, g_x, success, fail);
        let done = self
            .termination
            .evaluate(&view, &self.state, success, fail);

        Ok(Step {
            obs: Array1::from(self.state.to_vec()),
            reward,
            done,
            target_margin: l_x,
            safety_margin: g_x,
            failure_mode: self.termination.failure_mode(),
        })
    }

    fn observation_shapes(&self) -> HashMap<String, Vec<usize>> {
        let mut shapes = HashMap::new();
        shapes.insert("state".to_string(), vec![2]);
        shapes
    }
}

impl PointMassEnv {
    /// Current state of the point mass.
    pub fn state(&self) -> &[f32; 2] {
        &self.state
    }

    fn view(&self) -> PointMassView<'_> {
        PointMassView {
            config: &self.config,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::termination::FailureMode;

    fn run_until_done(env: &mut PointMassEnv, act: [f32; 2], max_steps: usize) -> Step<PointMassEnv> {
        let act = Array1::from(act.to_vec());
        for _ in 0..max_steps {
            let step = env.step(&act).unwrap();
            if step.done {
                return step;
            }
        }
        panic!("episode did not terminate");
    }

    #[test]
    fn test_reaches_goal() {
        let config = PointMassConfig::default();
        let mut env = PointMassEnv::build(&config, 0).unwrap();
        env.reset().unwrap();
        let step = run_until_done(&mut env, [1.0, 1.0], 20);
        assert_eq!(step.failure_mode, Some(FailureMode::Success));
        assert!(step.target_margin < 0.0);
    }

    #[test]
    fn test_hits_obstacle() {
        let config = PointMassConfig::default().done_kind(DoneKind::Tf);
        let mut env = PointMassEnv::build(&config, 0).unwrap();
        env.reset().unwrap();
        let step = run_until_done(&mut env, [-1.0, -1.0], 20);
        assert!(step.safety_margin > 0.0);
    }

    #[test]
    fn test_leaves_bounds() {
        let config = PointMassConfig::default().done_kind(DoneKind::ToEnd);
        let mut env = PointMassEnv::build(&config, 0).unwrap();
        env.reset().unwrap();
        // moving along x only passes beside the goal and the obstacle
        let step = run_until_done(&mut env, [1.0, 0.0], 20);
        assert!(env.check_out_of_bounds(&step.obs.to_vec()));
    }
}
