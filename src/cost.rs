//! Margin-based cost shaping.
//!
//! Maps the target margin `l(x)` and the safety margin `g(x)` of a batch of
//! transitions to a scalar cost per entry, optionally overriding the signal
//! at terminal entries with a fixed bonus or penalty. The override mutates
//! the margins in place; callers must treat the returned margins as
//! authoritative, not their inputs.
use crate::error::ReachAvoidError;
use anyhow::Result;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    str::FromStr,
};

/// How the margins are combined into a cost.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum CostKind {
    /// Cost is the target margin `l(x)`.
    #[serde(rename = "dense_ell")]
    DenseEll,

    /// Cost is `l(x) + g(x)`.
    #[serde(rename = "dense")]
    Dense,

    /// Cost is zero; the learner relies on terminal shaping only.
    #[serde(rename = "sparse")]
    Sparse,

    /// Cost is the elementwise `min(l(x), g(x))` in reward mode, `max` in
    /// cost mode. This is the reach-avoid backup signal.
    #[serde(rename = "max_ell_g")]
    MaxEllG,
}

impl FromStr for CostKind {
    type Err = ReachAvoidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dense_ell" => Ok(Self::DenseEll),
            "dense" => Ok(Self::Dense),
            "sparse" => Ok(Self::Sparse),
            "max_ell_g" => Ok(Self::MaxEllG),
            _ => Err(ReachAvoidError::InvalidConfiguration(format!(
                "unknown cost kind: {}",
                s
            ))),
        }
    }
}

/// Sign convention of the shaped signal.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    /// The agent maximizes the signal; bonuses are negative margins.
    Reward,

    /// The agent minimizes the signal.
    Cost,
}

/// Configuration of [`CostShaper`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CostConfig {
    /// How the margins are combined into a cost.
    pub cost_kind: CostKind,

    /// Sign convention of the shaped signal.
    pub return_type: ReturnType,

    /// If `true`, terminal entries are overridden with `reward`/`penalty`.
    pub shape_reward: bool,

    /// Bonus magnitude applied at successful entries.
    pub reward: f32,

    /// Penalty magnitude applied at failed entries.
    pub penalty: f32,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            cost_kind: CostKind::MaxEllG,
            return_type: ReturnType::Reward,
            shape_reward: false,
            reward: 1.0,
            penalty: 1.0,
        }
    }
}

impl CostConfig {
    /// Sets how the margins are combined into a cost.
    pub fn cost_kind(mut self, cost_kind: CostKind) -> Self {
        self.cost_kind = cost_kind;
        self
    }

    /// Sets the sign convention of the shaped signal.
    pub fn return_type(mut self, return_type: ReturnType) -> Self {
        self.return_type = return_type;
        self
    }

    /// Enables or disables terminal overrides.
    pub fn shape_reward(mut self, shape_reward: bool) -> Self {
        self.shape_reward = shape_reward;
        self
    }

    /// Sets the bonus magnitude applied at successful entries.
    pub fn reward(mut self, reward: f32) -> Self {
        self.reward = reward;
        self
    }

    /// Sets the penalty magnitude applied at failed entries.
    pub fn penalty(mut self, penalty: f32) -> Self {
        self.penalty = penalty;
        self
    }

    /// Constructs [`CostConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CostConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Shapes batches of margin signals into per-entry costs.
pub struct CostShaper {
    config: CostConfig,
}

impl CostShaper {
    /// Builds a cost shaper with the given configuration.
    pub fn build(config: &CostConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Returns the configured sign convention.
    pub fn return_type(&self) -> ReturnType {
        self.config.return_type
    }

    /// Computes the shaped cost for a batch of margin signals.
    ///
    /// `l_x` and `g_x` are the target and safety margins of the batch;
    /// `success` and `fail` mark terminal entries. When `shape_reward` is
    /// enabled, the margins of terminal entries are overridden in place and
    /// the mutated arrays are the authoritative values for logging.
    ///
    /// The failure override is applied after the success override, so an
    /// entry flagged with both keeps the penalty.
    pub fn apply(
        &self,
        l_x: &mut Array1<f32>,
        g_x: &mut Array1<f32>,
        success: &[bool],
        fail: &[bool],
    ) -> Array1<f32> {
        let mut cost = match self.config.cost_kind {
            CostKind::DenseEll => l_x.clone(),
            CostKind::Dense => l_x.clone() + &*g_x,
            CostKind::Sparse => Array1::zeros(l_x.len()),
            CostKind::MaxEllG => match self.config.return_type {
                ReturnType::Reward => ndarray::Zip::from(&*l_x)
                    .and(&*g_x)
                    .map_collect(|l, g| l.min(*g)),
                ReturnType::Cost => ndarray::Zip::from(&*l_x)
                    .and(&*g_x)
                    .map_collect(|l, g| l.max(*g)),
            },
        };

        if self.config.shape_reward {
            let (bonus, penalty) = match self.config.return_type {
                ReturnType::Reward => (-self.config.reward, -self.config.penalty),
                ReturnType::Cost => (self.config.reward, self.config.penalty),
            };
            for (i, &s) in success.iter().enumerate() {
                if s {
                    cost[i] = bonus;
                    l_x[i] = bonus;
                }
            }
            for (i, &f) in fail.iter().enumerate() {
                if f {
                    cost[i] = penalty;
                    g_x[i] = penalty;
                }
            }
        }

        cost
    }

    /// Shapes a single transition; scalar convenience over [`Self::apply`].
    pub fn apply_scalar(
        &self,
        l_x: f32,
        g_x: f32,
        success: bool,
        fail: bool,
    ) -> (f32, f32, f32) {
        let mut l = Array1::from(vec![l_x]);
        let mut g = Array1::from(vec![g_x]);
        let cost = self.apply(&mut l, &mut g, &[success], &[fail]);
        (cost[0], l[0], g[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaper(cost_kind: CostKind, return_type: ReturnType, shape_reward: bool) -> CostShaper {
        CostShaper::build(
            &CostConfig::default()
                .cost_kind(cost_kind)
                .return_type(return_type)
                .shape_reward(shape_reward)
                .reward(10.0)
                .penalty(20.0),
        )
    }

    fn margins() -> (Array1<f32>, Array1<f32>) {
        (
            Array1::from(vec![-1.0, 0.5, 2.0]),
            Array1::from(vec![0.25, -0.5, 1.0]),
        )
    }

    #[test]
    fn test_dense_ell() {
        let (mut l, mut g) = margins();
        let c = shaper(CostKind::DenseEll, ReturnType::Reward, false).apply(
            &mut l,
            &mut g,
            &[false; 3],
            &[false; 3],
        );
        assert_eq!(c, Array1::from(vec![-1.0, 0.5, 2.0]));
    }

    #[test]
    fn test_dense() {
        let (mut l, mut g) = margins();
        let c = shaper(CostKind::Dense, ReturnType::Cost, false).apply(
            &mut l,
            &mut g,
            &[false; 3],
            &[false; 3],
        );
        assert_eq!(c, Array1::from(vec![-0.75, 0.0, 3.0]));
    }

    #[test]
    fn test_sparse() {
        let (mut l, mut g) = margins();
        let c = shaper(CostKind::Sparse, ReturnType::Reward, false).apply(
            &mut l,
            &mut g,
            &[false; 3],
            &[false; 3],
        );
        assert_eq!(c, Array1::<f32>::zeros(3));
    }

    #[test]
    fn test_max_ell_g_both_modes() {
        let (mut l, mut g) = margins();
        let c = shaper(CostKind::MaxEllG, ReturnType::Reward, false).apply(
            &mut l,
            &mut g,
            &[false; 3],
            &[false; 3],
        );
        assert_eq!(c, Array1::from(vec![-1.0, -0.5, 1.0]));

        let (mut l, mut g) = margins();
        let c = shaper(CostKind::MaxEllG, ReturnType::Cost, false).apply(
            &mut l,
            &mut g,
            &[false; 3],
            &[false; 3],
        );
        assert_eq!(c, Array1::from(vec![0.25, 0.5, 2.0]));
    }

    #[test]
    fn test_shape_reward_overrides_margins() {
        let (mut l, mut g) = margins();
        let c = shaper(CostKind::MaxEllG, ReturnType::Reward, true).apply(
            &mut l,
            &mut g,
            &[true, false, false],
            &[false, false, true],
        );
        // success entry forced to -reward, fail entry to -penalty,
        // independent of the input margins
        assert_eq!(c[0], -10.0);
        assert_eq!(l[0], -10.0);
        assert_eq!(c[2], -20.0);
        assert_eq!(g[2], -20.0);
        assert_eq!(c[1], -0.5);

        let (mut l, mut g) = margins();
        let c = shaper(CostKind::MaxEllG, ReturnType::Cost, true).apply(
            &mut l,
            &mut g,
            &[true, false, false],
            &[false, false, true],
        );
        assert_eq!(c[0], 10.0);
        assert_eq!(l[0], 10.0);
        assert_eq!(c[2], 20.0);
        assert_eq!(g[2], 20.0);
    }

    #[test]
    fn test_fail_override_wins_over_success() {
        let mut l = Array1::from(vec![0.0]);
        let mut g = Array1::from(vec![0.0]);
        let c = shaper(CostKind::Sparse, ReturnType::Reward, true).apply(
            &mut l,
            &mut g,
            &[true],
            &[true],
        );
        assert_eq!(c[0], -20.0);
    }

    #[test]
    fn test_invalid_cost_kind() {
        assert!("dense_ell".parse::<CostKind>().is_ok());
        assert!("banana".parse::<CostKind>().is_err());
    }
}
