//! Configuration of the replay buffers.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ReplayBuffer`](super::ReplayBuffer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of transitions that can be stored. When the buffer is
    /// full, new transitions replace the oldest ones.
    pub capacity: usize,

    /// Random seed used for sampling transitions.
    pub seed: u64,

    /// First index of the wrapping region. Entries below this index are
    /// written once and never evicted; the write pointer wraps within
    /// `[start_offset, capacity)`.
    pub start_offset: usize,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            seed: 42,
            start_offset: 0,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the first index of the wrapping region.
    pub fn start_offset(mut self, start_offset: usize) -> Self {
        self.start_offset = start_offset;
        self
    }

    /// Constructs [`ReplayBufferConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ReplayBufferConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of [`MultimodalReplayBuffer`](super::MultimodalReplayBuffer).
///
/// `observation_shapes` maps stream names to per-step shapes; stream names
/// containing `"rgb"` are stored byte-valued, all others floating-point.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MultimodalReplayBufferConfig {
    /// Maximum number of transitions that can be stored.
    pub capacity: usize,

    /// Random seed used for sampling transitions.
    pub seed: u64,

    /// First index of the wrapping region.
    pub start_offset: usize,

    /// Per-step shape of each named observation stream.
    pub observation_shapes: HashMap<String, Vec<usize>>,
}

impl Default for MultimodalReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            seed: 42,
            start_offset: 0,
            observation_shapes: HashMap::new(),
        }
    }
}

impl MultimodalReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the first index of the wrapping region.
    pub fn start_offset(mut self, start_offset: usize) -> Self {
        self.start_offset = start_offset;
        self
    }

    /// Sets the per-step shape of each named observation stream.
    pub fn observation_shapes(
        mut self,
        observation_shapes: HashMap<String, Vec<usize>>,
    ) -> Self {
        self.observation_shapes = observation_shapes;
        self
    }

    /// Constructs [`MultimodalReplayBufferConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MultimodalReplayBufferConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
