//! Checkpoint persistence with a bounded retention window.
use anyhow::Result;
use log::info;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Writes checkpoints under a directory, keeping at most `max_keep` files.
///
/// Files are named deterministically as
/// `{label}_step_{step}_success_{score:.2}.ckpt`. When a save would exceed
/// the retention limit, the file with the smallest step count is deleted
/// first. Model selection across saved files is the concern of
/// [`TopKTracker`](crate::tracker::TopKTracker); this writer only enforces
/// the on-disk window.
pub struct CheckpointWriter {
    dir: PathBuf,
    label: String,
    max_keep: usize,
}

impl CheckpointWriter {
    /// Creates a writer for the given directory and file label.
    pub fn new(dir: impl Into<PathBuf>, label: impl Into<String>, max_keep: usize) -> Self {
        Self {
            dir: dir.into(),
            label: label.into(),
            max_keep,
        }
    }

    /// Deterministic file name for a step and success score.
    pub fn file_name(&self, step: usize, success: f32) -> String {
        format!(
            "{}_step_{}_success_{:.2}.ckpt",
            self.label, step, success
        )
    }

    /// Saves a checkpoint payload, enforcing the retention limit.
    ///
    /// `metadata`, when given, is written as a YAML sidecar next to the
    /// checkpoint. Returns the path of the written checkpoint. I/O errors
    /// propagate unchanged.
    pub fn save<M: Serialize>(
        &self,
        payload: &[u8],
        step: usize,
        success: f32,
        metadata: Option<&M>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        if self.max_keep > 0 {
            let existing = self.checkpoints()?;
            if existing.len() + 1 > self.max_keep {
                if let Some((_, oldest)) =
                    existing.into_iter().min_by_key(|(step, _)| *step)
                {
                    fs::remove_file(&oldest)?;
                    info!("Removed old checkpoint {:?}", oldest);
                }
            }
        }

        let path = self.dir.join(self.file_name(step, success));
        fs::write(&path, payload)?;
        if let Some(metadata) = metadata {
            let sidecar = path.with_extension("yaml");
            fs::write(&sidecar, serde_yaml::to_string(metadata)?)?;
        }
        info!("Saved checkpoint {:?} after [{}] updates", path, step);

        Ok(path)
    }

    /// Existing checkpoints of this writer as `(step, path)` pairs.
    pub fn checkpoints(&self) -> Result<Vec<(usize, PathBuf)>> {
        let mut found = Vec::new();
        if !self.dir.is_dir() {
            return Ok(found);
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("ckpt") {
                continue;
            }
            if let Some(step) = step_of(&path, &self.label) {
                found.push((step, path));
            }
        }
        Ok(found)
    }
}

// Parses the step count out of `{label}_step_{step}_success_{score}.ckpt`.
fn step_of(path: &Path, label: &str) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix(label)?.strip_prefix("_step_")?;
    let digits = rest.split('_').next()?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use tempdir::TempDir;

    #[derive(Serialize)]
    struct Meta {
        seed: u64,
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let writer = CheckpointWriter::new("/tmp/x", "critic", 3);
        assert_eq!(
            writer.file_name(1200, 0.875),
            "critic_step_1200_success_0.88.ckpt"
        );
    }

    #[test]
    fn test_retention_deletes_oldest() -> Result<()> {
        let dir = TempDir::new("ckpt")?;
        let writer = CheckpointWriter::new(dir.path(), "actor", 2);

        writer.save(b"one", 100, 0.1, None::<&Meta>)?;
        writer.save(b"two", 200, 0.5, None::<&Meta>)?;
        writer.save(b"three", 300, 0.9, None::<&Meta>)?;

        let mut steps: Vec<usize> =
            writer.checkpoints()?.into_iter().map(|(s, _)| s).collect();
        steps.sort_unstable();
        assert_eq!(steps, vec![200, 300]);
        Ok(())
    }

    #[test]
    fn test_metadata_sidecar() -> Result<()> {
        let dir = TempDir::new("ckpt")?;
        let writer = CheckpointWriter::new(dir.path(), "actor", 5);
        let path = writer.save(b"blob", 10, 1.0, Some(&Meta { seed: 7 }))?;
        assert!(path.with_extension("yaml").is_file());
        assert_eq!(fs::read(&path)?, b"blob");
        Ok(())
    }
}
