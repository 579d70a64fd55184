use anyhow::Result;
use ndarray::Array1;
use reach_avoid::{
    checkpoint::CheckpointWriter,
    cost::{CostConfig, CostKind, ReturnType},
    point_mass::{PointMassConfig, PointMassEnv},
    replay_buffer::{ReplayBuffer, ReplayBufferConfig, Transition},
    termination::{DoneKind, FailureMode},
    tracker::TopKTracker,
    SafeEnv,
};
use tempdir::TempDir;

fn env_config() -> PointMassConfig {
    PointMassConfig::default()
        .cost(
            CostConfig::default()
                .cost_kind(CostKind::MaxEllG)
                .return_type(ReturnType::Reward)
                .shape_reward(true)
                .reward(1.0)
                .penalty(1.0),
        )
        .done_kind(DoneKind::All)
}

/// Runs one episode with a scripted action and pushes every transition into
/// the buffer. Returns whether the episode ended in the goal region.
fn run_episode(
    env: &mut PointMassEnv,
    buffer: &mut ReplayBuffer,
    act: [f32; 2],
) -> Result<bool> {
    let mut obs = env.reset()?;
    let act = Array1::from(act.to_vec());
    for _ in 0..50 {
        let step = env.step(&act)?;
        buffer.store(&Transition {
            obs: obs.clone(),
            act: act.clone(),
            reward: step.reward,
            next_obs: step.obs.clone(),
            done: step.done,
            target_margin: step.target_margin,
            safety_margin: step.safety_margin,
        });
        obs = step.obs.clone();
        if step.done {
            return Ok(step.failure_mode == Some(FailureMode::Success));
        }
    }
    panic!("episode did not terminate");
}

#[test]
fn test_training_loop_data_path() -> Result<()> {
    env_logger::try_init().ok();

    let mut env = PointMassEnv::build(&env_config(), 42)?;
    let mut buffer = ReplayBuffer::build(
        &ReplayBufferConfig::default().capacity(256).seed(42),
        2,
        2,
    );

    // One successful episode toward the goal, one into the obstacle.
    let reached = run_episode(&mut env, &mut buffer, [1.0, 1.0])?;
    assert!(reached);
    let reached = run_episode(&mut env, &mut buffer, [-1.0, -1.0])?;
    assert!(!reached);

    assert!(!buffer.is_empty());
    let batch = buffer.sample(32)?;
    assert_eq!(batch.len(), 32);
    assert_eq!(batch.obs.shape(), &[32, 2]);

    // Shaped terminal signals are bounded by the configured bonus/penalty.
    for (&r, (&l, &g)) in batch
        .reward
        .iter()
        .zip(batch.target_margin.iter().zip(batch.safety_margin.iter()))
    {
        assert!(r.abs() <= 4.0);
        assert!(l.is_finite() && g.is_finite());
    }
    Ok(())
}

#[test]
fn test_checkpoint_selection_over_training() -> Result<()> {
    let dir = TempDir::new("reach_avoid")?;
    let writer = CheckpointWriter::new(dir.path(), "actor", 3);
    let mut tracker = TopKTracker::new(2);

    // Success rates as they might come out of periodic evaluation.
    for (step, success) in [(100, 0.1), (200, 0.9), (300, 0.5), (400, 0.95)] {
        let path = writer.save(b"weights", step, success, None::<&()>)?;
        tracker.offer(success, path.to_string_lossy());
    }

    // Retention window kept the newest three files on disk.
    let mut steps: Vec<usize> = writer.checkpoints()?.into_iter().map(|(s, _)| s).collect();
    steps.sort_unstable();
    assert_eq!(steps, vec![200, 300, 400]);

    // The tracker still points at the best-scoring checkpoint.
    assert!(tracker.best()?.contains("step_400"));
    Ok(())
}
