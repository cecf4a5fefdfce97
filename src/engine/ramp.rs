//! Synthetic throughput ramp
//!
//! Stands in for a real transfer: samples climb linearly to the target over
//! the ramp-up period, then hover around it with a small uniform jitter.

use super::progress::ProgressObserver;
use crate::{defaults, types::{round1, SpeedKind}};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Shape of one synthetic run
#[derive(Debug, Clone, PartialEq)]
pub struct RampProfile {
    pub base_target: f64,
    pub window: Duration,
    pub tick: Duration,
    pub ramp_up: Duration,
    pub jitter_fraction: f64,
    pub min_sample: f64,
}

impl RampProfile {
    pub fn for_kind(kind: SpeedKind) -> Self {
        Self {
            base_target: kind.base_target(),
            window: defaults::RAMP_WINDOW,
            tick: defaults::RAMP_TICK,
            ramp_up: defaults::RAMP_UP,
            jitter_fraction: defaults::RAMP_JITTER_FRACTION,
            min_sample: defaults::RAMP_MIN_SAMPLE,
        }
    }

    /// Largest absolute jitter applied to a sample
    pub fn jitter_bound(&self) -> f64 {
        self.base_target * self.jitter_fraction
    }

    fn is_settled(&self, elapsed: Duration) -> bool {
        elapsed >= self.ramp_up
    }
}

/// Warm-up scaling factor in `[0, 1]`
pub fn ramp_factor(elapsed: Duration, ramp_up: Duration) -> f64 {
    if ramp_up.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / ramp_up.as_secs_f64()).min(1.0)
}

/// One sample for the given elapsed time and jitter, floored at the profile minimum
pub fn ramp_sample(profile: &RampProfile, elapsed: Duration, jitter: f64) -> f64 {
    let value = profile.base_target * ramp_factor(elapsed, profile.ramp_up) + jitter;
    value.max(profile.min_sample)
}

/// Generates synthetic throughput curves
pub struct RampGenerator {
    rng: Mutex<StdRng>,
}

impl Default for RampGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RampGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic jitter for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn jitter(&self, bound: f64) -> f64 {
        if bound <= 0.0 {
            return 0.0;
        }
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(-bound..bound),
            Err(poisoned) => poisoned.into_inner().gen_range(-bound..bound),
        }
    }

    /// Run the default profile for `kind`
    pub async fn run(&self, kind: SpeedKind, progress: &dyn ProgressObserver) -> f64 {
        self.run_profile(&RampProfile::for_kind(kind), progress).await
    }

    /// Tick through the window, reporting every sample, and return the settled mean.
    ///
    /// Warm-up samples (before `ramp_up`) are reported but left out of the
    /// mean; if none settled, every sample counts.
    pub async fn run_profile(&self, profile: &RampProfile, progress: &dyn ProgressObserver) -> f64 {
        let start = Instant::now();
        let mut ticks = interval_at(start + profile.tick, profile.tick);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut all = Vec::new();
        let mut settled = Vec::new();

        loop {
            let now = ticks.tick().await;
            let elapsed = now.duration_since(start);
            if elapsed >= profile.window {
                break;
            }

            let sample = ramp_sample(profile, elapsed, self.jitter(profile.jitter_bound()));
            progress.on_progress(round1(sample));

            all.push(sample);
            if profile.is_settled(elapsed) {
                settled.push(sample);
            }
        }

        let result = if !settled.is_empty() {
            mean(&settled)
        } else if !all.is_empty() {
            mean(&all)
        } else {
            profile.min_sample
        };

        tracing::debug!(
            target_mbps = profile.base_target,
            samples = all.len(),
            settled = settled.len(),
            result,
            "synthetic ramp finished"
        );

        round1(result)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::progress::NoProgress;
    use proptest::prelude::*;

    #[test]
    fn test_ramp_factor() {
        let up = Duration::from_millis(1000);
        assert_eq!(ramp_factor(Duration::ZERO, up), 0.0);
        assert_eq!(ramp_factor(Duration::from_millis(500), up), 0.5);
        assert_eq!(ramp_factor(Duration::from_millis(1000), up), 1.0);
        assert_eq!(ramp_factor(Duration::from_millis(2500), up), 1.0);
        assert_eq!(ramp_factor(Duration::from_millis(10), Duration::ZERO), 1.0);
    }

    #[test]
    fn test_sample_at_start_is_floored() {
        let profile = RampProfile::for_kind(SpeedKind::Upload);
        assert_eq!(ramp_sample(&profile, Duration::ZERO, -0.5), 0.1);
        assert_eq!(ramp_sample(&profile, Duration::ZERO, 0.8), 0.8);
    }

    proptest! {
        #[test]
        fn prop_settled_sample_within_jitter_of_target(
            elapsed_ms in 1000u64..3000,
            unit in -1.0f64..1.0,
            download in any::<bool>(),
        ) {
            let kind = if download { SpeedKind::Download } else { SpeedKind::Upload };
            let profile = RampProfile::for_kind(kind);
            let jitter = unit * profile.jitter_bound();
            let sample = ramp_sample(&profile, Duration::from_millis(elapsed_ms), jitter);
            prop_assert!((sample - profile.base_target).abs() <= profile.jitter_bound());
        }

        #[test]
        fn prop_early_sample_within_jitter_of_zero(unit in -1.0f64..1.0) {
            let profile = RampProfile::for_kind(SpeedKind::Download);
            let sample = ramp_sample(&profile, Duration::ZERO, unit * profile.jitter_bound());
            prop_assert!(sample >= profile.min_sample);
            prop_assert!(sample <= profile.jitter_bound());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_every_tick_and_lasts_the_window() {
        let generator = RampGenerator::with_seed(7);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let started = Instant::now();
        let result = generator.run(SpeedKind::Upload, &tx).await;
        assert_eq!(started.elapsed(), Duration::from_millis(3000));

        let mut samples = Vec::new();
        while let Ok(sample) = rx.try_recv() {
            samples.push(sample);
        }
        assert_eq!(samples.len(), 29);
        assert!(samples.iter().all(|s| *s >= 0.1));
        assert!(samples[0] < samples[28]);
        assert!((19.8..=24.2).contains(&result), "upload mean {}", result);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_fallback_mean_near_target() {
        for seed in 0..20 {
            let generator = RampGenerator::with_seed(seed);
            let result = generator.run(SpeedKind::Download, &NoProgress).await;
            assert!((61.75..=68.25).contains(&result), "seed {} gave {}", seed, result);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_seed_same_curve() {
        let a = RampGenerator::with_seed(42).run(SpeedKind::Upload, &NoProgress).await;
        let b = RampGenerator::with_seed(42).run(SpeedKind::Upload, &NoProgress).await;
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_window_uses_all_samples() {
        let profile = RampProfile {
            window: Duration::from_millis(500),
            jitter_fraction: 0.0,
            ..RampProfile::for_kind(SpeedKind::Upload)
        };
        let result = RampGenerator::with_seed(1).run_profile(&profile, &NoProgress).await;
        // Samples at 100..400 ms: 2.2, 4.4, 6.6, 8.8
        assert_eq!(result, 5.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_shorter_than_tick_returns_floor() {
        let profile = RampProfile {
            window: Duration::from_millis(50),
            ..RampProfile::for_kind(SpeedKind::Upload)
        };
        let result = RampGenerator::with_seed(1).run_profile(&profile, &NoProgress).await;
        assert_eq!(result, 0.1);
    }
}
