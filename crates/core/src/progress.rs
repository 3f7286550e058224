//! Cosmetic progress model for an in-flight job.
//!
//! The service exposes no percentage, only a status label, so the bar
//! advances on a timer up to a ceiling below 100 and is reconciled only
//! when a terminal status is observed.

use std::time::Duration;

use crate::error::CoreError;

/// Default tick interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);
/// Default increment per tick, in percentage points.
pub const DEFAULT_STEP: u8 = 5;
/// Highest value reachable before a terminal status.
pub const DEFAULT_CEILING: u8 = 90;

/// Labels displayed under the bar, one per third.
pub const STAGE_LABELS: [&str; 3] = ["텍스트 분석", "수식 변환", "HWP 생성"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressConfig {
    pub interval: Duration,
    pub step: u8,
    pub ceiling: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_TICK_INTERVAL,
            step: DEFAULT_STEP,
            ceiling: DEFAULT_CEILING,
        }
    }
}

impl ProgressConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.step == 0 {
            return Err(CoreError::Validation(
                "Progress step must be positive".to_string(),
            ));
        }
        if self.ceiling >= 100 {
            return Err(CoreError::Validation(format!(
                "Progress ceiling must be below 100, got {}",
                self.ceiling
            )));
        }
        if self.interval.is_zero() {
            return Err(CoreError::Validation(
                "Progress interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Running,
    Completed,
    /// Value frozen, error indicator shown next to the bar.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub percent: u8,
    pub phase: ProgressPhase,
}

impl ProgressSnapshot {
    pub fn initial() -> Self {
        Self {
            percent: 0,
            phase: ProgressPhase::Running,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase != ProgressPhase::Running
    }
}

/// Progress bar state for one submission. There is no way to restart
/// it: a new submission builds a new model.
#[derive(Debug, Clone)]
pub struct ProgressModel {
    config: ProgressConfig,
    snapshot: ProgressSnapshot,
}

impl ProgressModel {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            config,
            snapshot: ProgressSnapshot::initial(),
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot
    }

    pub fn percent(&self) -> u8 {
        self.snapshot.percent
    }

    /// Advance by one step, capped at the ceiling. Returns `true` when
    /// the value changed.
    pub fn tick(&mut self) -> bool {
        if self.snapshot.is_terminal() {
            return false;
        }
        let next = self
            .snapshot
            .percent
            .saturating_add(self.config.step)
            .min(self.config.ceiling)
            .max(self.snapshot.percent);
        let changed = next != self.snapshot.percent;
        self.snapshot.percent = next;
        changed
    }

    /// The job completed: snap to 100.
    pub fn complete(&mut self) {
        if self.snapshot.is_terminal() {
            return;
        }
        self.snapshot = ProgressSnapshot {
            percent: 100,
            phase: ProgressPhase::Completed,
        };
    }

    /// The job failed: keep the last value and raise the error flag.
    pub fn fail(&mut self) {
        if self.snapshot.is_terminal() {
            return;
        }
        self.snapshot.phase = ProgressPhase::Failed;
    }
}

/// Label of the stage the bar is currently in.
pub fn stage_label(percent: u8) -> &'static str {
    match percent {
        0..=33 => STAGE_LABELS[0],
        34..=66 => STAGE_LABELS[1],
        _ => STAGE_LABELS[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_stop_at_ceiling() {
        let mut model = ProgressModel::new(ProgressConfig::default());
        let mut seen = Vec::new();
        for _ in 0..30 {
            model.tick();
            seen.push(model.percent());
        }
        assert_eq!(seen[0], 5);
        assert_eq!(*seen.last().unwrap(), 90);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|&p| p <= 90));
    }

    #[test]
    fn ceiling_not_multiple_of_step() {
        let mut model = ProgressModel::new(ProgressConfig {
            step: 7,
            ceiling: 20,
            ..Default::default()
        });
        for _ in 0..10 {
            model.tick();
        }
        assert_eq!(model.percent(), 20);
    }

    #[test]
    fn complete_snaps_to_100() {
        let mut model = ProgressModel::new(ProgressConfig::default());
        model.tick();
        model.complete();
        assert_eq!(model.snapshot().percent, 100);
        assert_eq!(model.snapshot().phase, ProgressPhase::Completed);
        assert!(!model.tick());
        assert_eq!(model.percent(), 100);
    }

    #[test]
    fn fail_freezes_value() {
        let mut model = ProgressModel::new(ProgressConfig::default());
        model.tick();
        model.tick();
        model.fail();
        assert!(!model.tick());
        assert_eq!(model.percent(), 10);
        assert_eq!(model.snapshot().phase, ProgressPhase::Failed);

        // A failed bar never jumps to 100 afterwards.
        model.complete();
        assert_eq!(model.percent(), 10);
    }

    #[test]
    fn config_validation() {
        assert!(ProgressConfig::default().validate().is_ok());
        let bad = ProgressConfig {
            ceiling: 100,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = ProgressConfig {
            step: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn stage_labels_by_thirds() {
        assert_eq!(stage_label(0), "텍스트 분석");
        assert_eq!(stage_label(50), "수식 변환");
        assert_eq!(stage_label(90), "HWP 생성");
    }
}
