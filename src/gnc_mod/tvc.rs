use std::sync::Arc;
use std::time::Duration;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::trace;

use crate::error::{ensure_finite, TvcError, TvcResult};
use crate::sim::clock::TimeSource;

// ---------------------------------------------------------------------------
// Mount limits
// ---------------------------------------------------------------------------

/// Physical deflection limit of the mount, deg.
pub const MAX_ANGLE: f64 = 35.0;
/// Minimum change that produces a new history entry, deg.
pub const DEADBAND: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MountConfig {
    pub start_angle: f64, // deg
    pub max_angle: f64,   // deg, symmetric limit
    pub deadband: f64,    // deg
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            start_angle: 0.0,
            max_angle: MAX_ANGLE,
            deadband: DEADBAND,
        }
    }
}

// ---------------------------------------------------------------------------
// History entries
// ---------------------------------------------------------------------------

/// Commanded angle and the run time at which it took effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleEntry {
    pub angle: f64,
    pub time: Duration,
}

/// Commanded angle and how long it was held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleDelta {
    pub angle: f64,
    pub dt: Duration,
}

/// Consistent copy of both logs taken under one read lock.
#[derive(Debug, Clone)]
pub struct MountSnapshot {
    pub entries: Vec<AngleEntry>,
    pub deltas: Vec<AngleDelta>,
}

/// Settled deltas from some index onward plus the dwell at the current command.
#[derive(Debug, Clone)]
pub struct DeltaTail {
    /// Settled deltas starting at the requested index.
    pub settled: Vec<AngleDelta>,
    /// Length of the settled delta log when the tail was read.
    pub total: usize,
    /// Current command held from its entry time up to now.
    pub dwell: AngleDelta,
}

#[derive(Debug)]
struct MountLog {
    entries: Vec<AngleEntry>,
    deltas: Vec<AngleDelta>,
}

impl MountLog {
    fn last(&self) -> AngleEntry {
        // never empty: seeded with the start entry
        self.entries[self.entries.len() - 1]
    }
}

// ---------------------------------------------------------------------------
// TVC mount: append-only command history behind a reader/writer lock
// ---------------------------------------------------------------------------

/// Thrust-vector mount controller.
///
/// Records every accepted command with its time. The control loop is the
/// single writer; any number of threads may read concurrently. Both logs are
/// updated under one write lock, so readers never see them out of step.
pub struct TvcMount {
    clock: Arc<dyn TimeSource>,
    config: MountConfig,
    log: RwLock<MountLog>,
}

impl TvcMount {
    pub fn new(clock: Arc<dyn TimeSource>, config: MountConfig) -> TvcResult<Self> {
        let max_angle = ensure_finite(config.max_angle, "mount max angle")?;
        let deadband = ensure_finite(config.deadband, "mount deadband")?;
        let start = ensure_finite(config.start_angle, "mount start angle")?;
        if max_angle <= 0.0 {
            return Err(TvcError::InvalidArg {
                what: "mount max angle must be positive",
            });
        }
        if deadband < 0.0 {
            return Err(TvcError::InvalidArg {
                what: "mount deadband must be non-negative",
            });
        }
        if start.abs() > max_angle {
            return Err(TvcError::InvalidArg {
                what: "mount start angle must lie within the deflection limit",
            });
        }

        let log = MountLog {
            entries: vec![AngleEntry { angle: start, time: Duration::ZERO }],
            deltas: Vec::new(),
        };
        Ok(Self { clock, config, log: RwLock::new(log) })
    }

    /// Mount with default limits starting at `start_angle`.
    pub fn with_start_angle(clock: Arc<dyn TimeSource>, start_angle: f64) -> TvcResult<Self> {
        Self::new(clock, MountConfig { start_angle, ..MountConfig::default() })
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// Command a new mount angle (deg).
    ///
    /// The command is clamped to the deflection limit. Changes smaller than
    /// the deadband are dropped; returns whether an entry was recorded.
    pub fn set_angle(&self, command: f64) -> TvcResult<bool> {
        let command = ensure_finite(command, "mount command")?;
        let angle = command.clamp(-self.config.max_angle, self.config.max_angle);

        let log = self.log.upgradable_read();
        let last = log.last();
        if (angle - last.angle).abs() < self.config.deadband {
            return Ok(false);
        }

        let now = self.clock.time();
        let mut log = RwLockUpgradableReadGuard::upgrade(log);
        log.deltas.push(AngleDelta {
            angle: last.angle,
            dt: now.saturating_sub(last.time),
        });
        log.entries.push(AngleEntry { angle, time: now });
        trace!(angle, requested = command, t = now.as_secs_f64(), "mount entry recorded");
        Ok(true)
    }

    /// Most recently recorded mount angle (deg).
    pub fn angle(&self) -> f64 {
        self.log.read().last().angle
    }

    /// Number of recorded entries, including the start entry.
    pub fn len(&self) -> usize {
        self.log.read().entries.len()
    }

    /// Always false: the start entry is never removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn history(&self) -> Vec<AngleEntry> {
        self.log.read().entries.clone()
    }

    pub fn snapshot(&self) -> MountSnapshot {
        let log = self.log.read();
        MountSnapshot {
            entries: log.entries.clone(),
            deltas: log.deltas.clone(),
        }
    }

    /// Delta log with a trailing entry for the dwell at the current command,
    /// so a consumer can integrate all the way to now.
    pub fn delta_history(&self) -> Vec<AngleDelta> {
        let tail = self.delta_history_since(0);
        let mut deltas = tail.settled;
        deltas.push(tail.dwell);
        deltas
    }

    /// Settled deltas from index `start` onward, plus the current dwell.
    pub fn delta_history_since(&self, start: usize) -> DeltaTail {
        let (settled, total, last) = {
            let log = self.log.read();
            let from = start.min(log.deltas.len());
            (log.deltas[from..].to_vec(), log.deltas.len(), log.last())
        };
        let now = self.clock.time();
        DeltaTail {
            settled,
            total,
            dwell: AngleDelta {
                angle: last.angle,
                dt: now.saturating_sub(last.time),
            },
        }
    }
}

impl std::fmt::Debug for TvcMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TvcMount")
            .field("config", &self.config)
            .field("entries", &self.len())
            .field("angle", &self.angle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::ManualClock;

    fn mount_at(start: f64) -> (Arc<ManualClock>, TvcMount) {
        let clock = Arc::new(ManualClock::new());
        let mount = TvcMount::with_start_angle(clock.clone(), start).unwrap();
        (clock, mount)
    }

    #[test]
    fn starts_with_single_entry() {
        let (_, mount) = mount_at(5.0);
        assert_eq!(mount.len(), 1);
        assert_eq!(mount.angle(), 5.0);
        assert_eq!(mount.history()[0], AngleEntry { angle: 5.0, time: Duration::ZERO });
    }

    #[test]
    fn deadband_suppresses_small_changes() {
        let (clock, mount) = mount_at(0.0);
        clock.advance(Duration::from_millis(50));
        assert!(!mount.set_angle(0.99).unwrap());
        assert!(!mount.set_angle(-0.5).unwrap());
        assert_eq!(mount.len(), 1);
        assert_eq!(mount.angle(), 0.0);
        assert!(mount.set_angle(1.0).unwrap(), "exactly one deadband is recorded");
        assert_eq!(mount.len(), 2);
    }

    #[test]
    fn command_clamped_to_limit() {
        let (_, mount) = mount_at(0.0);
        mount.set_angle(80.0).unwrap();
        assert_eq!(mount.angle(), MAX_ANGLE);
        mount.set_angle(-1e9).unwrap();
        assert_eq!(mount.angle(), -MAX_ANGLE);
    }

    #[test]
    fn clamped_repeat_is_within_deadband() {
        let (_, mount) = mount_at(0.0);
        mount.set_angle(50.0).unwrap();
        assert!(!mount.set_angle(60.0).unwrap(), "both clamp to the same angle");
        assert_eq!(mount.len(), 2);
    }

    #[test]
    fn deltas_record_dwell_time() {
        let (clock, mount) = mount_at(0.0);
        clock.advance(Duration::from_millis(200));
        mount.set_angle(10.0).unwrap();
        clock.advance(Duration::from_millis(300));
        mount.set_angle(-10.0).unwrap();

        let snap = mount.snapshot();
        assert_eq!(snap.entries.len(), 3);
        assert_eq!(snap.deltas.len(), 2);
        assert_eq!(snap.deltas[0], AngleDelta { angle: 0.0, dt: Duration::from_millis(200) });
        assert_eq!(snap.deltas[1], AngleDelta { angle: 10.0, dt: Duration::from_millis(300) });
    }

    #[test]
    fn delta_history_appends_current_dwell() {
        let (clock, mount) = mount_at(0.0);
        clock.advance(Duration::from_millis(100));
        mount.set_angle(20.0).unwrap();
        clock.advance(Duration::from_millis(400));

        let deltas = mount.delta_history();
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[1], AngleDelta { angle: 20.0, dt: Duration::from_millis(400) });
    }

    #[test]
    fn delta_history_since_skips_consumed_prefix() {
        let (clock, mount) = mount_at(0.0);
        for a in [5.0, 10.0, 15.0] {
            clock.advance(Duration::from_millis(50));
            mount.set_angle(a).unwrap();
        }
        let tail = mount.delta_history_since(2);
        assert_eq!(tail.total, 3);
        assert_eq!(tail.settled.len(), 1);
        assert_eq!(tail.settled[0].angle, 10.0);
        assert_eq!(tail.dwell.angle, 15.0);

        let past_end = mount.delta_history_since(10);
        assert!(past_end.settled.is_empty());
    }

    #[test]
    fn non_finite_command_rejected() {
        let (_, mount) = mount_at(0.0);
        assert!(mount.set_angle(f64::NAN).is_err());
        assert!(mount.set_angle(f64::INFINITY).is_err());
        assert_eq!(mount.len(), 1);
    }

    #[test]
    fn invalid_config_rejected() {
        let clock: Arc<dyn TimeSource> = Arc::new(ManualClock::new());
        let bad = |config: MountConfig| TvcMount::new(clock.clone(), config).is_err();
        assert!(bad(MountConfig { max_angle: 0.0, ..MountConfig::default() }));
        assert!(bad(MountConfig { deadband: -1.0, ..MountConfig::default() }));
        assert!(bad(MountConfig { start_angle: 40.0, ..MountConfig::default() }));
        assert!(bad(MountConfig { start_angle: f64::NAN, ..MountConfig::default() }));
    }
}
