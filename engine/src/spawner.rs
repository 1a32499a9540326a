//! Blocks that produce new entities.
use rand::Rng;
use serde::{Deserialize, Serialize};
use util::{VecExt, DIR_8};

use crate::{
    Body, BlockType, Entity, EntityType, Influence, Instant, StepInfo, Timer,
};

/// When a spawner produces its next entity.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cadence {
    /// Spawn every `period` seconds.
    Interval { period: f64 },
    /// Spawn whenever the colony has funded the meter up to `cost`.
    Threshold { cost: f32 },
}

#[derive(Clone, PartialEq, Debug)]
pub struct Spawner {
    pub cadence: Cadence,
    pub spawns: EntityType,
    /// Total number of entities the spawner may produce.
    pub limit: Option<u32>,
    spawned: u32,
    timer: Timer,
    meter: f32,
}

impl Spawner {
    pub fn new(cadence: Cadence, spawns: EntityType, now: Instant) -> Self {
        let timer = match cadence {
            Cadence::Interval { period } => Timer::after(now, period),
            Cadence::Threshold { .. } => Timer::default(),
        };

        Spawner {
            cadence,
            spawns,
            limit: None,
            spawned: 0,
            timer,
            meter: 0.0,
        }
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|n| self.spawned >= n)
    }

    pub fn meter(&self) -> f32 {
        self.meter
    }

    /// How much funding the meter still needs before it can spawn.
    pub fn needs(&self) -> f32 {
        match self.cadence {
            Cadence::Threshold { cost } if !self.is_exhausted() => {
                (cost - self.meter).max(0.0)
            }
            _ => 0.0,
        }
    }

    pub fn fund(&mut self, amount: f32) {
        self.meter += amount.max(0.0);
    }

    /// Seconds until an interval spawner fires next.
    pub fn remaining(&self, now: Instant) -> Option<f64> {
        match self.cadence {
            Cadence::Interval { .. } => Some(self.timer.remaining(now)),
            Cadence::Threshold { .. } => None,
        }
    }

    /// Progress towards the next spawn in `0.0..=1.0`.
    pub fn completion(&self, now: Instant) -> f32 {
        let ret = match self.cadence {
            Cadence::Interval { period } if period > 0.0 => {
                1.0 - (self.timer.remaining(now) / period) as f32
            }
            Cadence::Interval { .. } => 1.0,
            Cadence::Threshold { cost } if cost > 0.0 => self.meter / cost,
            Cadence::Threshold { .. } => 1.0,
        };
        ret.clamp(0.0, 1.0)
    }

    fn is_due(&self, now: Instant) -> bool {
        if self.is_exhausted() {
            return false;
        }
        match self.cadence {
            Cadence::Interval { .. } => self.timer.is_ready(now),
            Cadence::Threshold { cost } => self.meter >= cost,
        }
    }

    pub(crate) fn step(&mut self, body: &Body<BlockType>, info: &mut StepInfo) {
        if !self.is_due(info.now) {
            return;
        }

        // Look for a free neighboring cell, starting from a random side.
        let origin = body.cell();
        let start = info.rng.gen_range(0..DIR_8.len());
        let Some(cell) = (0..DIR_8.len())
            .map(|i| origin + DIR_8[(start + i) % DIR_8.len()])
            .find(|&c| {
                info.locator.cell_in_bounds(c)
                    && !info.locator.cell_obstructed(c)
            })
        else {
            // Boxed in, try again on a later frame.
            return;
        };

        let entity =
            Entity::new(self.spawns, cell.center(), body.owner, info.config);
        log::debug!(
            "spawner {} producing {} at {cell}",
            body.id,
            self.spawns
        );
        info.push(Influence::SpawnEntity(entity));
        self.spawned += 1;

        match self.cadence {
            Cadence::Interval { period } => {
                self.timer.reschedule(period);
                if self.timer.is_ready(info.now) {
                    // Fell more than a full period behind, don't burst.
                    self.timer.restart(info.now, period);
                }
            }
            Cadence::Threshold { cost } => self.meter -= cost,
        }
    }

    pub(crate) fn pause(&mut self, now: Instant) {
        self.timer.pause(now);
    }

    pub(crate) fn resume(&mut self, now: Instant) {
        self.timer.resume(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_needs_funding() {
        let mut s = Spawner::new(
            Cadence::Threshold { cost: 10.0 },
            EntityType::Worker,
            Instant::default(),
        );
        assert_eq!(s.needs(), 10.0);
        s.fund(4.0);
        assert_eq!(s.needs(), 6.0);
        assert!((s.completion(Instant::default()) - 0.4).abs() < 1e-6);
        assert!(!s.is_due(Instant::default()));
        s.fund(6.0);
        assert!(s.is_due(Instant::default()));
    }

    #[test]
    fn interval_pause_keeps_remaining() {
        let mut s = Spawner::new(
            Cadence::Interval { period: 10.0 },
            EntityType::Worker,
            Instant::from_secs(0.0),
        );
        s.pause(Instant::from_secs(4.0));
        s.resume(Instant::from_secs(500.0));
        assert_eq!(s.remaining(Instant::from_secs(500.0)), Some(6.0));
        assert!(!s.is_due(Instant::from_secs(505.0)));
        assert!(s.is_due(Instant::from_secs(506.0)));
    }

    #[test]
    fn limit_exhausts() {
        let mut s = Spawner::new(
            Cadence::Threshold { cost: 1.0 },
            EntityType::Warrior,
            Instant::default(),
        )
        .with_limit(Some(0));
        s.fund(5.0);
        assert!(s.is_exhausted());
        assert!(!s.is_due(Instant::default()));
        assert_eq!(s.needs(), 0.0);
    }
}
