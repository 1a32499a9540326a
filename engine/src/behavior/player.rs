use util::PointExt;

use super::Mind;
use crate::{Body, Config, EntityType, Instant, Path, StepInfo, Timer};

/// Entity steered by the front end through `Controls`.
#[derive(Clone, PartialEq, Debug)]
pub struct Player {
    sprint_factor: f32,
    /// Ends the current sprint, `None` when not sprinting.
    sprint: Option<Timer>,
    /// Earliest time the next sprint can start.
    cooldown: Timer,
}

impl Player {
    pub fn new(c: &Config) -> Self {
        Player {
            sprint_factor: c.sprint_factor,
            sprint: None,
            cooldown: Timer::default(),
        }
    }

    pub fn is_sprinting(&self, now: Instant) -> bool {
        self.sprint.is_some_and(|t| !t.is_ready(now))
    }

    fn update_sprint(&mut self, want: bool, info: &StepInfo) {
        let c = info.config;
        if let Some(t) = self.sprint {
            if t.is_ready(info.now) {
                self.sprint = None;
                self.cooldown = Timer::after(info.now, c.sprint_cooldown);
            }
        } else if want && self.cooldown.is_ready(info.now) {
            self.sprint = Some(Timer::after(info.now, c.sprint_duration));
        }
    }
}

impl Mind for Player {
    fn decide(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        self.update_sprint(info.controls.sprint, info);

        let pos = me.pos();
        path.clear(pos);
        let (direction, length) = info.controls.direction.split_direction();
        if length == 0.0 {
            return false;
        }

        // Plan one tile ahead, the per-frame step is much shorter.
        let target = info.locator.bounds().clamp(pos + direction);
        let (direction, length) = (target - pos).split_direction();
        let mut sampled = Vec::new();
        if length == 0.0
            || info
                .locator
                .obstructed_segment(pos, direction, length, &mut sampled)
        {
            return false;
        }

        path.add(target);
        true
    }

    fn speed_factor(&self, now: Instant) -> f32 {
        if self.is_sprinting(now) {
            self.sprint_factor
        } else {
            1.0
        }
    }

    fn pause(&mut self, now: Instant) {
        if let Some(t) = self.sprint.as_mut() {
            t.pause(now);
        }
        self.cooldown.pause(now);
    }

    fn resume(&mut self, now: Instant) {
        if let Some(t) = self.sprint.as_mut() {
            t.resume(now);
        }
        self.cooldown.resume(now);
    }
}
