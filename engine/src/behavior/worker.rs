use glam::Vec2;
use util::{Area, PointExt, RngExt, VecExt};

use super::{Mind, Mob, MobState};
use crate::{
    BlockType, Body, Config, EntityType, Goal, Id, Influence, Instant, Kind,
    OwnerFilter, Path, Sort, StepInfo,
};

/// Gathers resources from deposits and brings them home.
#[derive(Clone, PartialEq, Debug)]
pub struct Worker {
    mob: Mob,
    cargo: f32,
    capacity: f32,
}

impl Worker {
    pub fn new(c: &Config) -> Self {
        Worker {
            mob: Mob::default(),
            cargo: 0.0,
            capacity: c.worker_capacity,
        }
    }

    pub fn cargo(&self) -> f32 {
        self.cargo
    }

    pub fn set_cargo(&mut self, cargo: f32) {
        self.cargo = cargo.clamp(0.0, self.capacity);
    }

    pub fn is_full(&self) -> bool {
        self.cargo >= self.capacity
    }

    pub fn cargo_ratio(&self) -> f32 {
        if self.capacity > 0.0 {
            (self.cargo / self.capacity).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Run from nearby armed strangers.
    ///
    /// Returns true if the worker is fleeing this frame.
    fn flee(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        let c = info.config;
        let pos = me.pos();

        let mut sum = Vec2::ZERO;
        let mut total = 0.0;
        let threats = info.locator.visible(
            Area::around(pos, c.flee_radius),
            Some(Kind::Entity(None)),
            Some(OwnerFilter::except(me.owner)),
            Sort::None,
        );
        for e in threats.iter().filter_map(|e| e.as_entity()) {
            if !e.is_armed() {
                continue;
            }
            // Closer threats weigh more.
            let w = (c.flee_radius - e.body.pos().distance(pos)).max(0.05);
            sum += e.body.pos() * w;
            total += w;
        }
        if total <= 0.0 {
            return false;
        }

        if self.mob.state == MobState::Flee
            && path.en_route(c.arrival_threshold)
        {
            return true;
        }

        let away = pos - sum / total;
        let away = if away.length_squared() > 0.0 {
            away
        } else {
            info.rng.dir_in_cone(Vec2::Y, 360.0)
        };

        let bounds = info.locator.bounds();
        for _ in 0..c.wander_retries.max(1) {
            let dir = info.rng.dir_in_cone(away, c.flee_cone);
            let target = bounds.clamp(pos + dir * c.flee_distance);
            if self.mob.head_to(me, path, target, false, info) {
                self.mob.target = None;
                self.mob.transition(MobState::Flee, me, info);
                return true;
            }
        }
        false
    }

    /// Drop-off point, the closest own home block or the colony's home
    /// point when it has no home blocks.
    fn home(
        &self,
        me: &Body<EntityType>,
        info: &StepInfo,
    ) -> Option<(Option<Id>, Vec2)> {
        let pos = me.pos();
        let block = info
            .locator
            .visible(
                info.locator.bounds(),
                Some(Kind::Block(Some(BlockType::Home))),
                Some(OwnerFilter::only(me.owner)),
                Sort::Distance(pos),
            )
            .into_iter()
            .find_map(|e| e.as_block());
        if let Some(block) = block {
            return Some((Some(block.body.id), block.body.pos()));
        }
        let colony = info.locator.colony_by_id(me.owner?)?;
        Some((None, colony.home))
    }

    fn on_wander(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        let c = info.config;
        if self.mob.state == MobState::Wander
            && path.en_route(c.arrival_threshold)
        {
            return true;
        }

        if self.is_full() && self.start_return(me, path, info) {
            return true;
        }

        let deposit = info
            .locator
            .visible(
                Area::around(me.pos(), c.sight_radius),
                Some(Kind::Block(Some(BlockType::Deposit))),
                None,
                Sort::Distance(me.pos()),
            )
            .into_iter()
            .filter_map(|e| e.as_block())
            .find(|b| b.is_nonempty_deposit());
        if let Some(deposit) = deposit {
            if self.mob.head_to(me, path, deposit.body.pos(), true, info) {
                self.mob.target = Some(deposit.body.id);
                self.mob.transition(MobState::Collect, me, info);
                return true;
            }
        }

        let goal = if self.cargo > 0.0 {
            Goal::Homeward
        } else {
            Goal::Gather
        };
        self.mob.wander(me, path, goal, info)
    }

    fn start_return(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        let Some((id, home)) = self.home(me, info) else {
            return false;
        };
        if !self.mob.head_to(me, path, home, true, info) {
            return false;
        }
        self.mob.target = id;
        self.mob.transition(MobState::Return, me, info);
        true
    }

    fn on_collect(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        let c = info.config;
        if path.en_route(c.arrival_threshold) {
            return true;
        }

        let deposit = self
            .mob
            .target
            .and_then(|id| info.locator.block(id))
            .filter(|b| b.is_nonempty_deposit());
        let Some(deposit) = deposit else {
            // Dried up or gone.
            if self.cargo > 0.0 && self.start_return(me, path, info) {
                return true;
            }
            return self.on_wander(me, path, info);
        };

        if (deposit.body.cell() - me.cell()).chess_len() > 1 {
            if self.mob.head_to(me, path, deposit.body.pos(), true, info) {
                return true;
            }
            return self.on_wander(me, path, info);
        }

        let available = deposit.deposit_amount().unwrap_or(0.0);
        let amount = (c.harvest_rate * info.dt)
            .min(self.capacity - self.cargo)
            .min(available)
            .max(0.0);
        if amount > 0.0 {
            info.push(Influence::Harvest {
                deposit: deposit.body.id,
                amount,
            });
            self.cargo += amount;
        }

        if self.is_full() || amount >= available {
            path.clear(me.pos());
            if !self.start_return(me, path, info) {
                self.mob.transition(MobState::Wander, me, info);
            }
            return !path.is_empty();
        }
        false
    }

    fn on_return(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        let c = info.config;
        if path.en_route(c.arrival_threshold) {
            return true;
        }

        let home = match self.mob.target {
            Some(id) => info.locator.block(id).map(|b| b.body.pos()),
            None => self.home(me, info).map(|(_, pos)| pos),
        };
        let Some(home) = home else {
            if self.start_return(me, path, info) {
                return true;
            }
            return self.on_wander(me, path, info);
        };

        if (home.cell() - me.cell()).chess_len() > 1 {
            if self.mob.head_to(me, path, home, true, info) {
                return true;
            }
            return self.on_wander(me, path, info);
        }

        if self.cargo > 0.0 {
            if let Some(colony) = me.owner {
                log::debug!("worker {} delivers {:.1}", me.id, self.cargo);
                info.push(Influence::Deliver {
                    colony,
                    amount: self.cargo,
                });
            }
            self.cargo = 0.0;
        }
        path.clear(me.pos());
        self.mob.target = None;
        self.mob.transition(MobState::Wander, me, info);
        false
    }
}

impl Mind for Worker {
    fn decide(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        if self.flee(me, path, info) {
            return true;
        }

        match self.mob.state {
            MobState::Collect => self.on_collect(me, path, info),
            MobState::Return => self.on_return(me, path, info),
            MobState::Flee => {
                if path.en_route(info.config.arrival_threshold) {
                    return true;
                }
                self.on_wander(me, path, info)
            }
            _ => self.on_wander(me, path, info),
        }
    }

    fn post_step(&mut self, me: &Body<EntityType>, info: &mut StepInfo) {
        self.mob.post_step(me, info);
    }

    fn pause(&mut self, now: Instant) {
        self.mob.pause(now);
    }

    fn resume(&mut self, now: Instant) {
        self.mob.resume(now);
    }

    fn state(&self) -> Option<MobState> {
        Some(self.mob.state)
    }
}
