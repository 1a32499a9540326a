use glam::Vec2;
use strum::Display;
use util::{Area, RngExt};

use crate::{
    Body, Effect, EffectType, Entity, EntityType, Goal, Id, Influence, Kind,
    OwnerFilter, Path, PheromoneAnalyzer, Signal, Sort, StepInfo, Timer,
    VfxKind,
};

/// States of the autonomous entity state machine.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MobState {
    #[default]
    Wander,
    Chase,
    Fight,
    Collect,
    Return,
    Flee,
}

impl MobState {
    /// Pheromone left behind by a mob in this state.
    pub fn signal(self) -> Signal {
        match self {
            MobState::Wander => Signal::Explore,
            MobState::Collect => Signal::Resource,
            MobState::Return => Signal::Home,
            MobState::Chase | MobState::Fight => Signal::Battle,
            MobState::Flee => Signal::Danger,
        }
    }
}

/// State machine core shared by workers, warriors and hostiles.
#[derive(Clone, Default, PartialEq, Debug)]
pub(crate) struct Mob {
    pub state: MobState,
    /// Element the current state is about.
    pub target: Option<Id>,
    emit: Timer,
}

impl Mob {
    /// Switch state, marking the spot with the new state's signal.
    pub fn transition(
        &mut self,
        to: MobState,
        me: &Body<EntityType>,
        info: &mut StepInfo,
    ) {
        if self.state == to {
            return;
        }
        self.state = to;
        self.emit(me, info);
    }

    /// Drop a pheromone for the current state. Unowned mobs leave no trail.
    fn emit(&mut self, me: &Body<EntityType>, info: &mut StepInfo) {
        if me.owner.is_none() {
            return;
        }
        info.push(Influence::SpawnEffect(Effect::pheromone(
            self.state.signal(),
            me.pos(),
            me.owner,
            info.now,
            info.config,
        )));
        self.emit.restart(info.now, info.config.emit_interval);
    }

    /// Keep laying a trail while staying in the same state.
    pub fn post_step(&mut self, me: &Body<EntityType>, info: &mut StepInfo) {
        if self.emit.is_ready(info.now) {
            self.emit(me, info);
        }
    }

    /// Plan a path to a point, with the usual search radius.
    pub fn head_to(
        &self,
        me: &Body<EntityType>,
        path: &mut Path,
        target: Vec2,
        ignore_obstruction: bool,
        info: &StepInfo,
    ) -> bool {
        path.generate_path_to(
            &info.locator,
            me.pos(),
            target,
            ignore_obstruction,
            info.config.search_radius,
        )
    }

    /// Walk somewhere random, biased by the pheromones around.
    ///
    /// Returns false and leaves the path empty if no random target could be
    /// reached.
    pub fn wander(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        goal: Goal,
        info: &mut StepInfo,
    ) -> bool {
        let c = info.config;
        let pos = me.pos();

        let mut analyzer = PheromoneAnalyzer::new(c.weights(goal), pos);
        let sensed = info.locator.visible(
            Area::around(pos, c.sense_radius),
            Some(Kind::Effect(Some(EffectType::Pheromone))),
            Some(OwnerFilter::only(me.owner)),
            Sort::None,
        );
        for e in sensed.iter().filter_map(|e| e.as_effect()) {
            analyzer.feed(e);
        }

        let bounds = info.locator.bounds();
        for _ in 0..c.wander_retries.max(1) {
            let candidate = info.rng.point_in_disc(pos, c.wander_radius);
            let target = bounds.clamp(analyzer.compute_target(candidate));
            if self.head_to(me, path, target, false, info) {
                self.target = None;
                self.transition(MobState::Wander, me, info);
                return true;
            }
        }

        path.clear(pos);
        false
    }

    /// Go after entities that pass `enemies`, attacking them within reach.
    ///
    /// Falls back to wandering when nothing is in sight.
    pub fn hunt(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        enemies: OwnerFilter,
        attack: &mut Timer,
        info: &mut StepInfo,
    ) -> bool {
        let c = info.config;
        let pos = me.pos();

        let in_sight = |e: &&Entity| e.body.pos().distance(pos) <= c.sight_radius;
        let target = self
            .target
            .and_then(|id| info.locator.entity(id))
            .filter(in_sight)
            .filter(|e| enemies.matches(e.body.owner))
            .or_else(|| {
                info.locator
                    .closest(
                        pos,
                        c.sight_radius,
                        Some(Kind::Entity(None)),
                        Some(enemies),
                    )
                    .and_then(|e| e.as_entity())
            });

        let Some(target) = target else {
            self.target = None;
            if self.state == MobState::Wander
                && path.en_route(c.arrival_threshold)
            {
                return true;
            }
            return self.wander(me, path, Goal::Hunt, info);
        };
        self.target = Some(target.body.id);
        let target_pos = target.body.pos();

        if pos.distance(target_pos) <= c.reach {
            path.clear(pos);
            self.transition(MobState::Fight, me, info);
            if attack.is_ready(info.now) {
                log::debug!(
                    "{} {} hits {}",
                    me.kind(),
                    me.id,
                    target.body.id
                );
                info.push(Influence::Damage {
                    target: target.body.id,
                    amount: c.attack_damage,
                });
                info.push(Influence::SpawnEffect(Effect::vfx(
                    VfxKind::Flash,
                    target_pos,
                    info.now,
                    c,
                )));
                attack.restart(info.now, c.attack_cooldown);
            }
            return false;
        }

        self.transition(MobState::Chase, me, info);
        if path.en_route(c.arrival_threshold)
            && path.destination().distance(target_pos) <= c.reach
        {
            return true;
        }
        if self.head_to(me, path, target_pos, true, info) {
            return true;
        }

        // Can't get there, look elsewhere.
        self.target = None;
        self.wander(me, path, Goal::Hunt, info)
    }

    pub fn pause(&mut self, now: crate::Instant) {
        self.emit.pause(now);
    }

    pub fn resume(&mut self, now: crate::Instant) {
        self.emit.resume(now);
    }
}
