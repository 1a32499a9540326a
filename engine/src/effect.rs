//! Short-lived markers: pheromone signals and visual effects.
use anyhow::bail;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
    Body, ColonyId, Config, Element, Influence, Instant, Result, StepInfo,
    Tile, Timer,
};

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EffectType {
    Pheromone,
    Vfx,
}

/// Pheromone signal types, each marks what the emitter was doing.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Signal {
    Explore,
    Resource,
    Home,
    Battle,
    Danger,
}

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VfxKind {
    Flash,
    Spawn,
    Death,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum EffectState {
    Pheromone { signal: Signal, initial: f32 },
    Vfx(VfxKind),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Effect {
    pub body: Body<EffectType>,
    pub state: EffectState,
    strength: f32,
    lifetime: f64,
    expiry: Timer,
}

/// Parameters for constructing effects from outside the engine.
#[derive(Clone, PartialEq, Debug)]
pub struct EffectProps {
    pub kind: EffectType,
    pub signal: Option<Signal>,
    pub vfx: Option<VfxKind>,
    pub owner: Option<ColonyId>,
    pub lifetime: Option<f64>,
}

impl EffectProps {
    pub fn vfx(kind: VfxKind) -> Self {
        EffectProps {
            kind: EffectType::Vfx,
            signal: None,
            vfx: Some(kind),
            owner: None,
            lifetime: None,
        }
    }

    pub fn pheromone(signal: Signal, owner: ColonyId) -> Self {
        EffectProps {
            kind: EffectType::Pheromone,
            signal: Some(signal),
            vfx: None,
            owner: Some(owner),
            lifetime: None,
        }
    }
}

impl Effect {
    fn new(
        kind: EffectType,
        pos: Vec2,
        state: EffectState,
        strength: f32,
        now: Instant,
        lifetime: f64,
    ) -> Self {
        Effect {
            body: Body::new(Tile::new(pos, kind), 0.0, 1.0),
            state,
            strength,
            lifetime,
            expiry: Timer::after(now, lifetime),
        }
    }

    pub fn pheromone(
        signal: Signal,
        pos: Vec2,
        owner: Option<ColonyId>,
        now: Instant,
        c: &Config,
    ) -> Self {
        let mut ret = Effect::new(
            EffectType::Pheromone,
            pos,
            EffectState::Pheromone {
                signal,
                initial: c.pheromone_strength,
            },
            c.pheromone_strength,
            now,
            c.pheromone_lifetime,
        );
        ret.body.owner = owner;
        ret
    }

    pub fn vfx(kind: VfxKind, pos: Vec2, now: Instant, c: &Config) -> Self {
        Effect::new(
            EffectType::Vfx,
            pos,
            EffectState::Vfx(kind),
            1.0,
            now,
            c.vfx_lifetime,
        )
    }

    pub fn from_props(
        props: &EffectProps,
        pos: Vec2,
        now: Instant,
        c: &Config,
    ) -> Result<Self> {
        let mut ret = match props.kind {
            EffectType::Pheromone => {
                let Some(signal) = props.signal else {
                    bail!("pheromone effect at {pos} needs a signal type");
                };
                if props.owner.is_none() {
                    bail!("pheromone effect at {pos} needs an owner colony");
                }
                Effect::pheromone(signal, pos, props.owner, now, c)
            }
            EffectType::Vfx => Effect::vfx(
                props.vfx.unwrap_or(VfxKind::Flash),
                pos,
                now,
                c,
            ),
        };
        if let Some(lifetime) = props.lifetime {
            ret.lifetime = lifetime;
            ret.expiry = Timer::after(now, lifetime);
        }
        Ok(ret)
    }

    pub fn kind(&self) -> EffectType {
        self.body.kind()
    }

    pub fn signal(&self) -> Option<Signal> {
        match self.state {
            EffectState::Pheromone { signal, .. } => Some(signal),
            EffectState::Vfx(_) => None,
        }
    }

    /// Current signal strength, decays linearly to zero over the lifetime.
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Fraction of lifetime left in `0.0..=1.0`.
    pub fn fraction_left(&self, now: Instant) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        ((self.expiry.remaining(now) / self.lifetime) as f32).clamp(0.0, 1.0)
    }

    pub fn step(&mut self, info: &mut StepInfo) {
        if self.expiry.is_ready(info.now) {
            self.strength = 0.0;
            info.push(Influence::RemoveEffect(self.body.id));
            return;
        }

        if let EffectState::Pheromone { initial, .. } = self.state {
            self.strength = initial * self.fraction_left(info.now);
        }
    }
}

impl Element for Effect {
    type Kind = EffectType;

    fn body(&self) -> &Body<EffectType> {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body<EffectType> {
        &mut self.body
    }

    fn pause(&mut self, now: Instant) {
        self.expiry.pause(now);
    }

    fn resume(&mut self, now: Instant) {
        self.expiry.resume(now);
    }
}
