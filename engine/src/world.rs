use anyhow::bail;
use glam::Vec2;
use rand::SeedableRng;
use util::{GameRng, PointExt, VecExt};

use crate::{
    view, Block, BlockProps, Clock, Colony, Config, Controls, Effect,
    EffectProps, Element, Entity, EntityProps, Id, Influence, Instant,
    Locator, Occupancy, Result, StepInfo, WallClock, WorldSpec,
};

/// Object `perform_action` will create.
#[derive(Clone, Default, PartialEq, Debug)]
pub enum Props {
    #[default]
    None,
    Block(BlockProps),
    Entity(EntityProps),
    Vfx(EffectProps),
}

/// Main data container for the simulation.
pub struct World {
    config: Config,
    clock: Box<dyn Clock>,
    rng: GameRng,
    colonies: Vec<Colony>,
    blocks: Vec<Block>,
    entities: Vec<Entity>,
    effects: Vec<Effect>,
    occupancy: Occupancy,
    /// Influences queued from outside, applied at the next commit.
    pending: Vec<Influence>,
    props: Props,
    next_id: u64,
    frame: u64,
    paused_at: Option<Instant>,
}

impl World {
    /// Build a world with default config running on the wall clock.
    pub fn new(spec: &WorldSpec) -> Result<Self> {
        World::build(spec, Config::default(), WallClock::default())
    }

    pub fn build(
        spec: &WorldSpec,
        config: Config,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        let now = clock.now();
        let pop = spec.populate(&config, now)?;

        let mut ret = World {
            config,
            clock: Box::new(clock),
            rng: GameRng::seed_from_u64(spec.seed.seed()),
            colonies: pop.colonies,
            blocks: Vec::new(),
            entities: Vec::new(),
            effects: Vec::new(),
            occupancy: Occupancy::new(pop.size),
            pending: Vec::new(),
            props: Props::None,
            next_id: 1,
            frame: 0,
            paused_at: None,
        };

        for mut block in pop.blocks {
            block.body.id = ret.fresh_id();
            ret.blocks.push(block);
        }
        for mut entity in pop.entities {
            entity.body.id = ret.fresh_id();
            ret.entities.push(entity);
        }
        ret.refresh();

        log::info!(
            "world {}x{}: {} colonies, {} blocks, {} entities",
            pop.size.x,
            pop.size.y,
            ret.colonies.len(),
            ret.blocks.len(),
            ret.entities.len()
        );
        Ok(ret)
    }

    fn fresh_id(&mut self) -> Id {
        let ret = Id(self.next_id);
        self.next_id += 1;
        ret
    }

    /// Run one frame of the simulation.
    ///
    /// Does nothing while the world is paused.
    pub fn step(&mut self, dt: f32, controls: &Controls) {
        if self.is_paused() {
            return;
        }

        let now = self.clock.now();
        let mut influences = std::mem::take(&mut self.pending);

        let mut colonies = Vec::with_capacity(self.colonies.len());
        let mut blocks = Vec::with_capacity(self.blocks.len());
        let mut entities = Vec::with_capacity(self.entities.len());
        let mut effects = Vec::with_capacity(self.effects.len());
        {
            let mut info = StepInfo {
                locator: Locator::new(
                    &self.blocks,
                    &self.entities,
                    &self.effects,
                    &self.colonies,
                    &self.occupancy,
                ),
                influences: &mut influences,
                rng: &mut self.rng,
                config: &self.config,
                controls,
                now,
                dt,
            };

            // Everyone sees the world as it was at the start of the frame.
            for colony in &self.colonies {
                let mut colony = colony.clone();
                colony.step(&mut info);
                colonies.push(colony);
            }
            for block in &self.blocks {
                let mut block = block.clone();
                block.step(&mut info);
                blocks.push(block);
            }
            for entity in &self.entities {
                let mut entity = entity.clone();
                entity.step(&mut info);
                entities.push(entity);
            }
            for effect in &self.effects {
                let mut effect = effect.clone();
                effect.step(&mut info);
                effects.push(effect);
            }
        }

        self.colonies = colonies;
        self.blocks = blocks;
        self.entities = entities;
        self.effects = effects;

        self.commit(influences);
        self.frame += 1;
    }

    /// Apply influences and drop removed elements.
    fn commit(&mut self, influences: Vec<Influence>) {
        let mut blocks_changed = false;

        for influence in influences {
            use Influence::*;
            match influence {
                SpawnBlock(mut block) => {
                    block.body.id = self.fresh_id();
                    self.blocks.push(block);
                    blocks_changed = true;
                }
                SpawnEntity(mut entity) => {
                    entity.body.id = self.fresh_id();
                    log::debug!(
                        "{} {} appears at {}",
                        entity.kind(),
                        entity.body.id,
                        entity.body.pos()
                    );
                    self.entities.push(entity);
                }
                SpawnEffect(mut effect) => {
                    effect.body.id = self.fresh_id();
                    self.effects.push(effect);
                }
                RemoveBlock(id) => {
                    if let Some(b) = find(&mut self.blocks, id) {
                        b.body.doomed = true;
                    }
                }
                RemoveEntity(id) => {
                    if let Some(e) = find(&mut self.entities, id) {
                        e.body.doomed = true;
                    }
                }
                RemoveEffect(id) => {
                    if let Some(e) = find(&mut self.effects, id) {
                        e.body.doomed = true;
                    }
                }
                Damage { target, amount } => self.damage(target, amount),
                Heal { target, amount } => self.heal(target, amount),
                Harvest { deposit, amount } => {
                    if let Some(b) = find(&mut self.blocks, deposit) {
                        b.take(amount);
                    }
                }
                Deliver { colony, amount } => {
                    match self.colonies.iter_mut().find(|c| c.id == colony) {
                        Some(c) => c.budget += amount.max(0.0),
                        None => log::warn!(
                            "delivery of {amount} to nonexistent {colony}"
                        ),
                    }
                }
                Fund { spawner, amount } => {
                    if let Some(s) =
                        find(&mut self.blocks, spawner).and_then(|b| b.spawner_mut())
                    {
                        s.fund(amount);
                    }
                }
            }
        }

        blocks_changed |= self.blocks.iter().any(|b| b.body.doomed);
        for e in self.entities.iter().filter(|e| e.body.doomed) {
            log::debug!("{} {} is gone", e.kind(), e.body.id);
        }
        self.blocks.retain(|a| !a.body.doomed);
        self.entities.retain(|a| !a.body.doomed);
        self.effects.retain(|a| !a.body.doomed);

        if blocks_changed {
            self.refresh();
        }
    }

    fn damage(&mut self, target: Id, amount: f32) {
        fn hit<T: Element>(items: &mut [T], target: Id, amount: f32) -> bool {
            let Some(a) = find(items, target) else {
                return false;
            };
            let body = a.body_mut();
            body.health.damage(amount);
            if body.health.is_dead() {
                body.doomed = true;
            }
            true
        }

        let _ = hit(&mut self.entities, target, amount)
            || hit(&mut self.blocks, target, amount)
            || hit(&mut self.effects, target, amount);
    }

    fn heal(&mut self, target: Id, amount: f32) {
        fn mend<T: Element>(items: &mut [T], target: Id, amount: f32) -> bool {
            let Some(a) = find(items, target) else {
                return false;
            };
            a.body_mut().health.heal(amount);
            true
        }

        let _ = mend(&mut self.entities, target, amount)
            || mend(&mut self.blocks, target, amount)
            || mend(&mut self.effects, target, amount);
    }

    /// Rebuild the occupancy index from the current blocks.
    pub fn refresh(&mut self) {
        self.occupancy.refresh(&self.blocks);
    }

    /// Queue an influence to be applied at the end of the next frame.
    pub fn queue(&mut self, influence: Influence) {
        self.pending.push(influence);
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Freeze every timer in the world.
    pub fn pause(&mut self) {
        if self.is_paused() {
            return;
        }
        let now = self.clock.now();
        for a in &mut self.blocks {
            a.pause(now);
        }
        for a in &mut self.entities {
            a.pause(now);
        }
        for a in &mut self.effects {
            a.pause(now);
        }
        self.paused_at = Some(now);
        log::info!("paused at frame {}", self.frame);
    }

    /// Resume timers from where `pause` left them.
    pub fn resume(&mut self) {
        if self.paused_at.take().is_none() {
            return;
        }
        let now = self.clock.now();
        for a in &mut self.blocks {
            a.resume(now);
        }
        for a in &mut self.entities {
            a.resume(now);
        }
        for a in &mut self.effects {
            a.resume(now);
        }
        log::info!("resumed at frame {}", self.frame);
    }

    pub fn set_block_props(&mut self, props: BlockProps) {
        self.props = Props::Block(props);
    }

    pub fn set_entity_props(&mut self, props: EntityProps) {
        self.props = Props::Entity(props);
    }

    pub fn set_vfx_props(&mut self, props: EffectProps) {
        self.props = Props::Vfx(props);
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Create the object set with the `set_*_props` methods at `pos`.
    ///
    /// The object appears at the end of the next frame.
    pub fn perform_action(&mut self, pos: Vec2) -> Result<()> {
        let locator = self.locator();
        if !locator.in_bounds(pos) {
            bail!("{pos} is outside the world");
        }
        let now = self.clock.now();

        let influence = match &self.props {
            Props::None => bail!("no action selected"),
            Props::Block(props) => {
                if locator.obstructed(pos) {
                    bail!("{} is already occupied", pos.cell());
                }
                Influence::SpawnBlock(Block::from_props(
                    props,
                    pos.cell().center(),
                    now,
                    &self.config,
                )?)
            }
            Props::Entity(props) => Influence::SpawnEntity(Entity::from_props(
                props,
                pos,
                &self.config,
            )?),
            Props::Vfx(props) => Influence::SpawnEffect(Effect::from_props(
                props,
                pos,
                now,
                &self.config,
            )?),
        };
        self.queue(influence);
        Ok(())
    }

    pub fn locator(&self) -> Locator<'_> {
        Locator::new(
            &self.blocks,
            &self.entities,
            &self.effects,
            &self.colonies,
            &self.occupancy,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn colonies(&self) -> &[Colony] {
        &self.colonies
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Number of frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn views(&self) -> view::Views {
        let now = self.now();
        view::Views {
            blocks: self.blocks.iter().map(|b| view::Block::new(b, now)).collect(),
            entities: self.entities.iter().map(view::Entity::from).collect(),
            vfx: self.effects.iter().map(|e| view::Vfx::new(e, now)).collect(),
        }
    }
}

fn find<T: Element>(items: &mut [T], id: Id) -> Option<&mut T> {
    items.iter_mut().find(|a| a.id() == id)
}
