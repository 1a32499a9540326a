use engine::{prelude::*, Behavior, Goal, Mind, PheromoneAnalyzer};
use pretty_assertions::assert_eq;
use util::{srng, HashSet};

const DT: f32 = 0.1;

struct Sim {
    world: World,
    clock: ManualClock,
}

impl Sim {
    fn new(spec: &WorldSpec) -> Self {
        Sim::with_config(spec, Config::default())
    }

    fn with_config(spec: &WorldSpec, config: Config) -> Self {
        let clock = ManualClock::default();
        let world =
            World::build(spec, config, clock.clone()).expect("valid level");
        Sim { world, clock }
    }

    fn run(&mut self, frames: usize, controls: &Controls) {
        for _ in 0..frames {
            self.clock.advance(DT as f64);
            self.world.step(DT, controls);
        }
    }

    fn idle(&mut self, frames: usize) {
        self.run(frames, &Controls::default());
    }
}

fn open_map(size: usize) -> String {
    vec![".".repeat(size); size].join("\n")
}

fn map_with(size: usize, items: &[(usize, usize, char)]) -> String {
    let mut rows: Vec<Vec<char>> = vec![vec!['.'; size]; size];
    for &(x, y, c) in items {
        rows[y][x] = c;
    }
    rows.into_iter()
        .map(|r| r.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn single_block_obstructs_its_cell() {
    let world = World::new(&WorldSpec::new(map_with(10, &[(3, 3, '#')])))
        .unwrap();
    let loc = world.locator();
    assert_eq!(loc.size(), ivec2(10, 10));
    assert!(loc.obstructed(vec2(3.0, 3.0)));
    assert!(!loc.obstructed(vec2(3.0, 4.0)));
}

#[test]
fn path_detours_around_block() {
    let world = World::new(&WorldSpec::new(map_with(10, &[(2, 0, '#')])))
        .unwrap();
    let loc = world.locator();
    let (origin, target) = (vec2(0.0, 0.0), vec2(5.0, 0.0));

    let mut sampled = Vec::new();
    assert!(loc.obstructed_segment(origin, Vec2::X, 5.0, &mut sampled));

    let mut path = Path::default();
    assert!(path.generate_path_to(&loc, origin, target, false, 20.0));
    assert_eq!(path.destination(), target);
    for seg in path.segments() {
        let steps = (seg.length / 0.05) as usize;
        for i in 0..=steps {
            let p = seg.start + seg.direction * (i as f32 * 0.05);
            assert_ne!(p.cell(), ivec2(2, 0), "path crosses the block at {p}");
        }
    }
}

/// Run one decision for an entity against a world's current state.
fn decide_in(world: &World, entity: &mut Entity) -> Vec<Influence> {
    let mut influences = Vec::new();
    let mut rng = srng(&1);
    let controls = Controls::default();
    let mut info = StepInfo {
        locator: world.locator(),
        influences: &mut influences,
        rng: &mut rng,
        config: world.config(),
        controls: &controls,
        now: world.now(),
        dt: DT,
    };
    entity
        .behavior
        .decide(&entity.body, &mut entity.path, &mut info);
    influences
}

#[test]
fn full_worker_goes_for_visible_deposit() {
    let spec = WorldSpec::new(map_with(10, &[(2, 2, 'W'), (6, 2, '*')]))
        .with_legend('W', Placement::entity(EntityType::Worker).owned_by("ants"))
        .with_colony("ants", Focus::Breed, 0.0);
    let world = World::new(&spec).unwrap();

    let mut worker = world.entities()[0].clone();
    let Behavior::Worker(w) = &mut worker.behavior else {
        panic!("not a worker");
    };
    w.set_cargo(1000.0);
    assert!(w.is_full());
    assert_eq!(worker.state(), Some(MobState::Wander));

    let influences = decide_in(&world, &mut worker);

    assert_eq!(worker.state(), Some(MobState::Collect));
    assert!(!worker.path.is_empty());
    let end = worker.path.destination().cell();
    assert_eq!((end - ivec2(6, 2)).chess_len(), 1);

    // Entering a new state leaves a matching trail marker.
    assert!(influences.iter().any(|i| matches!(
        i,
        Influence::SpawnEffect(e) if e.signal() == Some(Signal::Resource)
    )));
}

#[test]
fn workers_bring_resources_home() {
    let spec = WorldSpec::new(map_with(
        8,
        &[(1, 1, 'H'), (2, 1, 'W'), (4, 1, '*')],
    ))
    .with_legend('H', Placement::block(BlockType::Home).owned_by("ants"))
    .with_legend('W', Placement::entity(EntityType::Worker).owned_by("ants"))
    .with_colony("ants", Focus::Hoard, 0.0);
    let mut sim = Sim::new(&spec);

    sim.idle(300);
    assert!(sim.world.colonies()[0].budget > 0.0);
    let deposit = sim
        .world
        .blocks()
        .iter()
        .find(|b| b.kind() == BlockType::Deposit)
        .unwrap();
    assert!(deposit.deposit_amount().unwrap() < Config::default().deposit_amount);
}

#[test]
fn workers_without_home_block_return_to_colony_home() {
    let spec = WorldSpec::new(map_with(8, &[(2, 1, 'W'), (4, 1, '*')]))
        .with_legend('W', Placement::entity(EntityType::Worker).owned_by("ants"))
        .with_colony("ants", Focus::Hoard, 0.0);
    let mut sim = Sim::new(&spec);
    assert_eq!(sim.world.colonies()[0].home, vec2(4.0, 4.0));

    let mut returning = false;
    for _ in 0..300 {
        sim.idle(1);
        returning |= sim.world.entities()[0].state() == Some(MobState::Return);
    }
    assert!(returning);
    assert!(sim.world.colonies()[0].budget > 0.0);
}

#[test]
fn collecting_worker_flees_from_hostile() {
    let calm = WorldSpec::new(map_with(10, &[(2, 2, 'W'), (2, 6, '*')]))
        .with_legend('W', Placement::entity(EntityType::Worker).owned_by("ants"))
        .with_colony("ants", Focus::Hoard, 0.0);
    let world = World::new(&calm).unwrap();
    let mut worker = world.entities()[0].clone();
    decide_in(&world, &mut worker);
    assert_eq!(worker.state(), Some(MobState::Collect));

    let threat = vec2(1.5, 2.5);
    let before = worker.path.destination().distance(threat);

    let danger = WorldSpec::new(map_with(
        10,
        &[(2, 2, 'W'), (2, 6, '*'), (1, 2, 'h')],
    ))
    .with_legend('W', Placement::entity(EntityType::Worker).owned_by("ants"))
    .with_legend('h', Placement::entity(EntityType::Hostile))
    .with_colony("ants", Focus::Hoard, 0.0);
    let world = World::new(&danger).unwrap();
    let influences = decide_in(&world, &mut worker);

    assert_eq!(worker.state(), Some(MobState::Flee));
    let after = worker.path.destination().distance(threat);
    assert!(after > before, "fled to {after}, was heading to {before}");
    assert!(influences.iter().any(|i| matches!(
        i,
        Influence::SpawnEffect(e) if e.signal() == Some(Signal::Danger)
    )));
}

#[test]
fn breeding_colony_funds_threshold_spawner() {
    let spec = WorldSpec::new(map_with(8, &[(4, 4, 's')]))
        .with_legend(
            's',
            Placement::block(BlockType::Spawner)
                .owned_by("ants")
                .with_cadence(Cadence::Threshold { cost: 10.0 }),
        )
        .with_colony("ants", Focus::Breed, 25.0);
    let mut sim = Sim::new(&spec);
    let ants = sim.world.colonies()[0].id;

    sim.idle(10);
    assert_eq!(sim.world.colonies()[0].budget, 0.0);
    let spawner = sim.world.blocks()[0].spawner_ref().unwrap();
    assert_eq!(spawner.spawned(), 2);
    assert_eq!(spawner.meter(), 5.0);
    assert_eq!(sim.world.entities().len(), 2);
    for e in sim.world.entities() {
        assert_eq!(e.kind(), EntityType::Worker);
        assert_eq!(e.body.owner, Some(ants));
    }
}

#[test]
fn warrior_beats_hostile() {
    let spec = WorldSpec::new(map_with(8, &[(2, 2, 'A'), (3, 2, 'h')]))
        .with_legend('A', Placement::entity(EntityType::Warrior).owned_by("ants"))
        .with_legend('h', Placement::entity(EntityType::Hostile))
        .with_colony("ants", Focus::Hoard, 0.0);
    let mut sim = Sim::new(&spec);

    sim.idle(1);
    assert!(sim
        .world
        .entities()
        .iter()
        .all(|e| e.state() == Some(MobState::Fight)));

    sim.idle(100);
    let kinds: Vec<EntityType> =
        sim.world.entities().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![EntityType::Warrior]);
}

#[test]
fn commit_keeps_ids_unique() {
    let spec = WorldSpec::new(map_with(8, &[(4, 4, 's'), (1, 1, 'W')]))
        .with_legend(
            's',
            Placement::block(BlockType::Spawner)
                .owned_by("ants")
                .with_cadence(Cadence::Interval { period: 0.5 }),
        )
        .with_legend('W', Placement::entity(EntityType::Worker).owned_by("ants"))
        .with_colony("ants", Focus::Hoard, 0.0);
    let mut sim = Sim::new(&spec);

    sim.idle(30);
    let w = &sim.world;
    assert!(w.entities().len() > 1);

    let mut seen = HashSet::default();
    let all = w
        .blocks()
        .iter()
        .map(|a| (a.body.id, a.body.is_doomed()))
        .chain(w.entities().iter().map(|a| (a.body.id, a.body.is_doomed())))
        .chain(w.effects().iter().map(|a| (a.body.id, a.body.is_doomed())));
    for (id, doomed) in all {
        assert!(id.is_assigned());
        assert!(!doomed);
        assert!(seen.insert(id), "{id} appears twice");
    }

    // Removing the same thing twice, or something that isn't there, is fine.
    let n = sim.world.entities().len();
    let id = sim.world.entities()[0].body.id;
    sim.world.queue(Influence::RemoveEntity(id));
    sim.world.queue(Influence::RemoveEntity(id));
    sim.world.queue(Influence::RemoveEntity(Id::default()));
    sim.world.step(0.0, &Controls::default());
    assert!(sim.world.entities().iter().all(|e| e.body.id != id));
    assert!(sim.world.entities().len() >= n - 1);
}

#[test]
fn pause_does_not_shift_spawner_schedule() {
    let spec = WorldSpec::new(map_with(8, &[(4, 4, 's')]))
        .with_legend(
            's',
            Placement::block(BlockType::Spawner)
                .owned_by("ants")
                .with_cadence(Cadence::Interval { period: 10.0 }),
        )
        .with_colony("ants", Focus::Hoard, 0.0);
    let mut sim = Sim::new(&spec);

    sim.clock.advance(4.0);
    sim.world.step(DT, &Controls::default());
    sim.world.pause();
    assert!(sim.world.is_paused());

    sim.clock.advance(100.0);
    let frame = sim.world.frame();
    sim.world.step(DT, &Controls::default());
    assert_eq!(sim.world.frame(), frame);

    sim.world.resume();
    let spawner = sim.world.blocks()[0].spawner_ref().unwrap();
    let left = spawner.remaining(sim.world.now()).unwrap();
    assert!((left - 6.0).abs() < 1e-6);

    sim.clock.advance(5.9);
    sim.world.step(DT, &Controls::default());
    assert!(sim.world.entities().is_empty());

    sim.clock.advance(0.2);
    sim.world.step(DT, &Controls::default());
    assert_eq!(sim.world.entities().len(), 1);
}

#[test]
fn analyzer_without_signals_returns_candidate() {
    let config = Config::default();
    for goal in [Goal::Explore, Goal::Gather, Goal::Homeward, Goal::Hunt] {
        let a = PheromoneAnalyzer::new(config.weights(goal), vec2(3.0, 3.0));
        assert_eq!(a.compute_target(vec2(7.25, 1.5)), vec2(7.25, 1.5));
    }
}

#[test]
fn blocks_come_and_go_through_commits() {
    let mut sim = Sim::new(&WorldSpec::new(open_map(10)));
    let p = vec2(4.2, 6.7);

    sim.world.set_block_props(BlockProps::new(BlockType::Wall));
    sim.world.perform_action(p).unwrap();
    // Queued, not applied yet.
    assert!(!sim.world.locator().obstructed(p));
    sim.idle(1);
    assert!(sim.world.locator().obstructed(p));
    assert!(sim.world.perform_action(p).is_err());

    let id = sim.world.blocks()[0].body.id;
    sim.world.queue(Influence::RemoveBlock(id));
    sim.idle(1);
    assert!(!sim.world.locator().obstructed(p));
    assert!(sim.world.blocks().is_empty());
}

#[test]
fn actions_need_valid_props() {
    let mut sim = Sim::new(&WorldSpec::new(open_map(6)));
    assert!(sim.world.perform_action(vec2(1.0, 1.0)).is_err());

    // Workers need an owner.
    sim.world.set_entity_props(EntityProps::new(EntityType::Worker));
    assert!(sim.world.perform_action(vec2(1.0, 1.0)).is_err());

    sim.world.set_entity_props(EntityProps::new(EntityType::Hostile));
    assert!(sim.world.perform_action(vec2(-1.0, 1.0)).is_err());
    sim.world.perform_action(vec2(1.5, 1.5)).unwrap();

    sim.world.set_vfx_props(EffectProps::vfx(VfxKind::Flash));
    sim.world.perform_action(vec2(2.5, 2.5)).unwrap();

    sim.idle(1);
    assert_eq!(sim.world.entities().len(), 1);
    assert_eq!(sim.world.effects().len(), 1);
    assert_eq!(sim.world.views().vfx.len(), 1);

    // Flashes fade out on their own.
    sim.idle(20);
    assert!(sim.world.effects().is_empty());
}

#[test]
fn player_stops_at_walls() {
    let spec = WorldSpec::new(map_with(8, &[(1, 1, 'P'), (4, 1, '#')]))
        .with_legend('P', Placement::entity(EntityType::Player));
    let mut sim = Sim::new(&spec);

    sim.run(50, &Controls::towards(Vec2::X));
    let player = &sim.world.entities()[0];
    assert_eq!(player.body.cell(), ivec2(3, 1));
}

#[test]
fn sprinting_speeds_up_player() {
    let spec = WorldSpec::new(map_with(8, &[(1, 1, 'P')]))
        .with_legend('P', Placement::entity(EntityType::Player));
    let config = Config {
        speed_jitter: 0.0,
        ..Default::default()
    };
    let factor = config.sprint_factor;
    let mut sim = Sim::with_config(&spec, config);

    let start = sim.world.entities()[0].body.pos();
    sim.run(
        1,
        &Controls {
            direction: Vec2::X,
            sprint: true,
        },
    );
    let player = &sim.world.entities()[0];
    let base = player.base_speed().unwrap();
    let moved = player.body.pos().distance(start);
    assert!((moved - base * factor * DT).abs() < 1e-4);
}

#[test]
fn bad_levels_fail_to_load() {
    assert!(World::new(&WorldSpec::new(open_map(3))).is_err());
    assert!(World::new(&WorldSpec::new(map_with(6, &[(2, 2, 'Q')]))).is_err());
    let dup = WorldSpec::new(open_map(6))
        .with_colony("ants", Focus::Breed, 0.0)
        .with_colony("ants", Focus::Hoard, 0.0);
    assert!(World::new(&dup).is_err());
}

#[test]
fn deliveries_fill_colony_budget() {
    let mut sim = Sim::new(
        &WorldSpec::new(open_map(6)).with_colony("ants", Focus::Hoard, 1.0),
    );
    let id = sim.world.colonies()[0].id;
    sim.world.queue(Influence::Deliver {
        colony: id,
        amount: 2.0,
    });
    sim.idle(1);
    assert_eq!(sim.world.colonies()[0].budget, 3.0);
}
