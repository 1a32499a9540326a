//! ASCII level descriptions.
use std::path::Path;

use anyhow::{bail, Context};
use glam::{ivec2, IVec2, Vec2};
use serde::{Deserialize, Serialize};
use util::{HashMap, IndexMap, Logos, VecExt};

use crate::{
    Block, BlockProps, BlockType, Cadence, Colony, ColonyId, Config, Entity,
    EntityProps, EntityType, Focus, Instant, Result, MIN_WORLD_SIZE,
};

/// Starting setup of a world.
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorldSpec {
    pub seed: Logos,
    /// Rows of map characters, see `Placement` for what they mean.
    pub map: String,
    pub legend: IndexMap<char, Placement>,
    pub colonies: Vec<ColonySpec>,
}

/// What a legend character puts on the map.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Placement {
    pub block: Option<BlockType>,
    pub entity: Option<EntityType>,
    /// Name of the owning colony.
    pub owner: Option<String>,
    pub cadence: Option<Cadence>,
    pub spawns: Option<EntityType>,
    pub amount: Option<f32>,
    pub limit: Option<u32>,
}

#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ColonySpec {
    pub name: String,
    pub focus: Focus,
    pub budget: f32,
}

/// Everything a world starts with, built from a `WorldSpec`.
#[derive(Clone, Debug)]
pub(crate) struct Population {
    pub size: IVec2,
    pub colonies: Vec<Colony>,
    pub blocks: Vec<Block>,
    pub entities: Vec<Entity>,
}

impl WorldSpec {
    pub fn new(map: impl Into<String>) -> Self {
        WorldSpec {
            map: map.into(),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: Logos) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_legend(mut self, c: char, placement: Placement) -> Self {
        self.legend.insert(c, placement);
        self
    }

    pub fn with_colony(mut self, name: &str, focus: Focus, budget: f32) -> Self {
        self.colonies.push(ColonySpec {
            name: name.into(),
            focus,
            budget,
        });
        self
    }

    /// Load a level from an IDM file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading level {}", path.display()))?;
        let ret: WorldSpec = idm::from_str(&text)
            .with_context(|| format!("parsing level {}", path.display()))?;
        Ok(ret)
    }

    fn rows(&self) -> Vec<Vec<char>> {
        self.map
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect()
    }

    /// World dimensions in tiles.
    pub fn size(&self) -> Result<IVec2> {
        let rows = self.rows();
        let size = ivec2(
            rows.iter().map(|r| r.len()).max().unwrap_or(0) as i32,
            rows.len() as i32,
        );
        if size.x < MIN_WORLD_SIZE || size.y < MIN_WORLD_SIZE {
            bail!(
                "map is {}x{}, must be at least {MIN_WORLD_SIZE}x{MIN_WORLD_SIZE}",
                size.x,
                size.y
            );
        }
        Ok(size)
    }

    pub(crate) fn populate(
        &self,
        config: &Config,
        now: Instant,
    ) -> Result<Population> {
        let size = self.size()?;

        let mut ids: HashMap<&str, ColonyId> = HashMap::default();
        for (i, spec) in self.colonies.iter().enumerate() {
            if ids.insert(spec.name.as_str(), ColonyId(i as u32)).is_some() {
                bail!("duplicate colony {:?}", spec.name);
            }
        }
        let owner_id = |name: &Option<String>| -> Result<Option<ColonyId>> {
            match name {
                None => Ok(None),
                Some(name) => match ids.get(name.as_str()) {
                    Some(&id) => Ok(Some(id)),
                    None => bail!("unknown owner colony {name:?}"),
                },
            }
        };

        let mut blocks = Vec::new();
        let mut entities = Vec::new();
        for (y, row) in self.rows().iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                let cell = ivec2(x as i32, y as i32);
                let pos = cell.center();
                match c {
                    '.' | ' ' => {}
                    '#' => blocks.push(Block::wall(pos, config)),
                    '*' => blocks.push(Block::deposit(
                        pos,
                        config.deposit_amount,
                        config,
                    )),
                    c => {
                        let Some(placement) = self.legend.get(&c) else {
                            bail!("unknown map token {c:?} at {cell}");
                        };
                        let owner = owner_id(&placement.owner)
                            .with_context(|| format!("placing {c:?} at {cell}"))?;
                        match (placement.block, placement.entity) {
                            (Some(kind), None) => {
                                let props = BlockProps {
                                    kind,
                                    owner,
                                    amount: placement.amount,
                                    cadence: placement.cadence,
                                    spawns: placement.spawns,
                                    limit: placement.limit,
                                };
                                blocks.push(Block::from_props(
                                    &props, pos, now, config,
                                )?);
                            }
                            (None, Some(kind)) => {
                                let props = EntityProps { kind, owner };
                                entities
                                    .push(Entity::from_props(&props, pos, config)?);
                            }
                            _ => bail!(
                                "legend entry {c:?} must place exactly one block or entity"
                            ),
                        }
                    }
                }
            }
        }

        let middle = center(size);
        let colonies = self
            .colonies
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let id = ColonyId(i as u32);
                let home = blocks
                    .iter()
                    .find(|b| {
                        b.kind() == BlockType::Home && b.body.owner == Some(id)
                    })
                    .map_or(middle, |b| b.body.pos());
                Colony::new(id, spec.name.clone(), home)
                    .with_focus(spec.focus)
                    .with_budget(spec.budget)
            })
            .collect();

        Ok(Population {
            size,
            colonies,
            blocks,
            entities,
        })
    }
}

impl Placement {
    pub fn block(kind: BlockType) -> Self {
        Placement {
            block: Some(kind),
            ..Default::default()
        }
    }

    pub fn entity(kind: EntityType) -> Self {
        Placement {
            entity: Some(kind),
            ..Default::default()
        }
    }

    pub fn owned_by(mut self, owner: &str) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = Some(cadence);
        self
    }
}

/// Center point of the world.
pub(crate) fn center(size: IVec2) -> Vec2 {
    size.as_vec2() / 2.0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MAP: &str = "\
######
#.H.W#
#....#
#*..*#
######";

    fn spec() -> WorldSpec {
        WorldSpec::new(MAP)
            .with_legend('H', Placement::block(BlockType::Home).owned_by("ants"))
            .with_legend(
                'W',
                Placement::entity(EntityType::Worker).owned_by("ants"),
            )
            .with_colony("ants", Focus::Breed, 5.0)
    }

    #[test]
    fn populates_map() {
        let pop = spec().populate(&Config::default(), Instant::default()).unwrap();
        assert_eq!(pop.size, ivec2(6, 5));
        // 18 walls, 2 deposits, 1 home.
        assert_eq!(pop.blocks.len(), 21);
        assert_eq!(pop.entities.len(), 1);
        assert_eq!(pop.entities[0].body.pos(), Vec2::new(4.5, 1.5));
        assert_eq!(pop.colonies.len(), 1);
        assert_eq!(pop.colonies[0].home, Vec2::new(2.5, 1.5));
        assert_eq!(pop.colonies[0].budget, 5.0);
    }

    #[test]
    fn home_defaults_to_center() {
        let spec = WorldSpec::new("....\n....\n....\n....")
            .with_colony("ants", Focus::Hoard, 0.0);
        let pop = spec.populate(&Config::default(), Instant::default()).unwrap();
        assert_eq!(pop.colonies[0].home, center(ivec2(4, 4)));
    }

    #[test]
    fn rejects_bad_levels() {
        let c = Config::default();
        let now = Instant::default();

        assert!(WorldSpec::new("...\n...\n...").populate(&c, now).is_err());
        assert!(WorldSpec::new("....\n..?.\n....\n....")
            .populate(&c, now)
            .is_err());

        let unknown_owner = WorldSpec::new("....\n.H..\n....\n....").with_legend(
            'H',
            Placement::block(BlockType::Home).owned_by("bees"),
        );
        assert!(unknown_owner.populate(&c, now).is_err());

        let twice = spec().with_colony("ants", Focus::Expand, 0.0);
        assert!(twice.populate(&c, now).is_err());

        let both = WorldSpec::new("....\n.X..\n....\n....").with_legend(
            'X',
            Placement {
                block: Some(BlockType::Wall),
                entity: Some(EntityType::Hostile),
                ..Default::default()
            },
        );
        assert!(both.populate(&c, now).is_err());
    }

    #[test]
    fn deserializes() {
        let spec: WorldSpec = serde_json::from_str(
            r#"{
                "seed": "ANTS",
                "map": "....\n.s..\n....\n....",
                "legend": {
                    "s": {
                        "block": "spawner",
                        "owner": "ants",
                        "cadence": { "threshold": { "cost": 5.0 } },
                        "spawns": "warrior"
                    }
                },
                "colonies": [{ "name": "ants", "focus": "expand" }]
            }"#,
        )
        .unwrap();
        let pop = spec.populate(&Config::default(), Instant::default()).unwrap();
        let spawner = pop.blocks[0].spawner_ref().unwrap();
        assert_eq!(spawner.spawns, EntityType::Warrior);
        assert_eq!(spawner.cadence, Cadence::Threshold { cost: 5.0 });
        assert_eq!(pop.colonies[0].focus, Focus::Expand);
    }
}
