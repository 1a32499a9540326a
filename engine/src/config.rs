use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use util::IndexMap;

use crate::{EntityType, Result, Signal};

/// Tuning values for the simulation.
///
/// Every field has a default, a config file only needs to list the values
/// it changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    // Movement
    pub worker_speed: f32,
    pub warrior_speed: f32,
    pub player_speed: f32,
    pub hostile_speed: f32,
    /// Relative random deviation from the base speed picked per entity.
    pub speed_jitter: f32,
    pub arrival_threshold: f32,

    // Bodies
    pub entity_radius: f32,
    pub block_radius: f32,
    pub worker_health: f32,
    pub warrior_health: f32,
    pub player_health: f32,
    pub hostile_health: f32,
    pub block_health: f32,

    // Perception and planning
    pub sight_radius: f32,
    pub sense_radius: f32,
    pub flee_radius: f32,
    pub search_radius: f32,
    pub wander_radius: f32,
    pub wander_retries: usize,
    pub flee_distance: f32,
    /// Full width of the cone fleeing mobs pick their direction from, in
    /// degrees.
    pub flee_cone: f32,

    // Work
    pub worker_capacity: f32,
    pub harvest_rate: f32,
    pub deposit_amount: f32,
    pub deposit_regen: f32,

    // Combat
    pub reach: f32,
    pub attack_damage: f32,
    pub attack_cooldown: f64,
    /// Health ratio under which warriors retreat home.
    pub retreat_ratio: f32,
    pub home_heal_rate: f32,

    // Signals
    pub pheromone_strength: f32,
    pub pheromone_lifetime: f64,
    pub emit_interval: f64,
    pub vfx_lifetime: f64,

    // Player
    pub sprint_factor: f32,
    pub sprint_duration: f64,
    pub sprint_cooldown: f64,

    // Colonies and spawners
    pub spawner_period: f64,
    pub spawner_cost: f32,
    pub build_cost: f32,

    /// Pheromone weights for each goal a mob can pursue while wandering.
    pub weights: IndexMap<Goal, WeightTable>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            worker_speed: 3.0,
            warrior_speed: 3.5,
            player_speed: 4.0,
            hostile_speed: 2.5,
            speed_jitter: 0.2,
            arrival_threshold: 0.1,

            entity_radius: 0.35,
            block_radius: 0.5,
            worker_health: 20.0,
            warrior_health: 40.0,
            player_health: 50.0,
            hostile_health: 30.0,
            block_health: 100.0,

            sight_radius: 8.0,
            sense_radius: 6.0,
            flee_radius: 3.0,
            search_radius: 12.0,
            wander_radius: 5.0,
            wander_retries: 4,
            flee_distance: 5.0,
            flee_cone: 90.0,

            worker_capacity: 10.0,
            harvest_rate: 5.0,
            deposit_amount: 50.0,
            deposit_regen: 0.0,

            reach: 1.0,
            attack_damage: 5.0,
            attack_cooldown: 1.0,
            retreat_ratio: 0.3,
            home_heal_rate: 5.0,

            pheromone_strength: 1.0,
            pheromone_lifetime: 20.0,
            emit_interval: 2.0,
            vfx_lifetime: 0.5,

            sprint_factor: 2.0,
            sprint_duration: 1.5,
            sprint_cooldown: 4.0,

            spawner_period: 10.0,
            spawner_cost: 10.0,
            build_cost: 30.0,

            weights: Goal::default_weights(),
        }
    }
}

impl Config {
    /// Load a config from an IDM file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let ret: Config = idm::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(ret)
    }

    pub fn speed(&self, kind: EntityType) -> f32 {
        match kind {
            EntityType::Worker => self.worker_speed,
            EntityType::Warrior => self.warrior_speed,
            EntityType::Player => self.player_speed,
            EntityType::Hostile => self.hostile_speed,
        }
    }

    pub fn health(&self, kind: EntityType) -> f32 {
        match kind {
            EntityType::Worker => self.worker_health,
            EntityType::Warrior => self.warrior_health,
            EntityType::Player => self.player_health,
            EntityType::Hostile => self.hostile_health,
        }
    }

    /// Weight table for a goal, an empty table if the config omits it.
    pub fn weights(&self, goal: Goal) -> WeightTable {
        self.weights.get(&goal).cloned().unwrap_or_default()
    }
}

/// What a wandering mob is looking for, selects the pheromone weights.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Goal {
    Explore,
    Gather,
    Homeward,
    Hunt,
}

impl Goal {
    fn default_weights() -> IndexMap<Goal, WeightTable> {
        use Signal::*;

        let mut ret = IndexMap::default();
        ret.insert(
            Goal::Explore,
            WeightTable::new(0.7)
                .with(Weight::repel(Explore, 0.1))
                .with(Weight::repel(Danger, 0.2)),
        );
        ret.insert(
            Goal::Gather,
            WeightTable::new(0.4)
                .with(Weight::attract(Resource, 0.5))
                .with(Weight::repel(Danger, 0.1)),
        );
        ret.insert(
            Goal::Homeward,
            WeightTable::new(0.3)
                .with(Weight::attract(Home, 0.6))
                .with(Weight::repel(Danger, 0.1)),
        );
        ret.insert(
            Goal::Hunt,
            WeightTable::new(0.4)
                .with(Weight::attract(Battle, 0.4))
                .with(Weight::attract(Danger, 0.2)),
        );
        ret
    }
}

/// Relative pull of one signal type.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Weight {
    pub signal: Signal,
    pub weight: f32,
    /// Move away from the signal instead of towards it.
    #[serde(default)]
    pub repel: bool,
}

impl Weight {
    pub fn attract(signal: Signal, weight: f32) -> Self {
        Weight {
            signal,
            weight,
            repel: false,
        }
    }

    pub fn repel(signal: Signal, weight: f32) -> Self {
        Weight {
            signal,
            weight,
            repel: true,
        }
    }
}

/// Signal weights for one goal.
///
/// The random exploration weight and the signal weights are expected to sum
/// to 1.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WeightTable {
    pub random: f32,
    pub signals: Vec<Weight>,
}

impl Default for WeightTable {
    fn default() -> Self {
        WeightTable {
            random: 1.0,
            signals: Vec::new(),
        }
    }
}

impl WeightTable {
    pub fn new(random: f32) -> Self {
        WeightTable {
            random,
            signals: Vec::new(),
        }
    }

    pub fn with(mut self, weight: Weight) -> Self {
        self.signals.push(weight);
        self
    }

    pub fn get(&self, signal: Signal) -> Option<&Weight> {
        self.signals.iter().find(|w| w.signal == signal)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn default_tables_sum_to_one() {
        let config = Config::default();
        for goal in Goal::iter() {
            let table = config.weights(goal);
            let sum: f32 =
                table.random + table.signals.iter().map(|w| w.weight).sum::<f32>();
            assert!((sum - 1.0).abs() < 1e-6, "{goal} weights sum to {sum}");
        }
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "worker-speed": 9.0 }"#).unwrap();
        assert_eq!(config.worker_speed, 9.0);
        assert_eq!(config.warrior_speed, Config::default().warrior_speed);
        assert_eq!(config.weights.len(), Config::default().weights.len());
    }
}
