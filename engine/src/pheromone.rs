use glam::Vec2;
use util::HashMap;

use crate::{Effect, Signal, WeightTable};

#[derive(Copy, Clone, Default, Debug)]
struct Accumulator {
    weighted_sum: Vec2,
    strength: f32,
    count: usize,
}

impl Accumulator {
    fn centroid(&self) -> Option<Vec2> {
        (self.strength > 0.0).then(|| self.weighted_sum / self.strength)
    }
}

/// Blends perceived pheromone signals into a movement target.
///
/// Built for one decision and then dropped. Each signal type collapses to a
/// strength-weighted centroid, the centroids are mixed with a random
/// candidate point using the goal's weight table. Weight of signal types that
/// weren't perceived is handed to the perceived ones in proportion to their
/// own weights.
#[derive(Clone, Debug)]
pub struct PheromoneAnalyzer {
    table: WeightTable,
    origin: Vec2,
    signals: HashMap<Signal, Accumulator>,
}

impl PheromoneAnalyzer {
    /// Start an analysis for an agent standing at `origin`.
    pub fn new(table: WeightTable, origin: Vec2) -> Self {
        PheromoneAnalyzer {
            table,
            origin,
            signals: Default::default(),
        }
    }

    pub fn accumulate(&mut self, signal: Signal, pos: Vec2, strength: f32) {
        if strength <= 0.0 {
            return;
        }
        let acc = self.signals.entry(signal).or_default();
        acc.weighted_sum += pos * strength;
        acc.strength += strength;
        acc.count += 1;
    }

    /// Accumulate a pheromone effect, other effects are skipped.
    pub fn feed(&mut self, effect: &Effect) {
        if let Some(signal) = effect.signal() {
            self.accumulate(signal, effect.body.pos(), effect.strength());
        }
    }

    /// Number of signals accumulated for a type.
    pub fn count(&self, signal: Signal) -> usize {
        self.signals.get(&signal).map_or(0, |a| a.count)
    }

    pub fn compute_target(&self, candidate: Vec2) -> Vec2 {
        let observed = |s: Signal| {
            self.signals.get(&s).and_then(Accumulator::centroid)
        };

        let budget: f32 = self.table.signals.iter().map(|w| w.weight).sum();
        let observed_weight: f32 = self
            .table
            .signals
            .iter()
            .filter(|w| observed(w.signal).is_some())
            .map(|w| w.weight)
            .sum();
        if observed_weight <= 0.0 {
            return candidate;
        }

        let mut sum = candidate * self.table.random;
        let mut total = self.table.random;
        for w in &self.table.signals {
            let Some(mut c) = observed(w.signal) else {
                continue;
            };
            if w.repel {
                c = 2.0 * self.origin - c;
            }
            let weight = w.weight * budget / observed_weight;
            sum += c * weight;
            total += weight;
        }

        if total <= 0.0 {
            candidate
        } else {
            sum / total
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;
    use crate::Weight;

    fn near(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn no_signals_keeps_candidate() {
        let a = PheromoneAnalyzer::new(
            WeightTable::new(0.4).with(Weight::attract(Signal::Resource, 0.6)),
            vec2(1.0, 1.0),
        );
        assert_eq!(a.compute_target(vec2(3.25, -7.5)), vec2(3.25, -7.5));
    }

    #[test]
    fn unweighted_signals_are_ignored() {
        let mut a = PheromoneAnalyzer::new(
            WeightTable::new(0.4).with(Weight::attract(Signal::Resource, 0.6)),
            vec2(0.0, 0.0),
        );
        a.accumulate(Signal::Danger, vec2(5.0, 5.0), 1.0);
        assert_eq!(a.compute_target(vec2(2.0, 0.0)), vec2(2.0, 0.0));
    }

    #[test]
    fn centroid_is_strength_weighted() {
        let mut a = PheromoneAnalyzer::new(
            WeightTable::new(0.5).with(Weight::attract(Signal::Home, 0.5)),
            vec2(0.0, 0.0),
        );
        a.accumulate(Signal::Home, vec2(0.0, 0.0), 1.0);
        a.accumulate(Signal::Home, vec2(4.0, 0.0), 3.0);
        assert_eq!(a.count(Signal::Home), 2);
        // Centroid at (3, 0), halfway with the candidate at (1, 0).
        assert!(near(a.compute_target(vec2(1.0, 0.0)), vec2(2.0, 0.0)));
    }

    #[test]
    fn missing_weight_is_redistributed() {
        let table = WeightTable::new(0.2)
            .with(Weight::attract(Signal::Resource, 0.4))
            .with(Weight::attract(Signal::Home, 0.4));
        let mut a = PheromoneAnalyzer::new(table, vec2(0.0, 0.0));
        a.accumulate(Signal::Resource, vec2(10.0, 0.0), 1.0);
        // Resource gets the full 0.8 signal budget against the 0.2 random.
        assert!(near(a.compute_target(vec2(0.0, 0.0)), vec2(8.0, 0.0)));
    }

    #[test]
    fn repelling_mirrors_about_origin() {
        let table =
            WeightTable::new(0.5).with(Weight::repel(Signal::Danger, 0.5));
        let mut a = PheromoneAnalyzer::new(table, vec2(2.0, 2.0));
        a.accumulate(Signal::Danger, vec2(4.0, 2.0), 1.0);
        assert!(near(a.compute_target(vec2(2.0, 2.0)), vec2(1.0, 2.0)));
    }
}
