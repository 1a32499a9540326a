//! Planned trajectories made of straight segments.
use glam::{IVec2, Vec2};
use util::{PointExt, VecExt};

use crate::{bounded_astar, Locator};

/// Straight leg of a path.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
    /// Unit direction, zero for a zero-length segment.
    pub direction: Vec2,
    pub length: f32,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        let (direction, length) = (end - start).split_direction();
        Segment {
            start,
            end,
            direction,
            length,
        }
    }

    fn point_at(&self, distance: f32) -> Vec2 {
        self.start + self.direction * distance
    }
}

/// A trajectory being followed by an entity.
///
/// Progress is kept as the index of the current segment and the distance
/// traveled along it, so traversal never drifts off the planned legs.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Path {
    origin: Vec2,
    segments: Vec<Segment>,
    index: usize,
    progress: f32,
    /// Points sampled while probing for obstructions, kept for debug display.
    passage: Vec<Vec2>,
}

impl Path {
    pub fn new(origin: Vec2) -> Self {
        Path {
            origin,
            ..Default::default()
        }
    }

    /// Drop all segments and start over from `origin`.
    pub fn clear(&mut self, origin: Vec2) {
        self.origin = origin;
        self.segments.clear();
        self.index = 0;
        self.progress = 0.0;
        self.passage.clear();
    }

    /// Append a segment from the current destination to `target`.
    pub fn add(&mut self, target: Vec2) {
        self.add_from(self.destination(), target);
    }

    pub fn add_from(&mut self, start: Vec2, target: Vec2) {
        self.segments.push(Segment::new(start, target));
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn passage(&self) -> &[Vec2] {
        &self.passage
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the segment currently traveled.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Where the path ends, the origin for an empty path.
    pub fn destination(&self) -> Vec2 {
        self.segments.last().map_or(self.origin, |s| s.end)
    }

    /// Current point along the path.
    pub fn position(&self) -> Vec2 {
        match self.segments.get(self.index) {
            Some(seg) => seg.point_at(self.progress),
            None => self.origin,
        }
    }

    fn on_last_segment(&self) -> bool {
        self.index + 1 >= self.segments.len()
    }

    /// Distance left on the current segment.
    fn left(&self) -> f32 {
        self.segments
            .get(self.index)
            .map_or(0.0, |s| (s.length - self.progress).max(0.0))
    }

    /// Whether there's still travel left beyond `threshold`.
    pub fn en_route(&self, threshold: f32) -> bool {
        if self.segments.is_empty() {
            return false;
        }
        !(self.on_last_segment() && self.left() <= threshold)
    }

    /// Move along the path and return the new position.
    ///
    /// Distance left over at the end of a segment carries on to the next
    /// one. Travel stops at the end of the last segment and snaps to it once
    /// within `threshold`.
    pub fn advance(&mut self, speed: f32, elapsed: f32, threshold: f32) -> Vec2 {
        let mut distance = (speed * elapsed).max(0.0);

        while let Some(seg) = self.segments.get(self.index) {
            let left = (seg.length - self.progress).max(0.0);
            if distance < left {
                self.progress += distance;
                break;
            }
            if self.on_last_segment() {
                self.progress = seg.length;
                break;
            }
            distance -= left;
            self.index += 1;
            self.progress = 0.0;
        }

        if self.on_last_segment() && self.left() <= threshold {
            if let Some(seg) = self.segments.last() {
                self.progress = seg.length;
            }
        }

        self.position()
    }

    /// Plan a path from `origin` to `target`, replacing the current one.
    ///
    /// Tries a straight line first and falls back to grid search within
    /// `max_radius` of the origin. With `ignore_target_obstruction` an
    /// obstructed target cell is allowed and the path stops next to it
    /// instead. Returns false and leaves the path empty if no way is found.
    pub fn generate_path_to(
        &mut self,
        locator: &Locator,
        origin: Vec2,
        target: Vec2,
        ignore_target_obstruction: bool,
        max_radius: f32,
    ) -> bool {
        self.clear(origin);

        let goal = target.cell();
        if !locator.cell_in_bounds(goal) {
            return false;
        }
        let goal_obstructed = locator.cell_obstructed(goal);
        if goal_obstructed && !ignore_target_obstruction {
            return false;
        }

        let (direction, length) = (target - origin).split_direction();
        let mut sampled = Vec::new();
        let hits = locator.obstructions(origin, direction, length, &mut sampled);
        self.passage = sampled;

        if hits.is_empty() {
            self.add(target);
            return true;
        }

        if goal_obstructed && hits == [goal] {
            // Only the target itself is in the way, stop in front of it.
            let stop = self
                .passage
                .iter()
                .take_while(|p| p.cell() != goal)
                .last()
                .copied()
                .unwrap_or(origin);
            self.add(stop);
            return true;
        }

        let Some(cells) = bounded_astar(
            locator,
            origin.cell(),
            goal,
            ignore_target_obstruction,
            max_radius,
        ) else {
            self.clear(origin);
            return false;
        };

        let mut route = cells.get(1..).unwrap_or_default();
        if goal_obstructed {
            // Drop the goal before merging so the cell next to it survives.
            route = route.split_last().map_or(route, |(_, rest)| rest);
        }
        let mut points: Vec<Vec2> = merge_straight_runs(route)
            .iter()
            .map(|c| c.center())
            .collect();
        if !goal_obstructed {
            // Finish at the exact point instead of the goal cell's center.
            if let Some(last) = points.last_mut() {
                *last = target;
            }
        }

        if points.is_empty() {
            // Already next to the obstructed goal.
            self.add(origin);
        }
        for p in points {
            self.add(p);
        }
        true
    }
}

/// Drop cells from the middle of straight runs.
///
/// The first and the last cell are always kept.
fn merge_straight_runs(cells: &[IVec2]) -> Vec<IVec2> {
    let mut ret: Vec<IVec2> = Vec::with_capacity(cells.len());
    for (i, &cell) in cells.iter().enumerate() {
        if i >= 2 {
            let (a, b) = (cells[i - 2], cells[i - 1]);
            if b - a == cell - b && ret.len() >= 2 {
                // `b` sits on a straight line between its neighbors.
                ret.pop();
            }
        }
        ret.push(cell);
    }
    ret
}
