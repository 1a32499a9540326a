use glam::IVec2;
use pathfinding::prelude::astar;
use util::DIR_4;

use crate::{Locator, PATH_COST_SCALE};

fn cost(distance: f32) -> u32 {
    // Truncate so the heuristic never overestimates.
    (distance * PATH_COST_SCALE) as u32
}

/// Shortest 4-connected cell path from `start` to `goal`.
///
/// Cells outside the world, obstructed cells and cells farther than
/// `max_radius` from the start are never entered. An obstructed goal cell is
/// allowed when `ignore_goal_obstruction` is set. The returned path includes
/// both the start and the goal cell.
pub fn bounded_astar(
    locator: &Locator,
    start: IVec2,
    goal: IVec2,
    ignore_goal_obstruction: bool,
    max_radius: f32,
) -> Option<Vec<IVec2>> {
    let enterable = |cell: IVec2| {
        locator.cell_in_bounds(cell)
            && (cell - start).as_vec2().length() <= max_radius
            && (!locator.cell_obstructed(cell)
                || (ignore_goal_obstruction && cell == goal))
    };

    let step = cost(1.0);
    astar(
        &start,
        |&cell| {
            DIR_4
                .iter()
                .map(|&d| cell + d)
                .filter(|&c| enterable(c))
                .map(|c| (c, step))
                .collect::<Vec<_>>()
        },
        |&cell| cost((goal - cell).as_vec2().length()),
        |&cell| cell == goal,
    )
    .map(|(path, _)| path)
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;
    use crate::{Block, Config, Occupancy};

    fn world(size: i32, walls: &[(i32, i32)]) -> (Vec<Block>, Occupancy) {
        let c = Config::default();
        let blocks: Vec<Block> = walls
            .iter()
            .map(|&(x, y)| Block::wall(ivec2(x, y).as_vec2(), &c))
            .collect();
        let mut occ = Occupancy::new(ivec2(size, size));
        occ.refresh(&blocks);
        (blocks, occ)
    }

    #[test]
    fn routes_around_wall() {
        let (blocks, occ) = world(10, &[(2, 0)]);
        let loc = Locator::new(&blocks, &[], &[], &[], &occ);
        let path =
            bounded_astar(&loc, ivec2(0, 0), ivec2(5, 0), false, 10.0).unwrap();
        assert_eq!(path.first(), Some(&ivec2(0, 0)));
        assert_eq!(path.last(), Some(&ivec2(5, 0)));
        assert!(!path.contains(&ivec2(2, 0)));
        // Detour through the next row costs two extra steps.
        assert_eq!(path.len(), 8);
        for w in path.windows(2) {
            assert_eq!((w[1] - w[0]).abs().element_sum(), 1);
        }
    }

    #[test]
    fn obstructed_goal() {
        let (blocks, occ) = world(10, &[(4, 4)]);
        let loc = Locator::new(&blocks, &[], &[], &[], &occ);
        assert!(bounded_astar(&loc, ivec2(0, 4), ivec2(4, 4), false, 10.0)
            .is_none());
        let path =
            bounded_astar(&loc, ivec2(0, 4), ivec2(4, 4), true, 10.0).unwrap();
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn radius_limits_search() {
        // Wall across the map with a gap far away from the start.
        let walls: Vec<(i32, i32)> = (0..9).map(|y| (3, y)).collect();
        let (blocks, occ) = world(10, &walls);
        let loc = Locator::new(&blocks, &[], &[], &[], &occ);
        assert!(bounded_astar(&loc, ivec2(1, 0), ivec2(5, 0), false, 20.0)
            .is_some());
        assert!(bounded_astar(&loc, ivec2(1, 0), ivec2(5, 0), false, 6.0)
            .is_none());
        // Out of the world.
        assert!(bounded_astar(&loc, ivec2(1, 0), ivec2(-5, 0), false, 20.0)
            .is_none());
    }
}
