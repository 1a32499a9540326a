//! Spatial queries over the live world collections.
use std::cmp::Ordering;

use glam::{IVec2, Vec2};
use util::{Area, HashSet, PointExt};

use crate::{
    Block, BlockType, Colony, ColonyId, Effect, EffectType, Element, Entity,
    EntityType, Id, SAMPLE_STEP,
};

/// Cells covered by blocks, rebuilt from the block list on demand.
#[derive(Clone, Default, Debug)]
pub struct Occupancy {
    cells: HashSet<IVec2>,
    size: IVec2,
}

impl Occupancy {
    pub fn new(size: IVec2) -> Self {
        Occupancy {
            cells: Default::default(),
            size,
        }
    }

    /// Rebuild the index from the current block list.
    pub fn refresh(&mut self, blocks: &[Block]) {
        self.cells.clear();
        self.cells.extend(blocks.iter().map(|b| b.body.cell()));
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        self.cells.contains(&cell)
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }
}

/// Borrowed reference to any kind of world element.
#[derive(Copy, Clone, Debug)]
pub enum ItemEntry<'a> {
    Block(&'a Block),
    Entity(&'a Entity),
    Effect(&'a Effect),
}

impl<'a> ItemEntry<'a> {
    pub fn id(&self) -> Id {
        match self {
            ItemEntry::Block(a) => a.id(),
            ItemEntry::Entity(a) => a.id(),
            ItemEntry::Effect(a) => a.id(),
        }
    }

    pub fn pos(&self) -> Vec2 {
        match self {
            ItemEntry::Block(a) => a.pos(),
            ItemEntry::Entity(a) => a.pos(),
            ItemEntry::Effect(a) => a.pos(),
        }
    }

    pub fn owner(&self) -> Option<ColonyId> {
        match self {
            ItemEntry::Block(a) => a.body.owner,
            ItemEntry::Entity(a) => a.body.owner,
            ItemEntry::Effect(a) => a.body.owner,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            ItemEntry::Block(a) => a.body.radius,
            ItemEntry::Entity(a) => a.body.radius,
            ItemEntry::Effect(a) => a.body.radius,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            ItemEntry::Block(a) => Kind::Block(Some(a.kind())),
            ItemEntry::Entity(a) => Kind::Entity(Some(a.kind())),
            ItemEntry::Effect(a) => Kind::Effect(Some(a.kind())),
        }
    }

    pub fn as_block(&self) -> Option<&'a Block> {
        match *self {
            ItemEntry::Block(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&'a Entity> {
        match *self {
            ItemEntry::Entity(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_effect(&self) -> Option<&'a Effect> {
        match *self {
            ItemEntry::Effect(a) => Some(a),
            _ => None,
        }
    }

    fn is_doomed(&self) -> bool {
        match self {
            ItemEntry::Block(a) => a.body.is_doomed(),
            ItemEntry::Entity(a) => a.body.is_doomed(),
            ItemEntry::Effect(a) => a.body.is_doomed(),
        }
    }
}

/// Item category filter, `None` inside a variant matches the whole
/// collection.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Kind {
    Block(Option<BlockType>),
    Entity(Option<EntityType>),
    Effect(Option<EffectType>),
}

impl Kind {
    pub fn matches(&self, item: &ItemEntry) -> bool {
        match (*self, item.kind()) {
            (Kind::Block(None), Kind::Block(_)) => true,
            (Kind::Entity(None), Kind::Entity(_)) => true,
            (Kind::Effect(None), Kind::Effect(_)) => true,
            (a, b) => a == b,
        }
    }
}

/// Ownership predicate for queries.
///
/// With `include` set only items owned by `owner` pass, otherwise only items
/// not owned by `owner` pass. Unowned items have owner `None`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct OwnerFilter {
    pub owner: Option<ColonyId>,
    pub include: bool,
}

impl OwnerFilter {
    /// Items belonging to `owner`.
    pub fn only(owner: Option<ColonyId>) -> Self {
        OwnerFilter {
            owner,
            include: true,
        }
    }

    /// Items not belonging to `owner`.
    pub fn except(owner: Option<ColonyId>) -> Self {
        OwnerFilter {
            owner,
            include: false,
        }
    }

    pub fn matches(&self, owner: Option<ColonyId>) -> bool {
        (owner == self.owner) == self.include
    }
}

/// Result ordering for queries.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub enum Sort {
    #[default]
    None,
    /// Ascending by x, then y.
    ZOrder,
    /// Nearest to the given point first.
    Distance(Vec2),
}

/// Read-only spatial view of the world.
///
/// Borrows the world's collections, so it can't outlive the world or see
/// changes made after it was built.
#[derive(Copy, Clone)]
pub struct Locator<'a> {
    blocks: &'a [Block],
    entities: &'a [Entity],
    effects: &'a [Effect],
    colonies: &'a [Colony],
    occupancy: &'a Occupancy,
}

impl<'a> Locator<'a> {
    pub fn new(
        blocks: &'a [Block],
        entities: &'a [Entity],
        effects: &'a [Effect],
        colonies: &'a [Colony],
        occupancy: &'a Occupancy,
    ) -> Self {
        Locator {
            blocks,
            entities,
            effects,
            colonies,
            occupancy,
        }
    }

    pub fn blocks(&self) -> &'a [Block] {
        self.blocks
    }

    pub fn entities(&self) -> &'a [Entity] {
        self.entities
    }

    pub fn effects(&self) -> &'a [Effect] {
        self.effects
    }

    pub fn colonies_count(&self) -> usize {
        self.colonies.len()
    }

    pub fn colony(&self, i: usize) -> Option<&'a Colony> {
        self.colonies.get(i)
    }

    pub fn colony_by_id(&self, id: ColonyId) -> Option<&'a Colony> {
        self.colonies.iter().find(|c| c.id == id)
    }

    pub fn block(&self, id: Id) -> Option<&'a Block> {
        self.blocks.iter().find(|a| a.id() == id)
    }

    pub fn entity(&self, id: Id) -> Option<&'a Entity> {
        self.entities.iter().find(|a| a.id() == id)
    }

    pub fn effect(&self, id: Id) -> Option<&'a Effect> {
        self.effects.iter().find(|a| a.id() == id)
    }

    /// World size in tiles.
    pub fn size(&self) -> IVec2 {
        self.occupancy.size()
    }

    /// The whole world as a query area.
    pub fn bounds(&self) -> Area {
        Area::sized(Vec2::ZERO, self.size().as_vec2())
    }

    pub fn in_bounds(&self, p: Vec2) -> bool {
        self.bounds().contains(p)
    }

    pub fn cell_in_bounds(&self, cell: IVec2) -> bool {
        let size = self.size();
        cell.x >= 0 && cell.y >= 0 && cell.x < size.x && cell.y < size.y
    }

    /// Whether the cell containing the point holds a block.
    pub fn obstructed(&self, p: Vec2) -> bool {
        self.cell_obstructed(p.cell())
    }

    pub fn cell_obstructed(&self, cell: IVec2) -> bool {
        self.occupancy.contains(cell)
    }

    /// Whether anything blocks the way along a segment.
    ///
    /// See `obstructions` for the sampling rules.
    pub fn obstructed_segment(
        &self,
        origin: Vec2,
        direction: Vec2,
        length: f32,
        sampled: &mut Vec<Vec2>,
    ) -> bool {
        !self.obstructions(origin, direction, length, sampled).is_empty()
    }

    /// Blocked cells along a segment, in the order they're met.
    ///
    /// Samples the segment every half tile and always samples the end
    /// point. The cell of the origin is never reported so that something
    /// standing on a blocked cell can still leave it. Every sampled point is
    /// appended to `sampled`.
    pub fn obstructions(
        &self,
        origin: Vec2,
        direction: Vec2,
        length: f32,
        sampled: &mut Vec<Vec2>,
    ) -> Vec<IVec2> {
        let origin_cell = origin.cell();
        let mut ret = Vec::new();

        let mut test = |p: Vec2, ret: &mut Vec<IVec2>| {
            sampled.push(p);
            let cell = p.cell();
            if cell != origin_cell
                && self.cell_obstructed(cell)
                && !ret.contains(&cell)
            {
                ret.push(cell);
            }
        };

        let length = length.max(0.0);
        let mut t = SAMPLE_STEP;
        while t < length {
            test(origin + direction * t, &mut ret);
            t += SAMPLE_STEP;
        }
        test(origin + direction * length, &mut ret);

        ret
    }

    /// All items inside an area that pass the filters.
    pub fn visible(
        &self,
        area: Area,
        kind: Option<Kind>,
        owner: Option<OwnerFilter>,
        sort: Sort,
    ) -> Vec<ItemEntry<'a>> {
        let items = self
            .blocks
            .iter()
            .map(ItemEntry::Block)
            .chain(self.entities.iter().map(ItemEntry::Entity))
            .chain(self.effects.iter().map(ItemEntry::Effect));

        let mut ret: Vec<ItemEntry<'a>> = items
            .filter(|e| !e.is_doomed())
            .filter(|e| kind.map_or(true, |k| k.matches(e)))
            .filter(|e| owner.map_or(true, |f| f.matches(e.owner())))
            .filter(|e| area.contains(e.pos()))
            .collect();

        match sort {
            Sort::None => {}
            Sort::ZOrder => ret.sort_by(|a, b| {
                let (a, b) = (a.pos(), b.pos());
                a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
            }),
            Sort::Distance(p) => ret.sort_by(|a, b| {
                let (a, b) = (a.pos().distance(p), b.pos().distance(p));
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }),
        }

        ret
    }

    /// The item nearest to `p` within `radius` that passes the filters.
    pub fn closest(
        &self,
        p: Vec2,
        radius: f32,
        kind: Option<Kind>,
        owner: Option<OwnerFilter>,
    ) -> Option<ItemEntry<'a>> {
        self.visible(Area::around(p, radius), kind, owner, Sort::Distance(p))
            .into_iter()
            .next()
    }
}

#[cfg(test)]
mod tests {
    use glam::{ivec2, vec2};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Config, Instant};

    fn block_at(x: f32, y: f32) -> Block {
        Block::wall(vec2(x, y), &Config::default())
    }

    fn occupancy(size: i32, blocks: &[Block]) -> Occupancy {
        let mut ret = Occupancy::new(ivec2(size, size));
        ret.refresh(blocks);
        ret
    }

    #[test]
    fn single_block_obstruction() {
        let blocks = vec![block_at(3.0, 3.0)];
        let occ = occupancy(10, &blocks);
        let loc = Locator::new(&blocks, &[], &[], &[], &occ);

        assert!(loc.obstructed(vec2(3.0, 3.0)));
        assert!(loc.obstructed(vec2(3.7, 3.2)));
        assert!(!loc.obstructed(vec2(3.0, 4.0)));
        assert!(!loc.obstructed(vec2(-30.0, 400.0)));
    }

    #[test]
    fn segment_skips_origin_cell() {
        let blocks = vec![block_at(0.0, 0.0), block_at(3.0, 0.0)];
        let occ = occupancy(10, &blocks);
        let loc = Locator::new(&blocks, &[], &[], &[], &occ);

        let mut sampled = Vec::new();
        // Leaving a blocked cell is fine.
        assert!(!loc.obstructed_segment(
            vec2(0.5, 0.5),
            vec2(0.0, 1.0),
            2.0,
            &mut sampled
        ));
        assert_eq!(sampled.last().copied(), Some(vec2(0.5, 2.5)));

        sampled.clear();
        let hits =
            loc.obstructions(vec2(0.5, 0.5), vec2(1.0, 0.0), 4.0, &mut sampled);
        assert_eq!(hits, vec![ivec2(3, 0)]);
    }

    #[test]
    fn endpoint_is_always_tested() {
        let blocks = vec![block_at(2.0, 0.0)];
        let occ = occupancy(10, &blocks);
        let loc = Locator::new(&blocks, &[], &[], &[], &occ);

        // Samples land at 0.5, 1.0 and 1.5 from the origin and miss the
        // block, only the explicit end point hits it.
        let mut sampled = Vec::new();
        assert!(loc.obstructed_segment(
            vec2(0.3, 0.5),
            vec2(1.0, 0.0),
            1.75,
            &mut sampled
        ));
        assert_eq!(sampled.len(), 4);
    }

    #[test]
    fn owner_filters() {
        let a = Some(ColonyId(1));
        let b = Some(ColonyId(2));
        assert!(OwnerFilter::only(a).matches(a));
        assert!(!OwnerFilter::only(a).matches(b));
        assert!(OwnerFilter::except(a).matches(b));
        assert!(OwnerFilter::except(a).matches(None));
        assert!(!OwnerFilter::except(None).matches(None));
    }

    #[test]
    fn visibility_and_sorting() {
        let config = Config::default();
        let now = Instant::default();
        let blocks = vec![
            block_at(5.0, 5.0),
            Block::deposit(vec2(1.0, 1.0), 10.0, &config),
            block_at(1.0, 8.0),
        ];
        let effects = vec![Effect::vfx(
            crate::VfxKind::Flash,
            vec2(2.0, 2.0),
            now,
            &config,
        )];
        let occ = occupancy(10, &blocks);
        let loc = Locator::new(&blocks, &[], &effects, &[], &occ);

        let all = loc.visible(loc.bounds(), None, None, Sort::ZOrder);
        let order: Vec<Vec2> = all.iter().map(|e| e.pos()).collect();
        assert_eq!(
            order,
            vec![
                vec2(1.0, 1.0),
                vec2(1.0, 8.0),
                vec2(2.0, 2.0),
                vec2(5.0, 5.0)
            ]
        );

        let walls = loc.visible(
            loc.bounds(),
            Some(Kind::Block(Some(BlockType::Wall))),
            None,
            Sort::Distance(vec2(6.0, 6.0)),
        );
        assert_eq!(walls.len(), 2);
        assert_eq!(walls[0].pos(), vec2(5.0, 5.0));

        let near = loc.closest(vec2(0.0, 0.0), 3.0, None, None);
        assert_eq!(near.map(|e| e.pos()), Some(vec2(1.0, 1.0)));
        assert!(loc.closest(vec2(9.0, 0.0), 1.0, None, None).is_none());
    }
}
