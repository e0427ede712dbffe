use ordered_float::OrderedFloat;
use vek::Vec2;

use super::{Attributes, Entity, EntityManager, Pos};

/// 搜尋結果: 實體與距離
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisIndex {
    pub e: Entity,
    pub dis: f32,
}

/// 空間查詢服務
pub trait SpatialQuery {
    /// 回傳 `radius` 內最近的 `count` 個存活實體，依距離遞增，同距離依 id
    ///
    /// `radius <= 0` 表示不限距離
    fn nearest_entities(&self, position: Vec2<f32>, radius: f32, count: usize) -> Vec<DisIndex>;

    /// 範圍內的存活實體數量
    fn count_within(&self, position: Vec2<f32>, radius: f32) -> usize;
}

/// 暴力搜尋，tick 開始時從實體管理器建立快照
#[derive(Clone, Debug, Default)]
pub struct Searcher {
    entries: Vec<(Entity, Vec2<f32>)>,
}

impl Searcher {
    pub fn from_registry(em: &EntityManager) -> Self {
        let entries = em
            .query::<Pos>()
            .filter(|(e, _)| {
                em.get_component::<Attributes>(*e)
                    .map_or(false, Attributes::is_alive)
            })
            .map(|(e, p)| (e, p.0))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn within(&self, position: Vec2<f32>, radius: f32) -> impl Iterator<Item = DisIndex> + '_ {
        let unbounded = radius <= 0.0;
        let r2 = radius * radius;
        self.entries.iter().filter_map(move |(e, p)| {
            let d2 = p.distance_squared(position);
            (unbounded || d2 <= r2).then(|| DisIndex { e: *e, dis: d2.sqrt() })
        })
    }
}

impl SpatialQuery for Searcher {
    fn nearest_entities(&self, position: Vec2<f32>, radius: f32, count: usize) -> Vec<DisIndex> {
        let mut found: Vec<DisIndex> = self.within(position, radius).collect();
        found.sort_by_key(|d| (OrderedFloat(d.dis), d.e));
        found.truncate(count);
        found
    }

    fn count_within(&self, position: Vec2<f32>, radius: f32) -> usize {
        self.within(position, radius).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comp::Stat;

    fn spawn(em: &mut EntityManager, x: f32, hp: f32) -> Entity {
        let e = em.create_entity().unwrap();
        em.insert_component(e, Pos(Vec2::new(x, 0.0)));
        em.insert_component(e, Attributes::new().with_stat("hp", Stat::new(hp, 100.0)));
        e
    }

    #[test]
    fn test_nearest_sorted_with_id_tiebreak() {
        let mut em = EntityManager::new();
        let far = spawn(&mut em, 5.0, 10.0);
        let tie_a = spawn(&mut em, -2.0, 10.0);
        let tie_b = spawn(&mut em, 2.0, 10.0);
        let near = spawn(&mut em, 1.0, 10.0);
        let searcher = Searcher::from_registry(&em);

        let found: Vec<Entity> = searcher
            .nearest_entities(Vec2::zero(), 10.0, 10)
            .iter()
            .map(|d| d.e)
            .collect();
        assert_eq!(found, vec![near, tie_a, tie_b, far]);
    }

    #[test]
    fn test_radius_and_count_bound_results() {
        let mut em = EntityManager::new();
        for x in 1..=5 {
            spawn(&mut em, x as f32, 10.0);
        }
        let searcher = Searcher::from_registry(&em);
        assert_eq!(searcher.nearest_entities(Vec2::zero(), 3.0, 10).len(), 3);
        assert_eq!(searcher.nearest_entities(Vec2::zero(), 0.0, 2).len(), 2);
        assert_eq!(searcher.count_within(Vec2::zero(), 4.5), 4);
    }

    #[test]
    fn test_dead_entities_not_indexed() {
        let mut em = EntityManager::new();
        spawn(&mut em, 1.0, 0.0);
        let alive = spawn(&mut em, 2.0, 1.0);
        let searcher = Searcher::from_registry(&em);
        let found = searcher.nearest_entities(Vec2::zero(), 0.0, usize::MAX);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].e, alive);
    }
}
