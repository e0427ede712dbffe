/// 目標選擇
///
/// 純函式: 只讀取實體資料與空間查詢服務，隨機選取由呼叫端提供亂數源

use ability_system::{ShapeTrigger, SkillConfig, SkillShape, TargetSelectType};
use rand::seq::SliceRandom;
use rand::Rng;
use vek::Vec2;

use crate::comp::*;

/// 一次目標查詢的輸入
#[derive(Clone, Debug)]
pub struct TargetQuery<'a> {
    pub caster: Entity,
    pub origin: Vec2<f32>,
    pub facing: Vec2<f32>,
    /// 施法點
    pub point: Option<Vec2<f32>>,
    /// 指定目標
    pub explicit: Option<Entity>,
    /// 上一次作用時在形狀內的實體
    pub previous_inside: &'a [Entity],
}

/// 目標查詢結果
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolution {
    pub targets: Vec<Entity>,
    /// 形狀類選擇才有，呼叫端保存起來給下一次的進入/離開判斷
    pub inside: Option<Vec<Entity>>,
}

/// target_count 為 0 表示不限
fn cap(count: u32) -> usize {
    if count == 0 {
        usize::MAX
    } else {
        count as usize
    }
}

/// 存活且屬於技能作用群組
pub fn is_eligible(config: &SkillConfig, em: &EntityManager, caster: Entity, candidate: Entity) -> bool {
    is_alive(em, candidate)
        && in_group(
            config.effect_group_type,
            Some(caster),
            team_of(em, caster),
            candidate,
            team_of(em, candidate),
        )
}

/// 所有合格的實體，依建立順序
fn eligible_all(config: &SkillConfig, em: &EntityManager, caster: Entity) -> Vec<Entity> {
    em.query::<Pos>()
        .map(|(e, _)| e)
        .filter(|e| is_eligible(config, em, caster, *e))
        .collect()
}

/// 形狀的外接圓半徑
fn bound_radius(config: &SkillConfig) -> f32 {
    let half_width = config.width * 0.5;
    match config.shape {
        SkillShape::Rect => config.height.hypot(half_width),
        SkillShape::Line => config.radius.hypot(half_width),
        _ => config.radius,
    }
}

/// 判斷 `pos` 是否在以 `anchor` 為原點、朝向 `facing` 的形狀內
pub fn shape_contains(config: &SkillConfig, anchor: Vec2<f32>, facing: Vec2<f32>, pos: Vec2<f32>) -> bool {
    let d = pos - anchor;
    let dist = d.magnitude();
    let facing = normalize_or(facing, Vec2::unit_x());
    let u = d.dot(facing);
    let v = d.dot(Vec2::new(-facing.y, facing.x));
    let half_width = config.width * 0.5;

    match config.shape {
        SkillShape::None => false,
        SkillShape::All => true,
        SkillShape::Circle | SkillShape::Point => dist <= config.radius,
        SkillShape::Sector => {
            if dist > config.radius {
                return false;
            }
            if dist <= 1e-6 || config.width >= 360.0 {
                return true;
            }
            let half_angle = (config.width * 0.5).to_radians();
            u / dist >= half_angle.cos()
        }
        SkillShape::Rect => (0.0..=config.height).contains(&u) && v.abs() <= half_width,
        SkillShape::Line => (0.0..=config.radius).contains(&u) && v.abs() <= half_width,
    }
}

/// 形狀內的合格實體，依距離遞增
fn shape_members(
    config: &SkillConfig,
    query: &TargetQuery,
    em: &EntityManager,
    searcher: &dyn SpatialQuery,
) -> Vec<Entity> {
    match config.shape {
        SkillShape::None => query
            .explicit
            .filter(|e| is_eligible(config, em, query.caster, *e))
            .into_iter()
            .collect(),
        SkillShape::All => eligible_all(config, em, query.caster),
        _ => {
            let anchor = match config.shape {
                SkillShape::Point => query
                    .point
                    .or_else(|| query.explicit.and_then(|e| em.get_component::<Pos>(e)).map(|p| p.0))
                    .unwrap_or(query.origin),
                _ => query.origin,
            };
            let radius = bound_radius(config);
            if radius <= 0.0 {
                return Vec::new();
            }
            searcher
                .nearest_entities(anchor, radius, usize::MAX)
                .into_iter()
                .map(|d| d.e)
                .filter(|e| is_eligible(config, em, query.caster, *e))
                .filter(|e| {
                    em.get_component::<Pos>(*e)
                        .map_or(false, |p| shape_contains(config, anchor, query.facing, p.0))
                })
                .collect()
        }
    }
}

/// 依形狀觸發條件篩選
fn apply_trigger(
    config: &SkillConfig,
    query: &TargetQuery,
    em: &EntityManager,
    inside: &[Entity],
) -> Vec<Entity> {
    match config.shape_trigger {
        ShapeTrigger::Hit | ShapeTrigger::Inside => inside.to_vec(),
        ShapeTrigger::Enter => inside
            .iter()
            .copied()
            .filter(|e| !query.previous_inside.contains(e))
            .collect(),
        ShapeTrigger::Exit => query
            .previous_inside
            .iter()
            .copied()
            .filter(|e| !inside.contains(e) && is_eligible(config, em, query.caster, *e))
            .collect(),
        ShapeTrigger::Outside => eligible_all(config, em, query.caster)
            .into_iter()
            .filter(|e| !inside.contains(e))
            .collect(),
    }
}

/// 不放回抽樣，數量不足時全部取出
fn sample<R: Rng + ?Sized>(rng: &mut R, pool: Vec<Entity>, count: usize) -> Vec<Entity> {
    let amount = count.min(pool.len());
    rand::seq::index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// 解析技能的作用目標，空結果是合法的
pub fn resolve_targets<R: Rng + ?Sized>(
    config: &SkillConfig,
    query: &TargetQuery,
    em: &EntityManager,
    searcher: &dyn SpatialQuery,
    rng: &mut R,
) -> Resolution {
    let count = cap(config.target_count);

    match config.target_select_type {
        TargetSelectType::Nearest => {
            let targets = searcher
                .nearest_entities(query.origin, config.radius, usize::MAX)
                .into_iter()
                .map(|d| d.e)
                .filter(|e| is_eligible(config, em, query.caster, *e))
                .take(count)
                .collect();
            Resolution { targets, inside: None }
        }
        TargetSelectType::Shape | TargetSelectType::ShapeRandom => {
            let inside = shape_members(config, query, em, searcher);
            let triggered = apply_trigger(config, query, em, &inside);
            let targets = if config.target_select_type == TargetSelectType::ShapeRandom {
                sample(rng, triggered, count)
            } else {
                triggered.into_iter().take(count).collect()
            };
            Resolution {
                targets,
                inside: Some(inside),
            }
        }
        TargetSelectType::Random => Resolution {
            targets: sample(rng, eligible_all(config, em, query.caster), count),
            inside: None,
        },
        TargetSelectType::AllRandom => {
            let mut targets = eligible_all(config, em, query.caster);
            targets.shuffle(rng);
            Resolution { targets, inside: None }
        }
        TargetSelectType::All => Resolution {
            targets: eligible_all(config, em, query.caster),
            inside: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ability_system::EffectGroupType;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    struct Scene {
        em: EntityManager,
        caster: Entity,
    }

    impl Scene {
        fn new() -> Self {
            let mut em = EntityManager::new();
            let caster = em.create_entity().unwrap();
            em.insert_component(caster, Pos(Vec2::zero()));
            em.insert_component(caster, Facing::default());
            em.insert_component(caster, Faction { team_id: 1 });
            em.insert_component(caster, Attributes::new().with_hp(100.0));
            Self { em, caster }
        }

        fn unit(&mut self, x: f32, y: f32, team: i32, hp: f32) -> Entity {
            let e = self.em.create_entity().unwrap();
            self.em.insert_component(e, Pos(Vec2::new(x, y)));
            self.em.insert_component(e, Faction { team_id: team });
            self.em
                .insert_component(e, Attributes::new().with_stat(HP_STAT, Stat::new(hp, 100.0)));
            e
        }

        fn query<'a>(&self) -> TargetQuery<'a> {
            TargetQuery {
                caster: self.caster,
                origin: Vec2::zero(),
                facing: Vec2::unit_x(),
                point: None,
                explicit: None,
                previous_inside: &[],
            }
        }

        fn resolve(&self, config: &SkillConfig, query: &TargetQuery) -> Resolution {
            let searcher = Searcher::from_registry(&self.em);
            let mut rng = Pcg64::seed_from_u64(11);
            resolve_targets(config, query, &self.em, &searcher, &mut rng)
        }
    }

    fn config(select: TargetSelectType, shape: SkillShape, radius: f32, count: u32) -> SkillConfig {
        let mut c = SkillConfig::new(1);
        c.target_select_type = select;
        c.shape = shape;
        c.radius = radius;
        c.target_count = count;
        c
    }

    #[test]
    fn test_nearest_three_of_five() {
        let mut scene = Scene::new();
        // 故意打亂建立順序
        scene.unit(4.0, 0.0, 2, 50.0);
        let d1 = scene.unit(0.0, 1.0, 2, 50.0);
        scene.unit(-5.0, 0.0, 2, 50.0);
        let d3 = scene.unit(0.0, -3.0, 2, 50.0);
        let d2 = scene.unit(2.0, 0.0, 2, 50.0);

        let c = config(TargetSelectType::Nearest, SkillShape::Circle, 10.0, 3);
        let r = scene.resolve(&c, &scene.query());
        assert_eq!(r.targets, vec![d1, d2, d3]);
        assert!(r.inside.is_none());
    }

    #[test]
    fn test_nearest_tie_broken_by_id() {
        let mut scene = Scene::new();
        let a = scene.unit(3.0, 0.0, 2, 50.0);
        scene.unit(-3.0, 0.0, 2, 50.0);
        let c = config(TargetSelectType::Nearest, SkillShape::Circle, 10.0, 1);
        assert_eq!(scene.resolve(&c, &scene.query()).targets, vec![a]);
    }

    #[test]
    fn test_eligibility_filters_dead_and_allies() {
        let mut scene = Scene::new();
        scene.unit(1.0, 0.0, 2, 0.0);
        let ally = scene.unit(1.5, 0.0, 1, 50.0);
        let enemy = scene.unit(2.0, 0.0, 2, 50.0);
        let c = config(TargetSelectType::Nearest, SkillShape::Circle, 10.0, 5);
        assert_eq!(scene.resolve(&c, &scene.query()).targets, vec![enemy]);

        let mut heal = c.clone();
        heal.effect_group_type = EffectGroupType::Ally;
        // 友軍包含施法者自己
        let targets = scene.resolve(&heal, &scene.query()).targets;
        assert_eq!(targets, vec![scene.caster, ally]);

        let mut own = c;
        own.effect_group_type = EffectGroupType::Self_;
        assert_eq!(scene.resolve(&own, &scene.query()).targets, vec![scene.caster]);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let scene = Scene::new();
        let c = config(TargetSelectType::Nearest, SkillShape::Circle, 10.0, 3);
        assert!(scene.resolve(&c, &scene.query()).targets.is_empty());
    }

    #[test]
    fn test_sector_and_rect_shapes() {
        let mut scene = Scene::new();
        let front = scene.unit(3.0, 0.5, 2, 50.0);
        scene.unit(0.0, 3.0, 2, 50.0);
        scene.unit(-3.0, 0.0, 2, 50.0);

        let mut sector = config(TargetSelectType::Shape, SkillShape::Sector, 5.0, 0);
        sector.width = 90.0;
        assert_eq!(scene.resolve(&sector, &scene.query()).targets, vec![front]);

        let circle = config(TargetSelectType::Shape, SkillShape::Circle, 5.0, 0);
        assert_eq!(scene.resolve(&circle, &scene.query()).targets.len(), 3);

        let mut rect = config(TargetSelectType::Shape, SkillShape::Rect, 0.0, 0);
        rect.height = 4.0;
        rect.width = 2.0;
        assert_eq!(scene.resolve(&rect, &scene.query()).targets, vec![front]);

        let mut line = config(TargetSelectType::Shape, SkillShape::Line, 5.0, 0);
        line.width = 0.5;
        // 寬 0.5，front 偏移 0.5 在線外
        assert!(scene.resolve(&line, &scene.query()).targets.is_empty());
    }

    #[test]
    fn test_point_shape_uses_cast_point() {
        let mut scene = Scene::new();
        let near_point = scene.unit(10.0, 10.0, 2, 50.0);
        scene.unit(1.0, 0.0, 2, 50.0);
        let c = config(TargetSelectType::Shape, SkillShape::Point, 2.0, 0);
        let mut q = scene.query();
        q.point = Some(Vec2::new(9.0, 10.0));
        assert_eq!(scene.resolve(&c, &q).targets, vec![near_point]);
    }

    #[test]
    fn test_none_shape_uses_explicit_target() {
        let mut scene = Scene::new();
        let target = scene.unit(30.0, 0.0, 2, 50.0);
        let c = config(TargetSelectType::Shape, SkillShape::None, 0.0, 1);
        let mut q = scene.query();
        assert!(scene.resolve(&c, &q).targets.is_empty());
        q.explicit = Some(target);
        assert_eq!(scene.resolve(&c, &q).targets, vec![target]);
    }

    #[test]
    fn test_shape_random_samples_without_replacement() {
        let mut scene = Scene::new();
        for i in 0..6 {
            scene.unit(1.0 + i as f32 * 0.1, 0.0, 2, 50.0);
        }
        let c = config(TargetSelectType::ShapeRandom, SkillShape::Circle, 5.0, 4);
        let r = scene.resolve(&c, &scene.query());
        assert_eq!(r.targets.len(), 4);
        let mut unique = r.targets.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4);
        assert_eq!(r.inside.as_ref().map(Vec::len), Some(6));

        // 相同種子結果相同
        assert_eq!(scene.resolve(&c, &scene.query()), r);
    }

    #[test]
    fn test_random_ignores_shape() {
        let mut scene = Scene::new();
        let far = scene.unit(500.0, 0.0, 2, 50.0);
        let c = config(TargetSelectType::Random, SkillShape::Circle, 1.0, 3);
        assert_eq!(scene.resolve(&c, &scene.query()).targets, vec![far]);
    }

    #[test]
    fn test_all_and_all_random() {
        let mut scene = Scene::new();
        let units: Vec<_> = (0..5).map(|i| scene.unit(i as f32 * 50.0, 0.0, 2, 50.0)).collect();
        let all = config(TargetSelectType::All, SkillShape::None, 0.0, 1);
        assert_eq!(scene.resolve(&all, &scene.query()).targets, units);

        let shuffled = config(TargetSelectType::AllRandom, SkillShape::None, 0.0, 1);
        let mut got = scene.resolve(&shuffled, &scene.query()).targets;
        got.sort();
        assert_eq!(got, units);
    }

    #[test]
    fn test_enter_exit_outside_triggers() {
        let mut scene = Scene::new();
        let staying = scene.unit(1.0, 0.0, 2, 50.0);
        let entering = scene.unit(2.0, 0.0, 2, 50.0);
        let leaving = scene.unit(9.0, 0.0, 2, 50.0);
        let previous = vec![staying, leaving];

        let mut c = config(TargetSelectType::Shape, SkillShape::Circle, 5.0, 0);
        let mut q = scene.query();
        q.previous_inside = &previous;

        c.shape_trigger = ShapeTrigger::Enter;
        assert_eq!(scene.resolve(&c, &q).targets, vec![entering]);

        c.shape_trigger = ShapeTrigger::Exit;
        assert_eq!(scene.resolve(&c, &q).targets, vec![leaving]);

        c.shape_trigger = ShapeTrigger::Outside;
        assert_eq!(scene.resolve(&c, &q).targets, vec![leaving]);

        c.shape_trigger = ShapeTrigger::Inside;
        let r = scene.resolve(&c, &q);
        assert_eq!(r.targets, vec![staying, entering]);
        assert_eq!(r.inside, Some(vec![staying, entering]));
    }
}
