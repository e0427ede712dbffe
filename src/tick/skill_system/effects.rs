use ability_system::{CalcType, MoveTargetType, SkillConfig, ValueMaxType, ValueType};
use rand::Rng;
use vek::Vec2;

use crate::comp::*;

/// 沒有設定追蹤強度的追蹤彈使用的預設值
pub const DEFAULT_HOMING_STRENGTH: f32 = 8.0;

/// 移動距離或速度為零時的投射物壽命
pub const DEFAULT_PROJECTILE_LIFE: f32 = 5.0;

/// 技能效果管理器
pub struct EffectManager;

impl EffectManager {
    /// 投射物在物件池中的 key
    pub fn pool_key(effect_id: u32) -> String {
        format!("skill_effect_{}", effect_id)
    }

    /// 計算數值
    ///
    /// 加法模式回傳增量，乘法模式回傳倍率
    pub fn resolve_value<R: Rng + ?Sized>(config: &SkillConfig, stat: Option<&Stat>, rng: &mut R) -> f32 {
        match config.value_type {
            ValueType::Fixed => config.value,
            ValueType::Random => {
                let lo = config.value.min(config.value_max);
                let hi = config.value.max(config.value_max);
                if hi - lo <= f32::EPSILON {
                    lo
                } else {
                    rng.random_range(lo..=hi)
                }
            }
            ValueType::Percent => {
                let ratio = config.value / 100.0;
                match config.calc_type {
                    CalcType::Multiply => ratio,
                    CalcType::Add => {
                        let base = stat.map_or(0.0, |s| match config.value_max_type {
                            ValueMaxType::Current => s.current,
                            ValueMaxType::Max => s.max,
                        });
                        ratio * base
                    }
                }
            }
        }
    }

    /// 施法者強化屬性帶來的倍率
    pub fn enhance_factor(config: &SkillConfig, em: &EntityManager, caster: Entity) -> f32 {
        let Some(name) = config.enhance_stat_name.as_deref() else {
            return 1.0;
        };
        em.get_component::<Attributes>(caster)
            .and_then(|a| a.get(name))
            .map_or(1.0, |s| 1.0 + s.current / 100.0)
    }

    /// 依計算方式把增量或倍率套到目前值
    pub fn combine(calc_type: CalcType, current: f32, amount: f32) -> f32 {
        match calc_type {
            CalcType::Add => current + amount,
            CalcType::Multiply => current * amount,
        }
    }

    /// 投射物與直接技能共用的數值，加法模式已乘上強化倍率
    pub fn effect_amount<R: Rng + ?Sized>(
        config: &SkillConfig,
        stat: Option<&Stat>,
        enhance: f32,
        rng: &mut R,
    ) -> f32 {
        let resolved = Self::resolve_value(config, stat, rng);
        match config.calc_type {
            CalcType::Add => resolved * enhance,
            CalcType::Multiply => resolved,
        }
    }

    /// 修改目標屬性並記錄事件，目標沒有該屬性時回傳 None
    pub fn modify_stat(
        em: &mut EntityManager,
        source: Entity,
        target: Entity,
        skill_id: u32,
        stat_name: &str,
        next: impl FnOnce(&Stat) -> f32,
        outcomes: &mut Vec<Outcome>,
    ) -> Option<(f32, f32)> {
        let stat = em.get_component_mut::<Attributes>(target)?.get_mut(stat_name)?;
        let before = stat.current;
        let value = next(stat);
        stat.set_current(value);
        let after = stat.current;

        outcomes.push(Outcome::StatChanged {
            source,
            target,
            skill_id,
            stat: stat_name.to_string(),
            before,
            after,
        });
        if stat_name == HP_STAT && before > 0.0 && after <= 0.0 {
            let pos = em.get_component::<Pos>(target).map(|p| p.0).unwrap_or_default();
            log::debug!("{} 被技能 {} 擊殺", target, skill_id);
            outcomes.push(Outcome::Death { pos, ent: target });
        }
        Some((before, after))
    }

    /// 對單一目標套用非投射物技能
    pub fn apply_stat<R: Rng + ?Sized>(
        config: &SkillConfig,
        caster: Entity,
        target: Entity,
        em: &mut EntityManager,
        rng: &mut R,
        outcomes: &mut Vec<Outcome>,
    ) -> bool {
        let enhance = Self::enhance_factor(config, em, caster);
        let Some(stat) = em
            .get_component::<Attributes>(target)
            .and_then(|a| a.get(&config.stat_name))
            .copied()
        else {
            log::debug!("{} 沒有屬性 {}，略過技能 {}", target, config.stat_name, config.id);
            return false;
        };

        let amount = Self::effect_amount(config, Some(&stat), enhance, rng);
        let calc_type = config.calc_type;
        Self::modify_stat(
            em,
            caster,
            target,
            config.id,
            &config.stat_name,
            |s| Self::combine(calc_type, s.current, amount),
            outcomes,
        )
        .is_some()
    }

    /// 投射物技能: 每個目標一發，方向型技能沒有目標時朝施法點或面向發射
    #[allow(clippy::too_many_arguments)]
    pub fn projectile_spawns<R: Rng + ?Sized>(
        config: &SkillConfig,
        caster: Entity,
        origin: Vec2<f32>,
        facing: Vec2<f32>,
        point: Option<Vec2<f32>>,
        targets: &[Entity],
        em: &EntityManager,
        rng: &mut R,
    ) -> Vec<ProjectileSpawn> {
        let Some(move_type) = config.move_target_type else {
            return Vec::new();
        };
        let enhance = Self::enhance_factor(config, em, caster);
        let owner_team = team_of(em, caster);
        let life_time = if config.move_speed > 0.0 && config.move_distance > 0.0 {
            config.move_distance / config.move_speed
        } else {
            DEFAULT_PROJECTILE_LIFE
        };
        let homing_strength = match move_type {
            MoveTargetType::Target if config.homing_strength <= 0.0 => DEFAULT_HOMING_STRENGTH,
            MoveTargetType::Target => config.homing_strength,
            MoveTargetType::Direction => 0.0,
        };

        let mut build = |target: Option<Entity>, direction: Vec2<f32>, stat: Option<&Stat>| {
            let amount = Self::effect_amount(config, stat, enhance, &mut *rng);
            ProjectileSpawn {
                skill_id: config.id,
                owner: caster,
                owner_team,
                target: match move_type {
                    MoveTargetType::Target => target,
                    MoveTargetType::Direction => None,
                },
                pos: origin,
                direction: normalize_or(direction, facing),
                speed: config.move_speed,
                amount,
                calc_type: config.calc_type,
                stat_name: config.stat_name.clone(),
                life_time,
                radius: config.collision_radius,
                pierce_count: config.pierce_count,
                homing_strength,
                group: config.effect_group_type,
            }
        };

        if targets.is_empty() {
            return match move_type {
                MoveTargetType::Direction => {
                    let direction = point.map_or(facing, |p| p - origin);
                    vec![build(None, direction, None)]
                }
                MoveTargetType::Target => Vec::new(),
            };
        }

        targets
            .iter()
            .map(|t| {
                let direction = em
                    .get_component::<Pos>(*t)
                    .map_or(facing, |p| p.0 - origin);
                let stat = em
                    .get_component::<Attributes>(*t)
                    .and_then(|a| a.get(&config.stat_name))
                    .copied();
                build(Some(*t), direction, stat.as_ref())
            })
            .collect()
    }
}
