use ability_system::EffectGroupType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Component, Entity, EntityManager};

/// 生命值屬性名稱
pub const HP_STAT: &str = "hp";

/// 陣營組件 - 相同隊伍為友軍
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub team_id: i32,
}

impl Component for Faction {}

/// 單一屬性
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub current: f32,
    pub max: f32,
}

impl Stat {
    pub fn new(current: f32, max: f32) -> Self {
        Self { current, max }
    }

    pub fn full(max: f32) -> Self {
        Self::new(max, max)
    }

    /// 設定目前值並限制在 [0, max]
    pub fn set_current(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.max.max(0.0));
    }
}

/// 單位屬性表，技能依名稱修改
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    stats: BTreeMap<String, Stat>,
}

impl Component for Attributes {}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stat(mut self, name: &str, stat: Stat) -> Self {
        self.stats.insert(name.to_string(), stat);
        self
    }

    pub fn with_hp(self, max: f32) -> Self {
        self.with_stat(HP_STAT, Stat::full(max))
    }

    pub fn get(&self, name: &str) -> Option<&Stat> {
        self.stats.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Stat> {
        self.stats.get_mut(name)
    }

    pub fn hp(&self) -> Option<f32> {
        self.get(HP_STAT).map(|s| s.current)
    }

    /// 有生命值且大於零
    pub fn is_alive(&self) -> bool {
        self.hp().map_or(false, |hp| hp > 0.0)
    }
}

/// 實體是否存活
pub fn is_alive(em: &EntityManager, entity: Entity) -> bool {
    em.get_component::<Attributes>(entity)
        .map_or(false, Attributes::is_alive)
}

/// 判斷 `candidate` 對 `caster` 而言是否屬於 `group`
///
/// `caster_team` 由呼叫端提供，讓投射物在施法者消失後仍能判斷
pub fn in_group(
    group: EffectGroupType,
    caster: Option<Entity>,
    caster_team: Option<i32>,
    candidate: Entity,
    candidate_team: Option<i32>,
) -> bool {
    match group {
        EffectGroupType::Self_ => caster == Some(candidate),
        EffectGroupType::Ally => match (caster_team, candidate_team) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        EffectGroupType::Enemy => match (caster_team, candidate_team) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        },
    }
}

/// 取得實體的隊伍
pub fn team_of(em: &EntityManager, entity: Entity) -> Option<i32> {
    em.get_component::<Faction>(entity).map(|f| f.team_id)
}
