use ability_system::{CalcType, EffectGroupType};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use vek::Vec2;

use super::{normalize_or, Entity, Poolable};

/// 投射物銷毀原因
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyReason {
    LifeTime,
    PierceExceeded,
    OutOfBounds,
}

/// 生成投射物所需的參數
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSpawn {
    pub skill_id: u32,
    pub owner: Entity,
    pub owner_team: Option<i32>,
    // 如果有target就是追蹤 不然就是直線
    pub target: Option<Entity>,
    pub pos: Vec2<f32>,
    pub direction: Vec2<f32>,
    pub speed: f32,
    /// 加法模式是帶正負號的增量，乘法模式是倍率
    pub amount: f32,
    pub calc_type: CalcType,
    pub stat_name: String,
    pub life_time: f32,
    pub radius: f32,
    pub pierce_count: u32,
    pub homing_strength: f32,
    pub group: EffectGroupType,
}

/// 飛行中的投射物，由物件池重用
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u64,
    pub pool_key: String,
    pub skill_id: u32,
    pub owner: Option<Entity>,
    pub owner_team: Option<i32>,
    pub target: Option<Entity>,
    pub pos: Vec2<f32>,
    pub direction: Vec2<f32>,
    pub speed: f32,
    pub amount: f32,
    pub calc_type: CalcType,
    /// 命中時修改的屬性
    pub stat_name: String,
    pub time_left: f32,
    /// 碰撞檢查半徑
    pub radius: f32,
    /// 可穿透次數
    pub pierce_count: u32,
    /// 已命中次數
    pub pierce_hits: u32,
    pub homing: bool,
    pub homing_strength: f32,
    pub group: EffectGroupType,
    /// 本次飛行已命中的目標
    pub hit_set: HashSet<Entity>,
}

impl Projectile {
    /// 重設所有模擬欄位，池裡拿出來的實例可能還留著上次的資料
    pub fn reset(&mut self, id: u64, pool_key: &str, spawn: &ProjectileSpawn) {
        self.id = id;
        self.pool_key.clear();
        self.pool_key.push_str(pool_key);
        self.skill_id = spawn.skill_id;
        self.owner = Some(spawn.owner);
        self.owner_team = spawn.owner_team;
        self.target = spawn.target;
        self.pos = spawn.pos;
        self.direction = normalize_or(spawn.direction, Vec2::unit_x());
        self.speed = spawn.speed.max(0.0);
        self.amount = spawn.amount;
        self.calc_type = spawn.calc_type;
        self.stat_name.clear();
        self.stat_name.push_str(&spawn.stat_name);
        self.time_left = spawn.life_time;
        self.radius = spawn.radius.max(0.0);
        self.pierce_count = spawn.pierce_count;
        self.pierce_hits = 0;
        self.homing = spawn.target.is_some() && spawn.homing_strength > 0.0;
        self.homing_strength = spawn.homing_strength.max(0.0);
        self.group = spawn.group;
        self.hit_set.clear();
    }

    /// 不會改變目標屬性的投射物不登記命中
    pub fn has_effect(&self) -> bool {
        match self.calc_type {
            CalcType::Add => self.amount.abs() > f32::EPSILON,
            CalcType::Multiply => (self.amount - 1.0).abs() > f32::EPSILON,
        }
    }

    /// 命中次數超過穿透次數
    pub fn pierce_exhausted(&self) -> bool {
        self.pierce_hits > self.pierce_count
    }
}

impl Poolable for Projectile {
    fn pool_key(&self) -> &str {
        &self.pool_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comp::EntityManager;

    fn spawn_params(owner: Entity, target: Option<Entity>) -> ProjectileSpawn {
        ProjectileSpawn {
            skill_id: 3,
            owner,
            owner_team: Some(1),
            target,
            pos: Vec2::new(1.0, 2.0),
            direction: Vec2::new(0.0, 3.0),
            speed: 10.0,
            amount: -25.0,
            calc_type: CalcType::Add,
            stat_name: "mana".into(),
            life_time: 2.0,
            radius: 0.5,
            pierce_count: 1,
            homing_strength: 4.0,
            group: EffectGroupType::Enemy,
        }
    }

    #[test]
    fn test_reset_clears_previous_flight() {
        let mut em = EntityManager::new();
        let owner = em.create_entity().unwrap();
        let victim = em.create_entity().unwrap();

        let mut p = Projectile::default();
        p.pierce_hits = 5;
        p.hit_set.insert(victim);
        p.time_left = -1.0;
        p.stat_name = "hp".into();
        p.reset(9, "skill_effect_1", &spawn_params(owner, None));

        assert_eq!(p.id, 9);
        assert_eq!(p.pool_key, "skill_effect_1");
        assert_eq!(p.pierce_hits, 0);
        assert!(p.hit_set.is_empty());
        assert_eq!(p.time_left, 2.0);
        assert_eq!(p.direction, Vec2::new(0.0, 1.0));
        assert_eq!(p.stat_name, "mana");
        assert_eq!(p.amount, -25.0);
        assert!(p.has_effect());
        // 沒有目標就不追蹤
        assert!(!p.homing);
    }

    #[test]
    fn test_homing_needs_target_and_strength() {
        let mut em = EntityManager::new();
        let owner = em.create_entity().unwrap();
        let target = em.create_entity().unwrap();
        let mut p = Projectile::default();
        p.reset(1, "k", &spawn_params(owner, Some(target)));
        assert!(p.homing);

        let mut params = spawn_params(owner, Some(target));
        params.homing_strength = 0.0;
        p.reset(2, "k", &params);
        assert!(!p.homing);
    }

    #[test]
    fn test_neutral_amount_has_no_effect() {
        let mut em = EntityManager::new();
        let owner = em.create_entity().unwrap();
        let mut params = spawn_params(owner, None);
        let mut p = Projectile::default();

        params.amount = 0.0;
        p.reset(1, "k", &params);
        assert!(!p.has_effect());

        params.calc_type = CalcType::Multiply;
        params.amount = 1.0;
        p.reset(2, "k", &params);
        assert!(!p.has_effect());

        params.amount = 0.5;
        p.reset(3, "k", &params);
        assert!(p.has_effect());
    }
}
