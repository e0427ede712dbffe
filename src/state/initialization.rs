/// 狀態初始化器 - 負責建立單位與示範場景

use vek::Vec2;

use super::State;
use crate::comp::*;
use crate::error::SimError;

/// 生成單位的參數
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSpawn {
    pub pos: Vec2<f32>,
    pub facing: Vec2<f32>,
    pub team: Option<i32>,
    pub hp: f32,
    pub stats: Vec<(String, Stat)>,
}

impl UnitSpawn {
    pub fn new(pos: Vec2<f32>, team: i32, hp: f32) -> Self {
        Self {
            pos,
            facing: Vec2::unit_x(),
            team: Some(team),
            hp,
            stats: Vec::new(),
        }
    }

    pub fn facing(mut self, facing: Vec2<f32>) -> Self {
        self.facing = facing;
        self
    }

    pub fn without_team(mut self) -> Self {
        self.team = None;
        self
    }

    pub fn with_stat(mut self, name: &str, stat: Stat) -> Self {
        self.stats.push((name.to_string(), stat));
        self
    }
}

/// 狀態初始化器
pub struct StateInitializer;

impl StateInitializer {
    /// 建立帶有位置、面向、陣營、屬性的單位
    pub fn spawn_unit(em: &mut EntityManager, spawn: &UnitSpawn) -> Result<Entity, SimError> {
        let e = em.create_entity()?;
        em.insert_component(e, Pos(spawn.pos));
        em.insert_component(e, Facing::from_vec(spawn.facing));
        if let Some(team_id) = spawn.team {
            em.insert_component(e, Faction { team_id });
        }
        let mut attrs = Attributes::new().with_hp(spawn.hp);
        for (name, stat) in spawn.stats.iter() {
            attrs = attrs.with_stat(name, *stat);
        }
        em.insert_component(e, attrs);
        Ok(e)
    }

    /// 示範場景: 一個英雄與一排敵方小兵，回傳英雄
    pub fn create_demo_scene(state: &mut State, hero_id: u32) -> Result<Entity, SimError> {
        let hero = state.spawn_unit(
            UnitSpawn::new(Vec2::zero(), 1, 500.0).with_stat("intelligence", Stat::full(20.0)),
        )?;
        match state.grant_hero_skills(hero, hero_id) {
            Ok(count) => log::info!("示範英雄 {} 取得 {} 個技能", hero, count),
            Err(err) => log::warn!("示範英雄沒有技能: {}", err),
        }

        for i in 0..8 {
            let x = 4.0 + i as f32 * 1.5;
            let y = if i % 2 == 0 { 1.0 } else { -1.0 };
            state.spawn_unit(
                UnitSpawn::new(Vec2::new(x, y), 2, 120.0).facing(-Vec2::unit_x()),
            )?;
        }
        log::info!("示範場景建立完成，共 {} 個實體", state.registry().len());
        Ok(hero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_unit_attaches_components() {
        let mut em = EntityManager::new();
        let e = StateInitializer::spawn_unit(
            &mut em,
            &UnitSpawn::new(Vec2::new(1.0, 2.0), 3, 50.0).with_stat("mana", Stat::full(10.0)),
        )
        .unwrap();
        assert_eq!(em.get_component::<Pos>(e), Some(&Pos(Vec2::new(1.0, 2.0))));
        assert_eq!(team_of(&em, e), Some(3));
        let attrs = em.get_component::<Attributes>(e).unwrap();
        assert_eq!(attrs.hp(), Some(50.0));
        assert_eq!(attrs.get("mana").map(|s| s.max), Some(10.0));
    }

    #[test]
    fn test_spawn_without_team() {
        let mut em = EntityManager::new();
        let e = StateInitializer::spawn_unit(&mut em, &UnitSpawn::new(Vec2::zero(), 1, 1.0).without_team())
            .unwrap();
        assert!(!em.has_component::<Faction>(e));
    }
}
