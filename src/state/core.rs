/// 模擬狀態核心結構

use std::time::Duration;

use ability_system::ConfigSource;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::comp::*;
use crate::config::SimSetting;
use crate::error::SimError;
use crate::tick::{ProjectileSystem, SkillRequest, SkillSystem, TickContext};

use super::{StateInitializer, TimeManager, UnitSpawn};

/// 模擬核心狀態
///
/// 所有服務都由這裡建立並在 tick 時以參數傳遞，沒有全域狀態
pub struct State {
    setting: SimSetting,
    /// 實體管理器
    registry: EntityManager,
    /// 唯讀的技能配置
    configs: Box<dyn ConfigSource>,
    skills: SkillSystem,
    projectiles: ProjectileSystem,
    rng: Pcg64,
    /// 時間管理器
    time_manager: TimeManager,
    outcomes: Vec<Outcome>,
}

impl State {
    pub fn new(setting: SimSetting, configs: impl ConfigSource + 'static) -> Self {
        log::info!("建立模擬狀態 tps {} seed {}", setting.tps, setting.seed);
        Self {
            registry: EntityManager::new(),
            configs: Box::new(configs),
            skills: SkillSystem::new(),
            projectiles: ProjectileSystem::new(Box::new(ObjectPool::<Projectile>::new()), setting.world_bounds),
            rng: Pcg64::seed_from_u64(setting.seed),
            time_manager: TimeManager::with_config(setting.max_delta_time),
            outcomes: Vec::new(),
            setting,
        }
    }

    /// 模擬主循環 tick
    pub fn tick(&mut self, dt: Duration) -> Result<(), SimError> {
        let dt = self.time_manager.update(dt);
        if self.time_manager.is_paused() {
            return Ok(());
        }

        let searcher = Searcher::from_registry(&self.registry);
        let mut ctx = TickContext {
            registry: &mut self.registry,
            configs: self.configs.as_ref(),
            searcher: &searcher,
            rng: &mut self.rng,
            outcomes: &mut self.outcomes,
            dt,
        };
        self.skills.run(&mut ctx, &mut self.projectiles)?;
        self.projectiles.run(&mut ctx);

        self.time_manager.advance_tick();
        Ok(())
    }

    pub fn spawn_unit(&mut self, spawn: UnitSpawn) -> Result<Entity, SimError> {
        StateInitializer::spawn_unit(&mut self.registry, &spawn)
    }

    /// 移除實體，身上的技能在下一個 tick 丟棄
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        self.registry.remove_entity(entity)
    }

    /// 依英雄配置授予技能，找不到配置時記錄警告
    pub fn grant_hero_skills(&mut self, entity: Entity, hero_id: u32) -> Result<usize, SimError> {
        let result = self.skills.grant_hero(entity, hero_id, self.configs.as_ref());
        if let Err(err @ SimError::ConfigNotFound { .. }) = &result {
            log::warn!("{} 授予英雄技能失敗: {}", entity, err);
        }
        result
    }

    pub fn grant_skill(&mut self, entity: Entity, skill_id: u32) -> Result<(), SimError> {
        let result = self.skills.grant_skill(entity, skill_id, self.configs.as_ref());
        if let Err(err @ SimError::ConfigNotFound { .. }) = &result {
            log::warn!("{} 授予技能失敗: {}", entity, err);
        }
        result
    }

    /// 施放技能，找不到配置時記錄警告
    pub fn cast(&mut self, request: SkillRequest) -> Result<(), SimError> {
        let result = self
            .skills
            .cast(&self.registry, self.configs.as_ref(), &request, &mut self.outcomes);
        if let Err(err @ SimError::ConfigNotFound { .. }) = &result {
            log::warn!("{} 施放失敗: {}", request.caster, err);
        }
        result
    }

    pub fn cancel_skill(&mut self, entity: Entity, skill_id: u32) -> bool {
        self.skills.cancel(entity, skill_id, &mut self.outcomes)
    }

    pub fn pause_skill(&mut self, entity: Entity, skill_id: u32) -> bool {
        self.skills.pause(entity, skill_id, &mut self.outcomes)
    }

    pub fn resume_skill(&mut self, entity: Entity, skill_id: u32) -> bool {
        self.skills.resume(entity, skill_id, &mut self.outcomes)
    }

    /// 取走目前累積的事件
    pub fn take_outcomes(&mut self) -> Vec<Outcome> {
        std::mem::take(&mut self.outcomes)
    }

    pub fn setting(&self) -> &SimSetting {
        &self.setting
    }

    /// 獲取實體管理器引用
    pub fn registry(&self) -> &EntityManager {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityManager {
        &mut self.registry
    }

    pub fn configs(&self) -> &dyn ConfigSource {
        self.configs.as_ref()
    }

    pub fn skills(&self) -> &SkillSystem {
        &self.skills
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn time_manager(&self) -> &TimeManager {
        &self.time_manager
    }

    pub fn time_manager_mut(&mut self) -> &mut TimeManager {
        &mut self.time_manager
    }

    /// 獲取模擬時間
    pub fn get_time(&self) -> f64 {
        self.time_manager.get_time()
    }

    pub fn get_tick(&self) -> u64 {
        self.time_manager.get_tick()
    }
}
