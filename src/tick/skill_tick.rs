use ability_system::{ConfigSource, SkillConfig};
use serde::{Deserialize, Serialize};
use vek::Vec2;

use super::skill_system::{resolve_targets, EffectManager, TargetQuery};
use super::{ProjectileSystem, TickContext};
use crate::comp::*;
use crate::error::{ConfigKind, SimError};

/// 施法請求
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillRequest {
    pub caster: Entity,
    pub skill_id: u32,
    pub target: Option<Entity>,
    pub point: Option<Vec2<f32>>,
}

impl SkillRequest {
    pub fn new(caster: Entity, skill_id: u32) -> Self {
        Self {
            caster,
            skill_id,
            target: None,
            point: None,
        }
    }

    pub fn at_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn at_point(mut self, point: Vec2<f32>) -> Self {
        self.point = Some(point);
        self
    }
}

/// 技能執行期系統
///
/// 持有所有 SkillContent，依加入順序更新
#[derive(Debug, Default)]
pub struct SkillSystem {
    contents: Vec<SkillContent>,
}

fn emit(content: &SkillContent, step: &SkillStep, outcomes: &mut Vec<Outcome>) {
    for (from, to) in step.transitions.iter().copied() {
        outcomes.push(Outcome::SkillState {
            owner: content.source,
            skill_id: content.skill_id,
            from,
            to,
        });
    }
}

impl SkillSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &[SkillContent] {
        &self.contents
    }

    pub fn content(&self, owner: Entity, skill_id: u32) -> Option<&SkillContent> {
        self.contents
            .iter()
            .find(|c| c.source == owner && c.skill_id == skill_id)
    }

    fn index_of(&self, owner: Entity, skill_id: u32) -> Option<usize> {
        self.contents
            .iter()
            .position(|c| c.source == owner && c.skill_id == skill_id)
    }

    /// 賦予技能，重複賦予不會重置狀態
    pub fn grant_skill(&mut self, owner: Entity, skill_id: u32, configs: &dyn ConfigSource) -> Result<(), SimError> {
        configs.skill_config(skill_id).ok_or(SimError::ConfigNotFound {
            kind: ConfigKind::Skill,
            id: skill_id,
        })?;
        if self.index_of(owner, skill_id).is_none() {
            self.contents.push(SkillContent::new(skill_id, owner));
        }
        Ok(())
    }

    /// 依英雄配置賦予技能，找不到的技能記錄警告後略過，回傳成功數
    pub fn grant_hero(&mut self, owner: Entity, hero_id: u32, configs: &dyn ConfigSource) -> Result<usize, SimError> {
        let hero = configs.hero_skill_config(hero_id).ok_or(SimError::ConfigNotFound {
            kind: ConfigKind::HeroSkill,
            id: hero_id,
        })?;
        let mut granted = 0;
        for skill_id in hero.skill_ids.iter().copied() {
            match self.grant_skill(owner, skill_id, configs) {
                Ok(()) => granted += 1,
                Err(err) => log::warn!("英雄 {} 的技能略過: {}", hero_id, err),
            }
        }
        log::info!("{} 取得英雄 {} 的 {} 個技能", owner, hero_id, granted);
        Ok(granted)
    }

    /// 施放技能，沒有賦予過的技能會直接建立
    pub fn cast(
        &mut self,
        em: &EntityManager,
        configs: &dyn ConfigSource,
        request: &SkillRequest,
        outcomes: &mut Vec<Outcome>,
    ) -> Result<(), SimError> {
        let config = configs.skill_config(request.skill_id).ok_or(SimError::ConfigNotFound {
            kind: ConfigKind::Skill,
            id: request.skill_id,
        })?;
        if !is_alive(em, request.caster) {
            return Err(SimError::StaleReference(request.caster));
        }
        let target = request.target.filter(|t| {
            let found = em.contains(*t);
            if !found {
                log::debug!("施法目標 {} 已不存在，視為沒有目標", t);
            }
            found
        });

        let index = match self.index_of(request.caster, request.skill_id) {
            Some(i) => i,
            None => {
                self.contents
                    .push(SkillContent::new(request.skill_id, request.caster));
                self.contents.len() - 1
            }
        };
        let content = &mut self.contents[index];
        let step = content.begin_cast(config, target, request.point)?;
        content.position = em.get_component::<Pos>(request.caster).map(|p| p.0);
        emit(content, &step, outcomes);
        Ok(())
    }

    pub fn cancel(&mut self, owner: Entity, skill_id: u32, outcomes: &mut Vec<Outcome>) -> bool {
        self.control(owner, skill_id, outcomes, SkillContent::cancel)
    }

    pub fn pause(&mut self, owner: Entity, skill_id: u32, outcomes: &mut Vec<Outcome>) -> bool {
        self.control(owner, skill_id, outcomes, SkillContent::pause)
    }

    pub fn resume(&mut self, owner: Entity, skill_id: u32, outcomes: &mut Vec<Outcome>) -> bool {
        self.control(owner, skill_id, outcomes, SkillContent::resume)
    }

    fn control(
        &mut self,
        owner: Entity,
        skill_id: u32,
        outcomes: &mut Vec<Outcome>,
        f: fn(&mut SkillContent) -> Option<SkillStep>,
    ) -> bool {
        let Some(index) = self.index_of(owner, skill_id) else {
            return false;
        };
        let content = &mut self.contents[index];
        match f(content) {
            Some(step) => {
                emit(content, &step, outcomes);
                true
            }
            None => false,
        }
    }

    /// 更新所有技能，單一技能失敗只影響自己
    pub fn run(&mut self, ctx: &mut TickContext, projectiles: &mut ProjectileSystem) -> Result<(), SimError> {
        self.contents.retain(|c| {
            let keep = ctx.registry.contains(c.source);
            if !keep {
                log::debug!("{} 已移除，丟棄技能 {}", c.source, c.skill_id);
            }
            keep
        });

        for content in self.contents.iter_mut() {
            if let Err(err) = Self::run_content(content, ctx, projectiles) {
                if err.is_fatal() {
                    return Err(err);
                }
                log::warn!("技能 {} ({}) 本 tick 略過: {}", content.skill_id, content.source, err);
            }
        }
        Ok(())
    }

    fn run_content(
        content: &mut SkillContent,
        ctx: &mut TickContext,
        projectiles: &mut ProjectileSystem,
    ) -> Result<(), SimError> {
        let configs = ctx.configs;
        let config = configs
            .skill_config(content.skill_id)
            .ok_or(SimError::ConfigNotFound {
                kind: ConfigKind::Skill,
                id: content.skill_id,
            })?;

        if !is_alive(ctx.registry, content.source) {
            if let Some(step) = content.interrupt() {
                log::debug!("{} 無法行動，中斷技能 {}", content.source, content.skill_id);
                emit(content, &step, ctx.outcomes);
            }
        }

        let step = content.advance(ctx.dt, config);
        if let Some(p) = ctx.registry.get_component::<Pos>(content.source) {
            content.position = Some(p.0);
        }
        for _ in 0..step.applications {
            Self::apply(content, config, ctx, projectiles);
        }
        emit(content, &step, ctx.outcomes);
        Ok(())
    }

    /// 一次作用: 選目標後套用數值或發射投射物
    fn apply(
        content: &mut SkillContent,
        config: &SkillConfig,
        ctx: &mut TickContext,
        projectiles: &mut ProjectileSystem,
    ) {
        let caster = content.source;
        let origin = content.position.unwrap_or_default();
        let facing = ctx
            .registry
            .get_component::<Facing>(caster)
            .map_or(Vec2::unit_x(), |f| f.0);
        let explicit = content.target.filter(|t| ctx.registry.contains(*t));

        let resolution = {
            let query = TargetQuery {
                caster,
                origin,
                facing,
                point: content.target_pos,
                explicit,
                previous_inside: &content.inside,
            };
            resolve_targets(config, &query, &*ctx.registry, ctx.searcher, &mut *ctx.rng)
        };
        if let Some(inside) = resolution.inside {
            content.inside = inside;
        }

        if config.is_projectile() {
            let spawns = EffectManager::projectile_spawns(
                config,
                caster,
                origin,
                facing,
                content.target_pos,
                &resolution.targets,
                &*ctx.registry,
                &mut *ctx.rng,
            );
            for spawn in spawns.iter() {
                projectiles.spawn(config.effect_id, spawn, ctx.outcomes);
            }
            return;
        }

        if resolution.targets.is_empty() {
            log::trace!("技能 {} ({}) 沒有目標", config.id, caster);
            return;
        }
        for target in resolution.targets {
            EffectManager::apply_stat(config, caster, target, ctx.registry, &mut *ctx.rng, ctx.outcomes);
        }
    }
}
