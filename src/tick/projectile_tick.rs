use vek::Vec2;

use super::skill_system::EffectManager;
use super::TickContext;
use crate::comp::*;
use crate::config::WorldBounds;

/// 投射物系統，擁有所有飛行中的投射物
///
/// 依生成順序更新，銷毀後放回物件池
pub struct ProjectileSystem {
    pool: Box<dyn InstancePool<Projectile>>,
    active: Vec<Projectile>,
    next_id: u64,
    bounds: Option<WorldBounds>,
}

impl Default for ProjectileSystem {
    fn default() -> Self {
        Self::new(Box::new(ObjectPool::<Projectile>::new()), None)
    }
}

impl ProjectileSystem {
    pub fn new(pool: Box<dyn InstancePool<Projectile>>, bounds: Option<WorldBounds>) -> Self {
        Self {
            pool,
            active: Vec::new(),
            next_id: 0,
            bounds,
        }
    }

    pub fn active(&self) -> &[Projectile] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn idle_count(&self, effect_id: u32) -> usize {
        self.pool.idle_count(&EffectManager::pool_key(effect_id))
    }

    /// 從物件池取出並重設，回傳投射物 id
    pub fn spawn(&mut self, effect_id: u32, spawn: &ProjectileSpawn, outcomes: &mut Vec<Outcome>) -> u64 {
        let key = EffectManager::pool_key(effect_id);
        let mut proj = self.pool.acquire(&key);
        self.next_id += 1;
        proj.reset(self.next_id, &key, spawn);
        log::trace!("生成投射物 {} 技能 {} 來源 {}", proj.id, proj.skill_id, spawn.owner);
        outcomes.push(Outcome::ProjectileSpawned {
            id: proj.id,
            skill_id: proj.skill_id,
            owner: spawn.owner,
            target: proj.target,
            pos: proj.pos,
        });
        self.active.push(proj);
        self.next_id
    }

    pub fn run(&mut self, ctx: &mut TickContext) {
        let projs = std::mem::take(&mut self.active);
        let mut survivors = Vec::with_capacity(projs.len());
        for mut proj in projs {
            match Self::step(&mut proj, ctx, self.bounds.as_ref()) {
                Some(reason) => {
                    log::trace!("投射物 {} 銷毀 {:?}", proj.id, reason);
                    ctx.outcomes.push(Outcome::ProjectileDestroyed {
                        id: proj.id,
                        pos: proj.pos,
                        reason,
                    });
                    let key = proj.pool_key.clone();
                    self.pool.release(&key, proj);
                }
                None => survivors.push(proj),
            }
        }
        self.active = survivors;
    }

    /// 更新單一投射物，回傳銷毀原因
    fn step(proj: &mut Projectile, ctx: &mut TickContext, bounds: Option<&WorldBounds>) -> Option<DestroyReason> {
        let dt = ctx.dt;
        proj.time_left -= dt;
        if proj.time_left <= 0.0 {
            return Some(DestroyReason::LifeTime);
        }

        if proj.homing {
            Self::steer(proj, ctx.registry, dt);
        }
        proj.pos += proj.direction * proj.speed * dt;

        if Self::collide(proj, ctx) {
            return Some(DestroyReason::PierceExceeded);
        }

        match bounds {
            Some(b) if !b.contains(proj.pos) => Some(DestroyReason::OutOfBounds),
            _ => None,
        }
    }

    /// 以指數逼近把方向轉向目標，目標不在時維持直線
    fn steer(proj: &mut Projectile, em: &EntityManager, dt: f32) {
        let target_pos = proj
            .target
            .filter(|t| is_alive(em, *t))
            .and_then(|t| em.get_component::<Pos>(t));
        if let Some(tp) = target_pos {
            let desired = normalize_or(tp.0 - proj.pos, proj.direction);
            let blend = 1.0 - (-proj.homing_strength * dt).exp();
            let turned = proj.direction + (desired - proj.direction) * blend;
            proj.direction = normalize_or(turned, desired);
        }
    }

    /// 碰撞與傷害，穿透次數用完回傳 true
    fn collide(proj: &mut Projectile, ctx: &mut TickContext) -> bool {
        if !proj.has_effect() || proj.radius <= 0.0 {
            return false;
        }
        let candidates = ctx.searcher.nearest_entities(proj.pos, proj.radius, usize::MAX);
        for DisIndex { e, .. } in candidates {
            // 快照之後才死亡的也要略過
            if !is_alive(ctx.registry, e) {
                continue;
            }
            if !in_group(proj.group, proj.owner, proj.owner_team, e, team_of(ctx.registry, e)) {
                continue;
            }
            if !proj.hit_set.insert(e) {
                continue;
            }
            proj.pierce_hits += 1;
            Self::hit(proj, e, ctx);
            if proj.pierce_exhausted() {
                return true;
            }
        }
        false
    }

    /// 與直接技能相同的方式修改目標屬性
    fn hit(proj: &Projectile, target: Entity, ctx: &mut TickContext) {
        ctx.outcomes.push(Outcome::ProjectileHit {
            id: proj.id,
            target,
            stat: proj.stat_name.clone(),
            amount: proj.amount,
        });
        let source = proj.owner.unwrap_or(target);
        let (calc_type, amount) = (proj.calc_type, proj.amount);
        let changed = EffectManager::modify_stat(
            ctx.registry,
            source,
            target,
            proj.skill_id,
            &proj.stat_name,
            |s| EffectManager::combine(calc_type, s.current, amount),
            ctx.outcomes,
        );
        if changed.is_none() {
            log::debug!("{} 沒有屬性 {}，投射物 {} 命中無效", target, proj.stat_name, proj.id);
        }
    }
}
