use serde::{Deserialize, Serialize};
use vek::*;

use super::{DestroyReason, Entity, SkillState};

/// 一個 tick 內產生的事件，由驅動端取走
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    SkillState {
        owner: Entity,
        skill_id: u32,
        from: SkillState,
        to: SkillState,
    },
    StatChanged {
        source: Entity,
        target: Entity,
        skill_id: u32,
        stat: String,
        before: f32,
        after: f32,
    },
    ProjectileSpawned {
        id: u64,
        skill_id: u32,
        owner: Entity,
        target: Option<Entity>,
        pos: Vec2<f32>,
    },
    ProjectileHit {
        id: u64,
        target: Entity,
        stat: String,
        amount: f32,
    },
    ProjectileDestroyed {
        id: u64,
        pos: Vec2<f32>,
        reason: DestroyReason,
    },
    Death {
        pos: Vec2<f32>,
        ent: Entity,
    },
}

impl Outcome {
    pub fn get_pos(&self) -> Option<Vec2<f32>> {
        match self {
            Outcome::ProjectileSpawned { pos, .. }
            | Outcome::ProjectileDestroyed { pos, .. }
            | Outcome::Death { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}
