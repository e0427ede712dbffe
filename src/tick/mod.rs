pub mod projectile_tick;
pub mod skill_system;
pub mod skill_tick;

pub use self::{
    projectile_tick::*,
    skill_tick::*,
};

use ability_system::ConfigSource;
use rand_pcg::Pcg64;

use crate::comp::*;

/// 單一 tick 內各系統共用的資料
///
/// 空間查詢是 tick 開始時的快照，存活判斷一律回到實體管理器確認
pub struct TickContext<'a> {
    pub registry: &'a mut EntityManager,
    pub configs: &'a dyn ConfigSource,
    pub searcher: &'a dyn SpatialQuery,
    pub rng: &'a mut Pcg64,
    pub outcomes: &'a mut Vec<Outcome>,
    pub dt: f32,
}
