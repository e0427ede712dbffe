/// 技能系統模組
///
/// 目標選擇與效果套用，由技能 tick 在作用時間點呼叫

pub mod effects;
pub mod targeting;

pub use effects::EffectManager;
pub use targeting::{resolve_targets, shape_contains, Resolution, TargetQuery};
