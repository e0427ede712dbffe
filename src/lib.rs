/// Open MOBA 技能模擬核心
///
/// 實體管理、技能狀態機、目標選擇、投射物模擬與物件池

pub mod comp;
pub mod config;
pub mod error;
pub mod state;
pub mod tick;
pub mod util;

// Re-export commonly used types
pub use crate::comp::*;
pub use crate::config::{SimSetting, WorldBounds};
pub use crate::error::{ConfigKind, SimError};
pub use crate::state::{State, StateInitializer, TimeManager, UnitSpawn};
pub use crate::tick::{ProjectileSystem, SkillRequest, SkillSystem, TickContext};
