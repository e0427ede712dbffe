/// 模擬狀態管理模塊
///
/// 負責持有實體管理器、技能與投射物系統，並以固定順序推進每個 tick

pub mod core;
pub mod initialization;
pub mod time_management;

pub use self::core::State;
pub use initialization::{StateInitializer, UnitSpawn};
pub use time_management::TimeManager;
