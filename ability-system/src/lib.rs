/// 技能配置資料
///
/// 技能與英雄技能的宣告式配置、列舉，以及唯讀的配置存取介面。
/// 執行期狀態不在這裡，由模擬核心負責。

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    ConfigFormat, ConfigManager, ConfigSource, ConfigTable, HeroSkillConfig, SkillConfig,
    CONFIG_TABLES, HERO_SKILL_TABLE, SKILL_TABLE,
};
pub use error::ConfigError;
pub use types::*;
