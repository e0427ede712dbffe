use thiserror::Error;

use crate::comp::{Entity, SkillState};

/// 找不到的配置種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Skill,
    HeroSkill,
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigKind::Skill => write!(f, "SkillConfig"),
            ConfigKind::HeroSkill => write!(f, "HeroSkillConfig"),
        }
    }
}

/// 模擬核心錯誤
///
/// 只有 `IdentitySpaceExhausted` 是致命錯誤，其餘都由呼叫端略過該單位的工作
#[derive(Debug, Error)]
pub enum SimError {
    #[error("實體 id 已用盡")]
    IdentitySpaceExhausted,

    #[error("找不到配置 {kind} id {id}")]
    ConfigNotFound { kind: ConfigKind, id: u32 },

    #[error("實體 {0} 已不存在")]
    StaleReference(Entity),

    #[error("物件池 key 不符: 要求 {expected}, 取得 {found}")]
    PoolKeyMismatch { expected: String, found: String },

    #[error("技能 {skill_id} 冷卻中，剩餘 {remaining:.2} 秒")]
    OnCooldown { skill_id: u32, remaining: f32 },

    #[error("技能 {skill_id} 目前狀態 {state:?} 無法施放")]
    SkillBusy { skill_id: u32, state: SkillState },

    #[error(transparent)]
    Config(#[from] ability_system::ConfigError),

    #[error("設定檔解析失敗: {0}")]
    Setting(#[from] toml::de::Error),

    #[error("讀取檔案失敗: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// 是否為無法繼續模擬的錯誤
    pub fn is_fatal(&self) -> bool {
        matches!(self, SimError::IdentitySpaceExhausted)
    }
}
