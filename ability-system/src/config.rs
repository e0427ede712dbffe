use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::*;

fn default_stat_name() -> String {
    "hp".to_string()
}

fn default_target_count() -> u32 {
    1
}

fn default_collision_radius() -> f32 {
    0.5
}

/// 技能配置 - 載入後不再修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillConfig {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,

    /// 範圍
    #[serde(default)]
    pub shape: SkillShape,
    #[serde(default)]
    pub shape_trigger: ShapeTrigger,
    #[serde(default)]
    pub radius: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,

    /// 影響的屬性，以及施法者用來加成的屬性
    #[serde(default = "default_stat_name")]
    pub stat_name: String,
    #[serde(default)]
    pub enhance_stat_name: Option<String>,

    /// 持續與間隔
    #[serde(default)]
    pub duration_type: DurationType,
    #[serde(default)]
    pub duration_value: f32,
    #[serde(default)]
    pub interval_value: f32,
    #[serde(default)]
    pub cooldown: f32,

    /// 數值
    #[serde(default)]
    pub calc_type: CalcType,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub value: f32,
    #[serde(default)]
    pub value_max: f32,
    #[serde(default)]
    pub value_max_type: ValueMaxType,

    /// 目標
    #[serde(default)]
    pub target_select_type: TargetSelectType,
    #[serde(default = "default_target_count")]
    pub target_count: u32,

    /// 投射物，move_target_type 為空表示直接作用
    #[serde(default)]
    pub move_target_type: Option<MoveTargetType>,
    #[serde(default)]
    pub move_speed: f32,
    #[serde(default)]
    pub move_distance: f32,
    #[serde(default)]
    pub pierce_count: u32,
    #[serde(default)]
    pub homing_strength: f32,
    #[serde(default = "default_collision_radius")]
    pub collision_radius: f32,

    #[serde(default)]
    pub effect_id: u32,
    #[serde(default)]
    pub effect_group_type: EffectGroupType,

    #[serde(default)]
    pub pre_delay: f32,
    #[serde(default)]
    pub post_delay: f32,

    #[serde(default)]
    pub cast_animation: Option<String>,
    #[serde(default)]
    pub hit_animation: Option<String>,
}

impl SkillConfig {
    /// 建立只有 id 的預設配置，其餘欄位與反序列化預設值一致
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            icon: None,
            shape: SkillShape::None,
            shape_trigger: ShapeTrigger::Hit,
            radius: 0.0,
            width: 0.0,
            height: 0.0,
            stat_name: default_stat_name(),
            enhance_stat_name: None,
            duration_type: DurationType::Time,
            duration_value: 0.0,
            interval_value: 0.0,
            cooldown: 0.0,
            calc_type: CalcType::Add,
            value_type: ValueType::Fixed,
            value: 0.0,
            value_max: 0.0,
            value_max_type: ValueMaxType::Current,
            target_select_type: TargetSelectType::Nearest,
            target_count: default_target_count(),
            move_target_type: None,
            move_speed: 0.0,
            move_distance: 0.0,
            pierce_count: 0,
            homing_strength: 0.0,
            collision_radius: default_collision_radius(),
            effect_id: 0,
            effect_group_type: EffectGroupType::Enemy,
            pre_delay: 0.0,
            post_delay: 0.0,
            cast_animation: None,
            hit_animation: None,
        }
    }

    /// 是否以投射物施放
    pub fn is_projectile(&self) -> bool {
        self.move_target_type.is_some()
    }

    /// 檢查數值範圍
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("cooldown", self.cooldown),
            ("duration_value", self.duration_value),
            ("interval_value", self.interval_value),
            ("pre_delay", self.pre_delay),
            ("post_delay", self.post_delay),
            ("radius", self.radius),
            ("width", self.width),
            ("height", self.height),
            ("move_speed", self.move_speed),
            ("move_distance", self.move_distance),
            ("homing_strength", self.homing_strength),
            ("collision_radius", self.collision_radius),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(self.invalid(format!("{} 不可為負數: {}", field, value)));
            }
        }
        if self.duration_type == DurationType::Times && self.duration_value < 1.0 {
            return Err(self.invalid(format!(
                "次數型技能 duration_value 至少為 1: {}",
                self.duration_value
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> ConfigError {
        ConfigError::Invalid {
            table: SKILL_TABLE,
            id: self.id,
            reason,
        }
    }
}

/// 英雄技能配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeroSkillConfig {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skill_ids: Vec<u32>,
}

/// 配置存取介面 - 模擬核心只透過這個介面讀取配置
pub trait ConfigSource {
    fn skill_config(&self, id: u32) -> Option<&SkillConfig>;
    fn hero_skill_config(&self, id: u32) -> Option<&HeroSkillConfig>;
}

/// 配置檔格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// 依副檔名判斷格式
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub const SKILL_TABLE: &str = "SkillConfig";
pub const HERO_SKILL_TABLE: &str = "HeroSkillConfig";

/// 配置表註冊項: 表名對應強型別的解析函式
pub struct ConfigTable {
    pub key: &'static str,
    pub parse: fn(&mut ConfigManager, serde_json::Value) -> Result<usize, ConfigError>,
}

/// 所有可載入的配置表
pub static CONFIG_TABLES: &[ConfigTable] = &[
    ConfigTable {
        key: SKILL_TABLE,
        parse: parse_skill_table,
    },
    ConfigTable {
        key: HERO_SKILL_TABLE,
        parse: parse_hero_skill_table,
    },
];

fn parse_skill_table(
    manager: &mut ConfigManager,
    value: serde_json::Value,
) -> Result<usize, ConfigError> {
    let records: Vec<SkillConfig> = serde_json::from_value(value)?;
    let count = records.len();
    for record in records {
        manager.register_skill(record)?;
    }
    Ok(count)
}

fn parse_hero_skill_table(
    manager: &mut ConfigManager,
    value: serde_json::Value,
) -> Result<usize, ConfigError> {
    let records: Vec<HeroSkillConfig> = serde_json::from_value(value)?;
    let count = records.len();
    for record in records {
        manager.register_hero_skill(record)?;
    }
    Ok(count)
}

/// 配置管理器
#[derive(Debug, Default, Clone)]
pub struct ConfigManager {
    skills: BTreeMap<u32, SkillConfig>,
    heroes: BTreeMap<u32, HeroSkillConfig>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從文件載入配置
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let count = self.load_from_str(&content, format)?;
        log::info!("成功載入配置: {} ({} 筆)", path.display(), count);
        Ok(count)
    }

    /// 從字串載入一份配置包，頂層鍵為配置表名
    ///
    /// 整包都解析並驗證成功才會併入，失敗時原本的配置不變
    pub fn load_from_str(&mut self, content: &str, format: ConfigFormat) -> Result<usize, ConfigError> {
        let root: BTreeMap<String, serde_json::Value> = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        };

        let mut staged = ConfigManager::new();
        let mut total = 0;
        for (key, value) in root {
            let table = CONFIG_TABLES
                .iter()
                .find(|t| t.key == key)
                .ok_or_else(|| ConfigError::UnknownTable(key.clone()))?;
            let count = (table.parse)(&mut staged, value)?;
            log::debug!("配置表 {} 載入 {} 筆", key, count);
            total += count;
        }
        self.merge(staged)?;
        Ok(total)
    }

    /// 併入另一份配置，任何 id 重複就整份拒絕
    pub fn merge(&mut self, other: ConfigManager) -> Result<(), ConfigError> {
        if let Some(id) = other.skills.keys().find(|id| self.skills.contains_key(*id)) {
            return Err(ConfigError::Duplicate {
                table: SKILL_TABLE,
                id: *id,
            });
        }
        if let Some(id) = other.heroes.keys().find(|id| self.heroes.contains_key(*id)) {
            return Err(ConfigError::Duplicate {
                table: HERO_SKILL_TABLE,
                id: *id,
            });
        }
        self.skills.extend(other.skills);
        self.heroes.extend(other.heroes);
        Ok(())
    }

    /// 註冊技能配置
    pub fn register_skill(&mut self, config: SkillConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if self.skills.contains_key(&config.id) {
            return Err(ConfigError::Duplicate {
                table: SKILL_TABLE,
                id: config.id,
            });
        }
        self.skills.insert(config.id, config);
        Ok(())
    }

    /// 註冊英雄技能配置
    pub fn register_hero_skill(&mut self, config: HeroSkillConfig) -> Result<(), ConfigError> {
        if self.heroes.contains_key(&config.id) {
            return Err(ConfigError::Duplicate {
                table: HERO_SKILL_TABLE,
                id: config.id,
            });
        }
        self.heroes.insert(config.id, config);
        Ok(())
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn hero_count(&self) -> usize {
        self.heroes.len()
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillConfig> {
        self.skills.values()
    }
}

impl ConfigSource for ConfigManager {
    fn skill_config(&self, id: u32) -> Option<&SkillConfig> {
        self.skills.get(&id)
    }

    fn hero_skill_config(&self, id: u32) -> Option<&HeroSkillConfig> {
        self.heroes.get(&id)
    }
}
