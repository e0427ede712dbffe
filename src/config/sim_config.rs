use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use vek::Vec2;

use crate::error::SimError;

/// 世界邊界，投射物離開後銷毀
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl WorldBounds {
    pub fn contains(&self, p: Vec2<f32>) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimSetting {
    /// 每秒 tick 數
    pub tps: u32,
    /// 單一 tick 最大秒數
    pub max_delta_time: f32,
    pub seed: u64,
    /// 技能配置檔路徑
    pub skill_config: String,
    /// log4rs 設定檔路徑
    pub log_config: String,
    pub run_seconds: f32,
    /// 依 tps 實際等待
    pub realtime: bool,
    pub world_bounds: Option<WorldBounds>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Setting {
    sim: SimSetting,
}

impl Default for SimSetting {
    fn default() -> Self {
        Self {
            tps: 30,
            max_delta_time: 0.25,
            seed: 20240601,
            skill_config: "ability-configs/skills.yaml".to_string(),
            log_config: "log4rs.yml".to_string(),
            run_seconds: 10.0,
            realtime: false,
            world_bounds: None,
        }
    }
}

impl SimSetting {
    /// 讀取 toml 設定檔的 `[sim]` 區段
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let mut file = File::open(path.as_ref())?;
        let mut str_val = String::new();
        file.read_to_string(&mut str_val)?;
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SimError> {
        let setting: Setting = toml::from_str(content)?;
        Ok(setting.sim)
    }

    /// 固定 tick 間隔
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tps.max(1) as f64)
    }

    /// 總 tick 數
    pub fn total_ticks(&self) -> u64 {
        (self.run_seconds.max(0.0) as f64 * self.tps.max(1) as f64).round() as u64
    }
}
