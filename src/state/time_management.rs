/// 時間管理器 - 負責模擬時間與 tick 計數

use std::time::Duration;

use crate::comp::{DeltaTime, Tick, Time};

/// 時間管理器
#[derive(Debug, Clone)]
pub struct TimeManager {
    /// 最大增量時間
    max_delta_time: f32,
    time: Time,
    delta: DeltaTime,
    tick: Tick,
    paused: bool,
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeManager {
    pub fn new() -> Self {
        Self::with_config(1.0)
    }

    pub fn with_config(max_delta_time: f32) -> Self {
        Self {
            max_delta_time: max_delta_time.max(0.0),
            time: Time(0.0),
            delta: DeltaTime(0.0),
            tick: Tick(0),
            paused: false,
        }
    }

    /// 更新時間並回傳本 tick 使用的增量，暫停時為 0
    pub fn update(&mut self, dt: Duration) -> f32 {
        let dt = if self.paused {
            0.0
        } else {
            dt.as_secs_f32().min(self.max_delta_time)
        };
        self.delta = DeltaTime(dt);
        self.time.0 += dt as f64;
        dt
    }

    pub fn advance_tick(&mut self) {
        self.tick.0 += 1;
    }

    /// 暫停時間（增量時間為0）
    pub fn pause_time(&mut self) {
        self.paused = true;
        log::info!("模擬時間已暫停");
    }

    pub fn resume_time(&mut self) {
        self.paused = false;
        log::info!("模擬時間已恢復");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 設置最大增量時間
    pub fn set_max_delta_time(&mut self, max_dt: f32) {
        self.max_delta_time = max_dt.max(0.0);
        log::info!("最大增量時間設置為: {}", max_dt);
    }

    pub fn get_max_delta_time(&self) -> f32 {
        self.max_delta_time
    }

    /// 獲取當前模擬時間
    pub fn get_time(&self) -> f64 {
        self.time.0
    }

    pub fn get_delta_time(&self) -> f32 {
        self.delta.0
    }

    pub fn get_tick(&self) -> u64 {
        self.tick.0
    }
}
