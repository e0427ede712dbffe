use std::time::{Duration, Instant};

/// 固定頻率的 tick 時鐘
///
/// `tick` 會睡到下一個 tick 的時間點，`dt` 回傳上一個 tick 實際經過的時間
pub struct Clock {
    target_dt: Duration,
    last: Instant,
    last_dt: Duration,
}

impl Clock {
    pub fn new(target_dt: Duration) -> Self {
        Self {
            target_dt,
            last: Instant::now(),
            last_dt: target_dt,
        }
    }

    pub fn target_dt(&self) -> Duration {
        self.target_dt
    }

    pub fn dt(&self) -> Duration {
        self.last_dt
    }

    /// 等待到下一個 tick
    pub fn tick(&mut self) {
        let busy = self.last.elapsed();
        if let Some(remaining) = self.target_dt.checked_sub(busy) {
            spin_sleep::sleep(remaining);
        }
        let now = Instant::now();
        self.last_dt = now.duration_since(self.last);
        self.last = now;
    }
}
