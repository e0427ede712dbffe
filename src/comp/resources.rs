use serde::{Deserialize, Serialize};

/// 模擬累積時間 (秒)
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Time(pub f64);

/// 本次 tick 的時間增量 (秒)，已經過上限裁切
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DeltaTime(pub f32);

/// 已執行的 tick 數
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tick(pub u64);
