use serde::{Deserialize, Serialize};
use vek::*;

use super::Component;

/// Position
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pos(pub Vec2<f32>);

impl Component for Pos {}

/// 面向，單位向量
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Facing(pub Vec2<f32>);

impl Default for Facing {
    fn default() -> Self {
        Facing(Vec2::unit_x())
    }
}

impl Facing {
    /// 由任意向量建立，長度為零時維持 +x
    pub fn from_vec(v: Vec2<f32>) -> Self {
        Facing(normalize_or(v, Vec2::unit_x()))
    }
}

impl Component for Facing {}

/// 正規化，長度太小時回傳 `fallback`
pub fn normalize_or(v: Vec2<f32>, fallback: Vec2<f32>) -> Vec2<f32> {
    let len = v.magnitude();
    if len > 1e-6 {
        v / len
    } else {
        fallback
    }
}
