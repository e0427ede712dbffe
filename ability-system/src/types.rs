use serde::{Deserialize, Serialize};

/// 技能範圍形狀
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SkillShape {
    #[default]
    None,   // 無形狀，只作用於指定目標
    Circle, // 圓形，半徑 radius
    Line,   // 直線，長 radius 寬 width
    Point,  // 以施法點為中心的圓
    Rect,   // 矩形，長 height 寬 width，沿面向
    Sector, // 扇形，半徑 radius 角度 width (度)
    All,    // 全場
}

/// 形狀觸發條件
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShapeTrigger {
    #[default]
    Hit,     // 命中
    Enter,   // 進入
    Exit,    // 離開
    Inside,  // 範圍內
    Outside, // 範圍外
}

/// 持續類型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DurationType {
    #[default]
    Time,  // 依時間
    Times, // 依次數
}

/// 數值計算方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalcType {
    #[default]
    Add,      // 加法
    Multiply, // 乘法
}

/// 數值類型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[default]
    Fixed,   // 固定值
    Random,  // value ~ value_max 隨機
    Percent, // 百分比
}

/// 百分比的基準
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueMaxType {
    #[default]
    Current, // 目前值
    Max,     // 最大值
}

/// 目標選擇方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelectType {
    #[default]
    Nearest,     // 最近
    Shape,       // 形狀內
    ShapeRandom, // 形狀內隨機
    Random,      // 全體隨機取 target_count
    All,         // 全體
    AllRandom,   // 全體，隨機順序
}

/// 投射物移動方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoveTargetType {
    Target,    // 追蹤目標
    Direction, // 朝目標方向直線飛行
}

/// 效果作用群組
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EffectGroupType {
    #[serde(rename = "self")]
    Self_,
    Ally,
    #[default]
    Enemy,
}
