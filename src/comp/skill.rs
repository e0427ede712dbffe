use ability_system::{DurationType, SkillConfig};
use serde::{Deserialize, Serialize};
use vek::Vec2;

use super::{Component, Entity};
use crate::error::SimError;

/// 計時器誤差，低於此值視為歸零
pub const TIMER_EPSILON: f32 = 1e-4;

/// 技能狀態
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillState {
    #[default]
    None,    // 可以施放
    Casting, // 施法中
    Cooling, // 冷卻中
    Cancel,  // 被中斷
    Pause,   // 暫停，計時凍結
    Finish,  // 次數用完
}

impl SkillState {
    /// 合法的狀態轉移
    pub fn can_transition_to(self, next: SkillState) -> bool {
        use SkillState::*;
        matches!(
            (self, next),
            (None, Casting)
                | (Casting, Cooling)
                | (Casting, Cancel)
                | (Casting, Finish)
                | (Casting, Pause)
                | (Pause, Casting)
                | (Cancel, Cooling)
                | (Finish, Cooling)
                | (Cooling, None)
        )
    }
}

/// 施放排程，由配置推導
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastSchedule {
    /// 總作用次數
    pub applications: u32,
    pub pre_delay: f32,
    pub interval: f32,
    /// 施法結束的時間點 (含後搖)
    pub end: f32,
    /// 結束後是否經過 Finish
    pub finishes: bool,
}

impl CastSchedule {
    pub fn from_config(config: &SkillConfig) -> Self {
        let pre_delay = config.pre_delay.max(0.0);
        let post_delay = config.post_delay.max(0.0);
        let interval = config.interval_value.max(0.0);
        let duration = config.duration_value.max(0.0);

        match config.duration_type {
            DurationType::Times => {
                let applications = (duration.round() as u32).max(1);
                let last = pre_delay + (applications - 1) as f32 * interval;
                Self {
                    applications,
                    pre_delay,
                    interval,
                    end: last + post_delay,
                    finishes: true,
                }
            }
            DurationType::Time => {
                // 作用時間點 k * interval < duration
                let applications = if interval > TIMER_EPSILON {
                    ((duration / interval) - TIMER_EPSILON).ceil().max(1.0) as u32
                } else {
                    1
                };
                let active = duration.max((applications - 1) as f32 * interval);
                Self {
                    applications,
                    pre_delay,
                    interval,
                    end: pre_delay + active + post_delay,
                    finishes: false,
                }
            }
        }
    }

    /// 第 `index` 次作用的時間點
    pub fn offset(&self, index: u32) -> f32 {
        self.pre_delay + index as f32 * self.interval
    }
}

/// 單次推進的結果
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillStep {
    /// 本次應觸發的作用次數
    pub applications: u32,
    pub transitions: Vec<(SkillState, SkillState)>,
}

/// 技能實例 - 一個單位身上一個技能的執行期狀態
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillContent {
    pub skill_id: u32,
    /// 施法者，只是關聯，查詢失敗視為不存在
    pub source: Entity,
    pub target: Option<Entity>,
    pub target_pos: Option<Vec2<f32>>,
    pub state: SkillState,
    pub cooldown_remaining: f32,
    pub cast_time: f32,
    pub repeat_count: u32,
    pub interval_remaining: f32,
    /// 最近一次的施法者位置
    pub position: Option<Vec2<f32>>,
    /// 上一次作用時在形狀內的實體，給進入/離開觸發用
    pub inside: Vec<Entity>,
}

impl Component for SkillContent {}

impl SkillContent {
    pub fn new(skill_id: u32, source: Entity) -> Self {
        Self {
            skill_id,
            source,
            target: None,
            target_pos: None,
            state: SkillState::None,
            cooldown_remaining: 0.0,
            cast_time: 0.0,
            repeat_count: 0,
            interval_remaining: 0.0,
            position: None,
            inside: Vec::new(),
        }
    }

    /// 檢查是否可以施放，不修改任何狀態
    pub fn can_cast(&self) -> Result<(), SimError> {
        match self.state {
            SkillState::None if self.cooldown_remaining <= TIMER_EPSILON => Ok(()),
            SkillState::None | SkillState::Cooling => Err(SimError::OnCooldown {
                skill_id: self.skill_id,
                remaining: self.cooldown_remaining,
            }),
            state => Err(SimError::SkillBusy {
                skill_id: self.skill_id,
                state,
            }),
        }
    }

    /// 開始施法，冷卻從這一刻開始計算
    pub fn begin_cast(
        &mut self,
        config: &SkillConfig,
        target: Option<Entity>,
        target_pos: Option<Vec2<f32>>,
    ) -> Result<SkillStep, SimError> {
        self.can_cast()?;
        let mut step = SkillStep::default();
        self.target = target;
        self.target_pos = target_pos;
        self.cooldown_remaining = config.cooldown.max(0.0);
        self.cast_time = 0.0;
        self.repeat_count = 0;
        self.interval_remaining = config.pre_delay.max(0.0);
        self.inside.clear();
        self.transition(SkillState::Casting, &mut step);
        Ok(step)
    }

    /// 中斷施法，剩下的作用全部略過
    pub fn cancel(&mut self) -> Option<SkillStep> {
        if self.state != SkillState::Casting {
            return None;
        }
        let mut step = SkillStep::default();
        self.transition(SkillState::Cancel, &mut step);
        Some(step)
    }

    /// 施法者被打斷 (死亡、硬直)，暫停中的技能先恢復再中斷
    pub fn interrupt(&mut self) -> Option<SkillStep> {
        let mut step = SkillStep::default();
        if self.state == SkillState::Pause {
            self.transition(SkillState::Casting, &mut step);
        }
        if self.state == SkillState::Casting {
            self.transition(SkillState::Cancel, &mut step);
        }
        (!step.transitions.is_empty()).then_some(step)
    }

    pub fn pause(&mut self) -> Option<SkillStep> {
        if self.state != SkillState::Casting {
            return None;
        }
        let mut step = SkillStep::default();
        self.transition(SkillState::Pause, &mut step);
        Some(step)
    }

    pub fn resume(&mut self) -> Option<SkillStep> {
        if self.state != SkillState::Pause {
            return None;
        }
        let mut step = SkillStep::default();
        self.transition(SkillState::Casting, &mut step);
        Some(step)
    }

    /// 推進 `dt` 秒
    pub fn advance(&mut self, dt: f32, config: &SkillConfig) -> SkillStep {
        let mut step = SkillStep::default();
        let dt = dt.max(0.0);

        match self.state {
            SkillState::Casting => {
                self.tick_cooldown(dt);
                self.advance_casting(dt, config, &mut step);
            }
            SkillState::Cancel | SkillState::Finish => {
                self.tick_cooldown(dt);
                self.transition(SkillState::Cooling, &mut step);
            }
            SkillState::Cooling => self.tick_cooldown(dt),
            SkillState::None | SkillState::Pause => {}
        }

        if self.state == SkillState::Cooling && self.cooldown_remaining <= TIMER_EPSILON {
            self.cooldown_remaining = 0.0;
            self.transition(SkillState::None, &mut step);
        }
        step
    }

    fn advance_casting(&mut self, dt: f32, config: &SkillConfig, step: &mut SkillStep) {
        let schedule = CastSchedule::from_config(config);
        self.cast_time += dt;

        while self.repeat_count < schedule.applications
            && self.cast_time + TIMER_EPSILON >= schedule.offset(self.repeat_count)
        {
            self.repeat_count += 1;
            step.applications += 1;
        }

        self.interval_remaining = if self.repeat_count < schedule.applications {
            (schedule.offset(self.repeat_count) - self.cast_time).max(0.0)
        } else {
            0.0
        };

        if self.repeat_count >= schedule.applications
            && self.cast_time + TIMER_EPSILON >= schedule.end
        {
            let next = if schedule.finishes {
                SkillState::Finish
            } else {
                SkillState::Cooling
            };
            self.transition(next, step);
        }
    }

    fn tick_cooldown(&mut self, dt: f32) {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
    }

    fn transition(&mut self, next: SkillState, step: &mut SkillStep) {
        debug_assert!(
            self.state.can_transition_to(next),
            "非法的技能狀態轉移 {:?} -> {:?}",
            self.state,
            next
        );
        log::trace!(
            "技能 {} ({}) {:?} -> {:?}",
            self.skill_id,
            self.source,
            self.state,
            next
        );
        step.transitions.push((self.state, next));
        self.state = next;
    }
}
