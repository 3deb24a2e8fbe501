//! 按住计时
//!
//! 同一个 [`HoldTracker`] 既用于“按住期间重复触发”（手动开关），
//! 也用于“长按触发一次”（解绑键），区别只在于触发方式和阈值。

use crate::input::{ButtonEdge, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldMode {
    /// 按下立即触发，之后每隔固定间隔再触发
    Repeat,
    /// 按住超过阈值后触发一次
    Once,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldTracker {
    mode: HoldMode,
    threshold_ms: u64,
    press_started_at: Option<u64>,
    fired: bool,
    last_fired_at: Option<u64>,
}

impl HoldTracker {
    pub fn repeating(interval_ms: u64) -> Self {
        Self::with_mode(HoldMode::Repeat, interval_ms)
    }

    pub fn once(threshold_ms: u64) -> Self {
        Self::with_mode(HoldMode::Once, threshold_ms)
    }

    fn with_mode(mode: HoldMode, threshold_ms: u64) -> Self {
        Self {
            mode,
            threshold_ms,
            press_started_at: None,
            fired: false,
            last_fired_at: None,
        }
    }

    /// 处理边沿，重复模式下按下边沿立即返回 `true`
    pub fn on_edge(&mut self, edge: &ButtonEdge) -> bool {
        match edge.level {
            Level::Pressed => {
                self.press_started_at = Some(edge.at);
                self.fired = false;
                match self.mode {
                    HoldMode::Repeat => {
                        self.fired = true;
                        self.last_fired_at = Some(edge.at);
                        true
                    }
                    HoldMode::Once => false,
                }
            }
            Level::Released => {
                self.reset();
                false
            }
        }
    }

    /// 按住期间检查是否到达触发时间
    pub fn poll(&mut self, now: u64) -> bool {
        let Some(started) = self.press_started_at else {
            return false;
        };

        match self.mode {
            HoldMode::Repeat => {
                let last = self.last_fired_at.unwrap_or(started);
                if now.saturating_sub(last) >= self.threshold_ms {
                    self.last_fired_at = Some(now);
                    self.fired = true;
                    true
                } else {
                    false
                }
            }
            HoldMode::Once => {
                if !self.fired && now.saturating_sub(started) >= self.threshold_ms {
                    self.fired = true;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn is_held(&self) -> bool {
        self.press_started_at.is_some()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn press_started_at(&self) -> Option<u64> {
        self.press_started_at
    }

    pub fn reset(&mut self) {
        self.press_started_at = None;
        self.fired = false;
        self.last_fired_at = None;
    }
}

/// 松开后的延迟单次触发，同一次松开最多触发一次
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseTimer {
    released_at: Option<u64>,
}

impl ReleaseTimer {
    pub fn arm(&mut self, now: u64) {
        self.released_at = Some(now);
    }

    pub fn cancel(&mut self) {
        self.released_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.released_at.is_some()
    }

    /// 到期时返回 `true` 并解除
    pub fn poll(&mut self, now: u64, delay_ms: u64) -> bool {
        match self.released_at {
            Some(at) if now.saturating_sub(at) >= delay_ms => {
                self.released_at = None;
                true
            }
            _ => false,
        }
    }
}
