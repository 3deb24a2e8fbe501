//! 按键电平采样
//!
//! 只报告两次采样之间的电平变化及其时间戳，不做消抖；
//! 时间阈值由 [`crate::actuator`] 中的状态机处理。

use core::fmt::Debug;

use embedded_hal::digital::v2::InputPin;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    Pressed,
    #[default]
    Released,
}

/// 一次电平变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEdge {
    pub level: Level,
    pub at: u64,
}

impl ButtonEdge {
    pub fn pressed(at: u64) -> Self {
        Self {
            level: Level::Pressed,
            at,
        }
    }

    pub fn released(at: u64) -> Self {
        Self {
            level: Level::Released,
            at,
        }
    }
}

/// 读取当前电平并与上一次比较，返回 `(当前电平, 是否变化)`
///
/// 按键为上拉输入，低电平表示按下。
pub fn sample<P: InputPin>(pin: &P, previous: Level) -> Result<(Level, bool), P::Error> {
    let level = if pin.is_low()? {
        Level::Pressed
    } else {
        Level::Released
    };
    Ok((level, level != previous))
}

/// 记住上一次电平的按键
pub struct Button<P> {
    pin: P,
    level: Level,
}

impl<P> Button<P>
where
    P: InputPin,
    P::Error: Debug,
{
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            level: Level::Released,
        }
    }

    /// 采样一次，电平变化时返回边沿；读取失败按松开处理
    pub fn poll(&mut self, now: u64) -> Option<ButtonEdge> {
        let (level, changed) = match sample(&self.pin, self.level) {
            Ok(result) => result,
            Err(e) => {
                warn!("按键读取失败: {:?}", e);
                (Level::Released, self.level != Level::Released)
            }
        };
        self.level = level;
        changed.then_some(ButtonEdge { level, at: now })
    }

    /// 把记录的电平恢复为松开
    pub fn reset(&mut self) {
        self.level = Level::Released;
    }

    pub fn level(&self) -> Level {
        self.level
    }
}
