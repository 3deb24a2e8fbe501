#[cfg(feature = "epy")]
pub mod epy;
#[cfg(feature = "simulator")]
pub mod simulator;

use core::fmt::Debug;

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::utils::Line;

/// 串口行传输抽象，物理通道的生命周期由宿主程序负责
pub trait LineTransport {
    type Error: Debug;

    /// 写出原始字节
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// 在 `timeout_ms` 内等待一整行，超时返回 `Ok(None)`
    fn read_line(&mut self, timeout_ms: u32) -> Result<Option<Line>, Self::Error>;

    /// 当前可读的字节数
    fn bytes_available(&mut self) -> usize;

    /// 丢弃已到达但尚未读出的全部数据，包括未完成的半行
    fn discard(&mut self);
}

/// 毫秒时钟
pub trait Clock {
    /// 获取当前时间戳（毫秒）
    fn now_ms(&self) -> u64;

    /// 延时指定毫秒数
    fn delay_ms(&mut self, ms: u32);
}

/// 节点外设，按键均为上拉输入，低电平表示按下
pub struct NodePins<I, O> {
    /// 手动开关按键，远端锁节点可以不接
    pub override_button: Option<I>,
    /// 长按解除绑定按键
    pub unbind_button: I,
    /// 继电器（电磁锁）
    pub relay: O,
    /// 锁状态指示灯，跟随继电器
    pub lock_led: O,
    /// 绑定状态指示灯
    pub status_led: O,
}

/// 板级硬件抽象，拆分为各自独立拥有的外设
pub trait Board {
    type Transport: LineTransport;
    type Clock: Clock;
    type PinError: Debug;
    type Input: InputPin<Error = Self::PinError>;
    type Output: OutputPin<Error = Self::PinError>;

    fn split(self) -> (Self::Transport, Self::Clock, NodePins<Self::Input, Self::Output>);
}
