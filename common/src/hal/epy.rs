//! ePy 开发板板级实现，经厂商 SDK 的 C 接口访问 UART、GPIO 与系统节拍

use embedded_hal::digital::v2::{InputPin, OutputPin};
use tracing::warn;

use crate::config::LinkConfig;
use crate::error::HalError;
use crate::hal::{Board, Clock, LineTransport, NodePins};
use crate::protocol::MAX_LINE_LEN;
use crate::utils::{Line, LineBuffer};

// 扩展板引脚分配
pub const PIN_RELAY: u8 = 10;
pub const PIN_OVERRIDE: u8 = 19;
pub const PIN_UNBIND: u8 = 24;
pub const PIN_LED_YELLOW: u8 = 0x81;
pub const PIN_LED_GREEN: u8 = 0x82;

#[repr(C)]
pub struct UartConfig {
    uart_id: u8,
    baud_rate: u32,
}

extern "C" {
    fn epy_uart_init(config: *const UartConfig) -> i32;
    fn epy_uart_write(uart_id: u8, data: *const u8, len: usize) -> i32;
    fn epy_uart_any(uart_id: u8) -> i32;
    fn epy_uart_read(uart_id: u8, buf: *mut u8, max_len: usize) -> i32;
    fn epy_gpio_init(pin: u8, output: bool, pull_up: bool) -> i32;
    fn epy_gpio_read(pin: u8) -> i32;
    fn epy_gpio_write(pin: u8, level: u8) -> i32;
    fn epy_ticks_ms() -> u64;
    fn epy_delay_ms(ms: u32);
}

/// 连接网状网络模组的 UART
pub struct EpyUart {
    uart_id: u8,
    assembler: LineBuffer<MAX_LINE_LEN>,
}

impl EpyUart {
    pub fn new(config: &LinkConfig) -> Result<Self, HalError> {
        let uart = UartConfig {
            uart_id: config.uart_id,
            baud_rate: config.baud_rate,
        };

        let ret = unsafe { epy_uart_init(&uart as *const UartConfig) };
        if ret != 0 {
            return Err(HalError::WriteFailed(config.uart_id));
        }

        Ok(Self {
            uart_id: config.uart_id,
            assembler: LineBuffer::new(),
        })
    }

    /// 读取一个字节，没有数据时返回 None
    fn read_byte(&mut self) -> Result<Option<u8>, HalError> {
        let mut byte = 0u8;
        let ret = unsafe { epy_uart_read(self.uart_id, &mut byte as *mut u8, 1) };
        match ret {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => Err(HalError::ReadFailed(self.uart_id)),
        }
    }
}

impl LineTransport for EpyUart {
    type Error = HalError;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let ret = unsafe { epy_uart_write(self.uart_id, bytes.as_ptr(), bytes.len()) };
        if ret < 0 {
            Err(HalError::WriteFailed(self.uart_id))
        } else {
            Ok(())
        }
    }

    fn read_line(&mut self, timeout_ms: u32) -> Result<Option<Line>, Self::Error> {
        let start = unsafe { epy_ticks_ms() };

        loop {
            while unsafe { epy_uart_any(self.uart_id) } > 0 {
                match self.read_byte()? {
                    Some(byte) => {
                        if let Some(line) = self.assembler.push(byte) {
                            return Ok(Some(line));
                        }
                    }
                    None => break,
                }
            }

            let elapsed = unsafe { epy_ticks_ms() }.wrapping_sub(start);
            if elapsed >= timeout_ms as u64 {
                return Ok(None);
            }
            unsafe { epy_delay_ms(1) };
        }
    }

    fn bytes_available(&mut self) -> usize {
        let pending = unsafe { epy_uart_any(self.uart_id) };
        pending.max(0) as usize + self.assembler.len()
    }

    fn discard(&mut self) {
        let mut scratch = [0u8; 32];
        while unsafe { epy_uart_any(self.uart_id) } > 0 {
            let ret = unsafe { epy_uart_read(self.uart_id, scratch.as_mut_ptr(), scratch.len()) };
            if ret <= 0 {
                break;
            }
        }
        self.assembler.clear();
    }
}

/// GPIO 引脚，按键为上拉输入
pub struct EpyPin {
    pin: u8,
}

impl EpyPin {
    pub fn input(pin: u8) -> Result<Self, HalError> {
        Self::init(pin, false)
    }

    pub fn output(pin: u8) -> Result<Self, HalError> {
        let mut output = Self::init(pin, true)?;
        output.set_low()?;
        Ok(output)
    }

    fn init(pin: u8, output: bool) -> Result<Self, HalError> {
        let ret = unsafe { epy_gpio_init(pin, output, !output) };
        if ret == 0 {
            Ok(Self { pin })
        } else {
            Err(HalError::PinFailed(pin))
        }
    }

    fn level(&self) -> Result<bool, HalError> {
        match unsafe { epy_gpio_read(self.pin) } {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(HalError::PinFailed(self.pin)),
        }
    }

    fn write_level(&mut self, level: u8) -> Result<(), HalError> {
        let ret = unsafe { epy_gpio_write(self.pin, level) };
        if ret == 0 {
            Ok(())
        } else {
            Err(HalError::PinFailed(self.pin))
        }
    }
}

impl InputPin for EpyPin {
    type Error = HalError;

    fn is_high(&self) -> Result<bool, Self::Error> {
        self.level()
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.level().map(|high| !high)
    }
}

impl OutputPin for EpyPin {
    type Error = HalError;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_level(0)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_level(1)
    }
}

/// 系统节拍时钟
pub struct EpyClock;

impl Clock for EpyClock {
    fn now_ms(&self) -> u64 {
        unsafe { epy_ticks_ms() }
    }

    fn delay_ms(&mut self, ms: u32) {
        unsafe { epy_delay_ms(ms) }
    }
}

pub struct EpyBoard {
    uart: EpyUart,
    pins: NodePins<EpyPin, EpyPin>,
}

impl EpyBoard {
    /// 初始化串口与引脚；手动开关按键初始化失败时仅禁用该功能
    pub fn new(config: &LinkConfig) -> Result<Self, HalError> {
        let uart = EpyUart::new(config)?;

        let override_button = match EpyPin::input(PIN_OVERRIDE) {
            Ok(pin) => Some(pin),
            Err(e) => {
                warn!("手动开关按键初始化失败，功能停用: {}", e);
                None
            }
        };

        let pins = NodePins {
            override_button,
            unbind_button: EpyPin::input(PIN_UNBIND)?,
            relay: EpyPin::output(PIN_RELAY)?,
            lock_led: EpyPin::output(PIN_LED_YELLOW)?,
            status_led: EpyPin::output(PIN_LED_GREEN)?,
        };

        Ok(Self { uart, pins })
    }
}

impl Board for EpyBoard {
    type Transport = EpyUart;
    type Clock = EpyClock;
    type PinError = HalError;
    type Input = EpyPin;
    type Output = EpyPin;

    fn split(self) -> (EpyUart, EpyClock, NodePins<EpyPin, EpyPin>) {
        (self.uart, EpyClock, self.pins)
    }
}
