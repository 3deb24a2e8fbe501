//! 节点配置
//!
//! 所有字段都有默认值，模拟器可从 JSON 文件加载覆盖项。

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub uart_id: u8,
    pub baud_rate: u32,
    /// 重启握手的等待上限
    pub reboot_timeout_ms: u32,
    /// 每个循环周期内读取一行的等待上限
    pub recv_timeout_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            uart_id: 0,
            baud_rate: 115_200,
            reboot_timeout_ms: 2000,
            recv_timeout_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u32,
    /// 远程开锁后的自动关闭时间，`None` 表示不自动关闭
    pub auto_off_ms: Option<u64>,
    /// 手动开关按住时重复发送 ON 的间隔
    pub repeat_interval_ms: u64,
    /// 手动开关松开后发送 OFF 的延迟
    pub release_delay_ms: u64,
    /// 长按解绑的阈值
    pub unbind_hold_ms: u64,
    /// 未绑定时状态灯的闪烁间隔
    pub blink_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            auto_off_ms: Some(30_000),
            repeat_interval_ms: 500,
            release_delay_ms: 5000,
            unbind_hold_ms: 5000,
            blink_interval_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub link: LinkConfig,
    pub timing: TimingConfig,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.link.baud_rate == 0 {
            return Err(ConfigError::Zero("link.baud_rate"));
        }
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::Zero("timing.tick_ms"));
        }
        if self.timing.repeat_interval_ms == 0 {
            return Err(ConfigError::Zero("timing.repeat_interval_ms"));
        }
        if self.timing.blink_interval_ms == 0 {
            return Err(ConfigError::Zero("timing.blink_interval_ms"));
        }
        if self.timing.auto_off_ms == Some(0) {
            return Err(ConfigError::Zero("timing.auto_off_ms"));
        }
        Ok(())
    }
}

#[cfg(feature = "simulator")]
impl NodeConfig {
    /// 解析 JSON 文本并校验
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: NodeConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置，未指定路径时使用默认值
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
                Self::from_json_str(&text)
            }
            None => Ok(Self::default()),
        }
    }
}
