use thiserror::Error;

/// 硬件访问错误（串口、GPIO）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HalError {
    #[error("uart {0} write failed")]
    WriteFailed(u8),
    #[error("uart {0} read failed")]
    ReadFailed(u8),
    #[error("gpio pin {0} access failed")]
    PinFailed(u8),
    /// 模拟器对端已关闭
    #[error("simulated channel disconnected")]
    Disconnected,
}

/// 配置校验或解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: must be non-zero")]
    Zero(&'static str),
    #[cfg(feature = "simulator")]
    #[error("failed to read config file: {0}")]
    Io(String),
    #[cfg(feature = "simulator")]
    #[error("failed to parse config: {0}")]
    Parse(String),
}
