#![cfg_attr(not(feature = "simulator"), no_std)]

pub mod config;
pub mod error;
pub mod hal;
pub mod link;
pub mod protocol;
pub mod utils;

// 重新导出核心模块
pub use config::{LinkConfig, NodeConfig, TimingConfig};
pub use error::{ConfigError, HalError};
pub use hal::{Board, Clock, LineTransport, NodePins};
pub use link::MeshLink;
pub use protocol::{LinkState, OutboundCommand, ProtocolEvent, RemoteCommand};
pub use utils::{LineBuffer, Line};
