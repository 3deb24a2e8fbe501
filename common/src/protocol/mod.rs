//! 网状网络模组的 AT 指令行协议
//!
//! 模组通过 UART 以 CR+LF 结尾的 ASCII 行与主机通信。主机下发 `AT+` 指令，
//! 模组回报绑定状态、发送确认以及来自其他节点的数据推送。

pub mod command;
pub mod frame;

use heapless::{String, Vec};

pub use command::{EncodedCommand, RemoteCommand};
pub use frame::classify;

// 协议常量
pub const MAX_LINE_LEN: usize = 128;
/// 单次发送的最大数据长度（编码前），超出部分截断
pub const MAX_PAYLOAD_LEN: usize = 20;
pub const LINE_END: &[u8] = b"\r\n";

// 下行指令
pub const CMD_REBOOT: &[u8] = b"AT+REBOOT";
pub const CMD_UNBIND: &[u8] = b"AT+NR";
pub const CMD_SEND_PREFIX: &[u8] = b"AT+MDTS 0 ";

// 上行标记
pub const MARKERS_PROVISIONED: [&[u8]; 2] = [b"SYS-MSG DEVICE PROV-ED", b"PROV-MSG SUCCESS"];
pub const MARKER_UNPROVISIONED: &[u8] = b"SYS-MSG DEVICE UNPROV";
pub const MARKER_SEND_SUCCESS: &[u8] = b"MDTS-MSG SUCCESS";
pub const MARKER_PEER_DATA: &[u8] = b"MDTS-MSG";
pub const MARKER_GROUP: &[u8] = b"MDTSG-MSG:";
pub const MARKER_POINT: &[u8] = b"MDTPG:";

/// 模组在网络中的标识
pub type ModuleId = String<32>;
/// 发送方地址，例如 `0x0028`
pub type Address = String<16>;
/// 对端数据令牌（发送方的十六进制文本）
pub type PeerText = String<MAX_LINE_LEN>;
/// 上行消息内容
pub type Payload = Vec<u8, MAX_LINE_LEN>;

/// 绑定状态，仅由链路适配器在识别到状态行时修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkState {
    pub bound: bool,
    /// 解除绑定时清空
    pub module_id: Option<ModuleId>,
}

impl LinkState {
    pub fn set_bound(&mut self, module_id: Option<ModuleId>) {
        self.bound = true;
        self.module_id = module_id;
    }

    pub fn set_unbound(&mut self) {
        self.bound = false;
        self.module_id = None;
    }
}

/// 从一行上行文本解析出的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// 绑定状态变化
    BindingChanged {
        bound: bool,
        module_id: Option<ModuleId>,
    },
    /// 其他已绑定节点发来的数据，格式 `MDTS-MSG <sender> 0 <payload>`
    PeerData { sender: Address, payload: PeerText },
    /// 群组推送 `MDTSG-MSG:`
    GroupMessage(Payload),
    /// 点对点推送 `MDTPG:`
    PointMessage(Payload),
    /// 本机发送成功确认
    SendAcknowledged,
    /// 其他无法识别的行，仅供调试
    Unrecognized(Payload),
}

/// 下行指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    Reboot,
    Unbind,
    SendPayload(Vec<u8, MAX_PAYLOAD_LEN>),
}

impl OutboundCommand {
    /// 构造发送指令，超过 20 字节的部分直接截断
    pub fn payload(data: &[u8]) -> Self {
        let take = core::cmp::min(data.len(), MAX_PAYLOAD_LEN);
        let mut payload = Vec::new();
        // 长度已限制在容量内
        let _ = payload.extend_from_slice(&data[..take]);
        OutboundCommand::SendPayload(payload)
    }

    /// 是否需要先完成绑定
    pub fn requires_binding(&self) -> bool {
        matches!(self, OutboundCommand::SendPayload(_))
    }
}
