use heapless::Vec;

use crate::protocol::{OutboundCommand, CMD_REBOOT, CMD_SEND_PREFIX, CMD_UNBIND, LINE_END, MAX_PAYLOAD_LEN};
use crate::utils::bytes::trim;
use crate::utils::hex;

/// 编码后的一条下行指令，最长 `AT+MDTS 0 ` + 40 个十六进制字符 + CR LF
pub type EncodedCommand = Vec<u8, 64>;

impl OutboundCommand {
    /// 编码为模组指令文本（含 CR LF）
    pub fn encode(&self) -> EncodedCommand {
        let mut out = EncodedCommand::new();
        // 各段长度之和不超过容量
        match self {
            OutboundCommand::Reboot => {
                let _ = out.extend_from_slice(CMD_REBOOT);
            }
            OutboundCommand::Unbind => {
                let _ = out.extend_from_slice(CMD_UNBIND);
            }
            OutboundCommand::SendPayload(payload) => {
                let encoded: Vec<u8, { MAX_PAYLOAD_LEN * 2 }> = hex::encode_upper(payload);
                let _ = out.extend_from_slice(CMD_SEND_PREFIX);
                let _ = out.extend_from_slice(&encoded);
            }
        }
        let _ = out.extend_from_slice(LINE_END);
        out
    }
}

/// 锁控指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// "ON"：开锁
    Engage,
    /// "OFF"：关锁
    Disengage,
}

impl RemoteCommand {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            RemoteCommand::Engage => b"ON",
            RemoteCommand::Disengage => b"OFF",
        }
    }

    /// 解析纯文本指令，忽略首尾空白
    pub fn parse(text: &[u8]) -> Option<Self> {
        match trim(text) {
            b"ON" => Some(RemoteCommand::Engage),
            b"OFF" => Some(RemoteCommand::Disengage),
            _ => None,
        }
    }

    /// 对端数据携带的是发送方 AT+MDTS 的十六进制文本，先解码再解析
    pub fn from_peer_hex(text: &[u8]) -> Option<Self> {
        let decoded: Vec<u8, MAX_PAYLOAD_LEN> = hex::decode(trim(text))?;
        Self::parse(&decoded)
    }

    /// 推送消息先按文本解析，不成功再尝试十六进制
    pub fn from_push(payload: &[u8]) -> Option<Self> {
        Self::parse(payload).or_else(|| Self::from_peer_hex(payload))
    }

    pub fn to_outbound(self) -> OutboundCommand {
        OutboundCommand::payload(self.as_bytes())
    }
}
