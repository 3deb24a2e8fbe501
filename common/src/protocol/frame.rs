//! 上行行文本分类
//!
//! 状态短语可能与其他子串同时出现，因此按固定优先级逐一匹配，首个命中即返回：
//! 绑定状态 > 发送确认 > 对端数据 > 群组推送 > 点对点推送 > 无法识别。

use crate::protocol::{
    Address, ModuleId, Payload, PeerText, ProtocolEvent, MARKERS_PROVISIONED, MARKER_GROUP,
    MARKER_PEER_DATA, MARKER_POINT, MARKER_SEND_SUCCESS, MARKER_UNPROVISIONED,
};
use crate::utils::bytes::{contains, find, to_text, tokens, trim};

/// 对一行文本进行分类，从不失败
pub fn classify(line: &[u8]) -> ProtocolEvent {
    if let Some(event) = parse_binding_status(line) {
        return event;
    }

    if contains(line, MARKER_SEND_SUCCESS) {
        return ProtocolEvent::SendAcknowledged;
    }

    if let Some(event) = parse_peer_data(line) {
        return event;
    }

    if let Some(payload) = after_marker(line, MARKER_GROUP) {
        return ProtocolEvent::GroupMessage(payload);
    }

    if let Some(payload) = after_marker(line, MARKER_POINT) {
        return ProtocolEvent::PointMessage(payload);
    }

    ProtocolEvent::Unrecognized(to_payload(trim(line)))
}

/// 解析绑定/解绑状态行
pub fn parse_binding_status(line: &[u8]) -> Option<ProtocolEvent> {
    for marker in MARKERS_PROVISIONED {
        if let Some(idx) = find(line, marker) {
            // 标识为标记之后的最后一个令牌
            let module_id: Option<ModuleId> = tokens(&line[idx + marker.len()..])
                .last()
                .map(to_text::<32>);
            return Some(ProtocolEvent::BindingChanged {
                bound: true,
                module_id,
            });
        }
    }

    if contains(line, MARKER_UNPROVISIONED) {
        return Some(ProtocolEvent::BindingChanged {
            bound: false,
            module_id: None,
        });
    }

    None
}

/// 解析 `MDTS-MSG <sender> 0 <payload>`，令牌从标记处开始计数
fn parse_peer_data(line: &[u8]) -> Option<ProtocolEvent> {
    let idx = find(line, MARKER_PEER_DATA)?;
    let mut parts = tokens(&line[idx..]);

    let marker = parts.next()?;
    if marker != MARKER_PEER_DATA {
        return None;
    }
    let sender = parts.next()?;
    if parts.next()? != b"0" {
        return None;
    }
    let payload = parts.next()?;

    let sender: Address = to_text(sender);
    let payload: PeerText = to_text(payload);
    Some(ProtocolEvent::PeerData { sender, payload })
}

/// 取标记之后的内容并去除首尾空白
fn after_marker(line: &[u8], marker: &[u8]) -> Option<Payload> {
    let idx = find(line, marker)?;
    Some(to_payload(trim(&line[idx + marker.len()..])))
}

fn to_payload(bytes: &[u8]) -> Payload {
    let mut payload = Payload::new();
    let take = core::cmp::min(bytes.len(), payload.capacity());
    let _ = payload.extend_from_slice(&bytes[..take]);
    payload
}
