//! 网状网络模组链路适配器
//!
//! 独占持有行传输句柄，把上行行解析为 [`ProtocolEvent`]，把
//! [`OutboundCommand`] 编码后写出，并维护绑定状态。

use tracing::{debug, info, warn};

use crate::hal::{Clock, LineTransport};
use crate::protocol::{classify, LinkState, ModuleId, OutboundCommand, ProtocolEvent};
use crate::protocol::frame::parse_binding_status;
use crate::utils::bytes::to_text;

pub struct MeshLink<T: LineTransport> {
    transport: T,
    state: LinkState,
}

impl<T: LineTransport> MeshLink<T> {
    /// 创建适配器，并丢弃传输上已缓存的旧数据
    pub fn new(mut transport: T) -> Self {
        let stale = transport.bytes_available();
        if stale > 0 {
            debug!("丢弃 {} 字节残留数据", stale);
        }
        transport.discard();

        Self {
            transport,
            state: LinkState::default(),
        }
    }

    /// 重启模组并等待绑定状态行，返回是否已绑定
    ///
    /// 握手期间的其他行直接丢弃，不作为事件上报。
    pub fn reboot<C: Clock>(&mut self, clock: &C, timeout_ms: u32) -> bool {
        if !self.send(&OutboundCommand::Reboot) {
            return self.state.bound;
        }

        let start = clock.now_ms();
        loop {
            let elapsed = clock.now_ms().saturating_sub(start);
            if elapsed >= timeout_ms as u64 {
                warn!("等待模组状态超时");
                break;
            }
            let remaining = (timeout_ms as u64 - elapsed) as u32;

            let line = match self.transport.read_line(remaining) {
                Ok(Some(line)) => line,
                // 已等满剩余时间
                Ok(None) => {
                    warn!("等待模组状态超时");
                    break;
                }
                Err(e) => {
                    warn!("重启握手读取失败: {:?}", e);
                    break;
                }
            };

            match parse_binding_status(&line) {
                Some(event) => {
                    self.apply(&event);
                    break;
                }
                None => debug!("握手期间忽略: {}", to_text::<128>(&line)),
            }
        }

        self.state.bound
    }

    /// 编码并写出指令；未绑定时拒绝需要绑定的指令
    pub fn send(&mut self, command: &OutboundCommand) -> bool {
        if command.requires_binding() && !self.state.bound {
            warn!("模组未绑定，丢弃发送: {:?}", command);
            return false;
        }

        let encoded = command.encode();
        match self.transport.write(&encoded) {
            Ok(()) => true,
            Err(e) => {
                warn!("串口写入失败: {:?}", e);
                false
            }
        }
    }

    /// 写出解绑指令，并立即把本地状态置为未绑定
    pub fn unbind(&mut self) {
        self.send(&OutboundCommand::Unbind);
        if self.state.bound {
            info!("已解除绑定");
        }
        self.state.set_unbound();
    }

    /// 在 `timeout_ms` 内等待一行并解析
    pub fn poll(&mut self, timeout_ms: u32) -> Option<ProtocolEvent> {
        let line = match self.transport.read_line(timeout_ms) {
            Ok(Some(line)) => line,
            Ok(None) => return None,
            Err(e) => {
                warn!("串口读取失败: {:?}", e);
                return None;
            }
        };

        let event = classify(&line);
        match &event {
            ProtocolEvent::BindingChanged { .. } => self.apply(&event),
            ProtocolEvent::Unrecognized(raw) => debug!("未识别的行: {}", to_text::<128>(raw)),
            _ => {}
        }
        Some(event)
    }

    fn apply(&mut self, event: &ProtocolEvent) {
        if let ProtocolEvent::BindingChanged { bound, module_id } = event {
            if *bound {
                info!("模组已绑定: {:?}", module_id);
                self.state.set_bound(module_id.clone());
            } else {
                info!("模组未绑定");
                self.state.set_unbound();
            }
        }
    }

    pub fn state(&self) -> &LinkState {
        &self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state.bound
    }

    pub fn module_id(&self) -> Option<&ModuleId> {
        self.state.module_id.as_ref()
    }
}
