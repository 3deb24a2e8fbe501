//! 锁控状态机
//!
//! 综合三类输入驱动继电器：远程 ON/OFF 指令（带自动关闭超时）、手动开关
//! （按住重复发送、松开后延迟关闭）以及长按解绑。状态机本身不做 I/O，
//! 每次调用返回需要执行的 [`Action`]，由 [`crate::app`] 负责落到硬件和链路上。

use common::config::TimingConfig;
use common::protocol::{ProtocolEvent, RemoteCommand};
use common::utils::bytes::to_text;
use heapless::Vec;
use tracing::{info, warn};

use crate::hold::{HoldTracker, ReleaseTimer};
use crate::input::ButtonEdge;

/// 状态机产生的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 驱动继电器与锁状态灯
    Drive(bool),
    /// 经链路发送指令
    Send(RemoteCommand),
    /// 解除绑定
    Unbind,
}

/// 单次调用产生的动作，最多三个
pub type Actions = Vec<Action, 4>;

/// 继电器状态，`timeout_deadline` 仅在吸合且启用自动关闭时存在
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockState {
    pub engaged: bool,
    pub timeout_deadline: Option<u64>,
}

impl LockState {
    /// 吸合并（重新）设置截止时间，返回是否发生状态变化
    fn engage(&mut self, now: u64, auto_off_ms: Option<u64>) -> bool {
        let changed = !self.engaged;
        self.engaged = true;
        self.timeout_deadline = auto_off_ms.map(|ms| now.saturating_add(ms));
        changed
    }

    fn disengage(&mut self) -> bool {
        let changed = self.engaged;
        self.engaged = false;
        self.timeout_deadline = None;
        changed
    }

    fn is_expired(&self, now: u64) -> bool {
        matches!(self.timeout_deadline, Some(deadline) if self.engaged && now >= deadline)
    }
}

pub struct ActuatorController {
    lock: LockState,
    auto_off_ms: Option<u64>,
    release_delay_ms: u64,
    override_hold: HoldTracker,
    release: ReleaseTimer,
    unbind_hold: HoldTracker,
}

impl ActuatorController {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            lock: LockState::default(),
            auto_off_ms: timing.auto_off_ms,
            release_delay_ms: timing.release_delay_ms,
            override_hold: HoldTracker::repeating(timing.repeat_interval_ms),
            release: ReleaseTimer::default(),
            unbind_hold: HoldTracker::once(timing.unbind_hold_ms),
        }
    }

    pub fn lock_state(&self) -> &LockState {
        &self.lock
    }

    pub fn is_engaged(&self) -> bool {
        self.lock.engaged
    }

    /// 执行一条远程指令，不产生下行发送
    pub fn handle_remote(&mut self, command: RemoteCommand, now: u64) -> Actions {
        let mut actions = Actions::new();
        match command {
            RemoteCommand::Engage => {
                self.engage(now, &mut actions);
                match self.auto_off_ms {
                    Some(ms) => info!("远程开锁，{} ms 后自动关闭", ms),
                    None => info!("远程开锁"),
                }
            }
            RemoteCommand::Disengage => {
                self.disengage(&mut actions);
                info!("远程关锁");
            }
        }
        actions
    }

    /// 从链路事件中提取锁控指令；无法识别的内容只记录日志
    pub fn handle_event(&mut self, event: &ProtocolEvent, now: u64) -> Actions {
        let (command, raw) = match event {
            ProtocolEvent::PeerData { payload, .. } => {
                (RemoteCommand::from_peer_hex(payload.as_bytes()), payload.as_bytes())
            }
            ProtocolEvent::GroupMessage(payload) | ProtocolEvent::PointMessage(payload) => {
                (RemoteCommand::from_push(payload), &payload[..])
            }
            _ => return Actions::new(),
        };

        match command {
            Some(command) => self.handle_remote(command, now),
            None => {
                warn!("未知指令: {}", to_text::<128>(raw));
                Actions::new()
            }
        }
    }

    /// 每个循环周期调用一次
    ///
    /// 顺序：自动关闭检查、未绑定复位、解绑键、手动开关。
    pub fn tick(
        &mut self,
        now: u64,
        bound: bool,
        override_edge: Option<ButtonEdge>,
        unbind_edge: Option<ButtonEdge>,
    ) -> Actions {
        let mut actions = Actions::new();

        if self.lock.is_expired(now) {
            info!("超时自动关锁");
            self.disengage(&mut actions);
        }

        if !bound {
            self.reset_trackers();
            self.disengage(&mut actions);
            return actions;
        }

        if let Some(edge) = unbind_edge {
            self.unbind_hold.on_edge(&edge);
        }
        if self.unbind_hold.poll(now) {
            info!("长按解绑键，解除绑定");
            push(&mut actions, Action::Unbind);
            self.override_hold.reset();
            self.release.cancel();
            self.disengage(&mut actions);
            return actions;
        }

        if let Some(edge) = override_edge {
            let was_held = self.override_hold.is_held();
            if self.override_hold.on_edge(&edge) {
                info!("手动开关按下");
                self.release.cancel();
                self.engage(now, &mut actions);
                push(&mut actions, Action::Send(RemoteCommand::Engage));
            } else if was_held {
                self.release.arm(edge.at);
            }
        }

        if self.override_hold.poll(now) {
            self.engage(now, &mut actions);
            push(&mut actions, Action::Send(RemoteCommand::Engage));
        } else if self.release.poll(now, self.release_delay_ms) {
            info!("手动开关松开已满 {} ms，关锁", self.release_delay_ms);
            self.disengage(&mut actions);
            push(&mut actions, Action::Send(RemoteCommand::Disengage));
        }

        actions
    }

    fn engage(&mut self, now: u64, actions: &mut Actions) {
        if self.lock.engage(now, self.auto_off_ms) {
            push(actions, Action::Drive(true));
        }
    }

    fn disengage(&mut self, actions: &mut Actions) {
        if self.lock.disengage() {
            push(actions, Action::Drive(false));
        }
    }

    fn reset_trackers(&mut self) {
        self.override_hold.reset();
        self.release.cancel();
        self.unbind_hold.reset();
    }
}

fn push(actions: &mut Actions, action: Action) {
    if actions.push(action).is_err() {
        warn!("动作队列已满，丢弃: {:?}", action);
    }
}
