//! 节点主循环
//!
//! 单线程协作式调度，每个周期依次执行：按键采样、状态机判定、链路收发、
//! 状态灯刷新、延时。唯一的阻塞点是链路上有上限的读等待。

use embedded_hal::digital::v2::OutputPin;
use tracing::{debug, info, warn};

use common::config::NodeConfig;
use common::hal::{Board, Clock};
use common::link::MeshLink;
use common::protocol::ProtocolEvent;

use crate::actuator::{Action, Actions, ActuatorController};
use crate::indicator::BindingIndicator;
use crate::input::Button;

pub struct NodeApp<B: Board> {
    link: MeshLink<B::Transport>,
    clock: B::Clock,
    override_button: Option<Button<B::Input>>,
    unbind_button: Button<B::Input>,
    relay: B::Output,
    lock_led: B::Output,
    status_led: B::Output,
    controller: ActuatorController,
    indicator: BindingIndicator,
    config: NodeConfig,
}

impl<B: Board> NodeApp<B> {
    /// 拆分板卡外设并把所有输出置为低电平
    pub fn new(board: B, config: NodeConfig) -> Self {
        let (transport, clock, pins) = board.split();

        let mut app = Self {
            link: MeshLink::new(transport),
            clock,
            override_button: pins.override_button.map(Button::new),
            unbind_button: Button::new(pins.unbind_button),
            relay: pins.relay,
            lock_led: pins.lock_led,
            status_led: pins.status_led,
            controller: ActuatorController::new(&config.timing),
            indicator: BindingIndicator::new(config.timing.blink_interval_ms),
            config,
        };

        app.drive_lock(false);
        write_pin(&mut app.status_led, false);
        app
    }

    /// 重启模组并等待绑定状态
    pub fn start(&mut self) -> bool {
        info!("重启网状网络模组");
        let bound = self
            .link
            .reboot(&self.clock, self.config.link.reboot_timeout_ms);

        if bound {
            info!("模组已绑定，标识: {:?}", self.link.module_id());
        } else {
            warn!("模组未绑定，请先完成配对");
        }
        bound
    }

    /// 执行一个循环周期
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let bound = self.link.is_bound();

        // 1. 按键采样，未绑定时不读取按键
        let (override_edge, unbind_edge) = if bound {
            let override_edge = self
                .override_button
                .as_mut()
                .and_then(|button| button.poll(now));
            (override_edge, self.unbind_button.poll(now))
        } else {
            if let Some(button) = self.override_button.as_mut() {
                button.reset();
            }
            self.unbind_button.reset();
            (None, None)
        };

        // 2. 状态机判定
        let actions = self.controller.tick(now, bound, override_edge, unbind_edge);
        self.execute(&actions);

        // 3. 链路收发
        if let Some(event) = self.link.poll(self.config.link.recv_timeout_ms) {
            self.dispatch(event);
        }

        // 4. 状态灯
        let lit = self
            .indicator
            .update(self.link.is_bound(), self.clock.now_ms());
        write_pin(&mut self.status_led, lit);

        // 5. 延时
        self.clock.delay_ms(self.config.timing.tick_ms);
    }

    /// 启动并永久运行
    pub fn run(mut self) -> ! {
        self.start();
        info!("进入主循环");
        loop {
            self.tick();
        }
    }

    fn dispatch(&mut self, event: ProtocolEvent) {
        match &event {
            ProtocolEvent::PeerData { sender, payload } => {
                info!("收到来自 {} 的数据: {}", sender, payload);
            }
            ProtocolEvent::GroupMessage(_) | ProtocolEvent::PointMessage(_) => {
                debug!("收到推送: {:?}", event);
            }
            ProtocolEvent::SendAcknowledged => {
                debug!("指令发送成功确认");
                return;
            }
            ProtocolEvent::BindingChanged { .. } | ProtocolEvent::Unrecognized(_) => return,
        }

        let now = self.clock.now_ms();
        let actions = self.controller.handle_event(&event, now);
        self.execute(&actions);
    }

    fn execute(&mut self, actions: &Actions) {
        for action in actions.iter() {
            match action {
                Action::Drive(on) => self.drive_lock(*on),
                Action::Send(command) => {
                    if self.link.send(&command.to_outbound()) {
                        info!("发送指令: {:?}", command);
                    }
                }
                Action::Unbind => self.link.unbind(),
            }
        }
    }

    fn drive_lock(&mut self, on: bool) {
        write_pin(&mut self.relay, on);
        write_pin(&mut self.lock_led, on);
    }

    pub fn link(&self) -> &MeshLink<B::Transport> {
        &self.link
    }

    pub fn controller(&self) -> &ActuatorController {
        &self.controller
    }

    pub fn indicator(&self) -> &BindingIndicator {
        &self.indicator
    }
}

fn write_pin<P: OutputPin>(pin: &mut P, high: bool)
where
    P::Error: core::fmt::Debug,
{
    let result = if high { pin.set_high() } else { pin.set_low() };
    if let Err(e) = result {
        warn!("输出引脚写入失败: {:?}", e);
    }
}
