use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use tracing::debug;

use crate::error::HalError;
use crate::hal::{Board, Clock, LineTransport, NodePins};
use crate::protocol::{CMD_REBOOT, CMD_SEND_PREFIX, CMD_UNBIND, MAX_LINE_LEN};
use crate::utils::{Line, LineBuffer};

/// 创建一条主机与模拟模组之间的双向字节通道
pub fn sim_link() -> (SimTransport, SimModule) {
    let (host_tx, module_rx) = channel::unbounded();
    let (module_tx, host_rx) = channel::unbounded();

    let transport = SimTransport {
        rx: host_rx,
        tx: host_tx,
        assembler: LineBuffer::new(),
        ready: VecDeque::new(),
    };
    let module = SimModule {
        rx: module_rx,
        tx: module_tx,
    };
    (transport, module)
}

/// 主机侧的模拟串口
pub struct SimTransport {
    rx: Receiver<Vec<u8>>,
    tx: Sender<Vec<u8>>,
    assembler: LineBuffer<MAX_LINE_LEN>,
    ready: VecDeque<Line>,
}

impl SimTransport {
    fn absorb(&mut self, chunk: &[u8]) {
        for &b in chunk {
            if let Some(line) = self.assembler.push(b) {
                self.ready.push_back(line);
            }
        }
    }

    /// 收取通道中已到达的全部数据，返回对端是否已断开
    fn drain_pending(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.absorb(&chunk),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }
}

impl LineTransport for SimTransport {
    type Error = HalError;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.tx
            .send(bytes.to_vec())
            .map_err(|_| HalError::Disconnected)
    }

    fn read_line(&mut self, timeout_ms: u32) -> Result<Option<Line>, Self::Error> {
        let disconnected = self.drain_pending();
        if let Some(line) = self.ready.pop_front() {
            return Ok(Some(line));
        }
        if disconnected {
            return Err(HalError::Disconnected);
        }

        let deadline = Instant::now() + Duration::from_millis(timeout_ms as u64);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(chunk) => {
                    self.absorb(&chunk);
                    if let Some(line) = self.ready.pop_front() {
                        return Ok(Some(line));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(HalError::Disconnected),
            }
        }
    }

    fn bytes_available(&mut self) -> usize {
        self.drain_pending();
        // 每行补回被剥离的换行符
        let ready: usize = self.ready.iter().map(|line| line.len() + 1).sum();
        ready + self.assembler.len()
    }

    fn discard(&mut self) {
        self.drain_pending();
        self.ready.clear();
        self.assembler.clear();
    }
}

/// 模组侧句柄，测试代码借此注入上行行并检查主机写出的指令
pub struct SimModule {
    rx: Receiver<Vec<u8>>,
    tx: Sender<Vec<u8>>,
}

impl SimModule {
    /// 推送一行（自动补 CR LF）
    pub fn push_line(&self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.extend_from_slice(b"\r\n");
        self.push_raw(&bytes);
    }

    /// 推送原始字节，可用于模拟半行到达
    pub fn push_raw(&self, bytes: &[u8]) {
        let _ = self.tx.send(bytes.to_vec());
    }

    /// 取出主机迄今写出的全部指令行（去掉 CR LF）
    pub fn written_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for chunk in self.rx.try_iter() {
            let text = String::from_utf8_lossy(&chunk);
            lines.extend(
                text.split("\r\n")
                    .filter(|line| !line.is_empty())
                    .map(|line| line.to_string()),
            );
        }
        lines
    }

    /// 在后台线程中运行模组应答脚本，直到主机侧断开
    pub fn spawn_responder(self, script: ModuleScript) -> JoinHandle<()> {
        thread::spawn(move || {
            let mut responder = Responder {
                module: self,
                script,
                assembler: LineBuffer::new(),
            };
            responder.run();
        })
    }
}

/// 模拟模组的行为脚本
#[derive(Debug, Clone)]
pub struct ModuleScript {
    /// 重启后是否已绑定
    pub provisioned: bool,
    /// 绑定时上报的标识
    pub module_id: String,
    /// 周期推送的远端指令文本及间隔（毫秒）
    pub push: Option<(String, u64)>,
}

impl Default for ModuleScript {
    fn default() -> Self {
        Self {
            provisioned: true,
            module_id: "0x0028".to_string(),
            push: None,
        }
    }
}

struct Responder {
    module: SimModule,
    script: ModuleScript,
    assembler: LineBuffer<MAX_LINE_LEN>,
}

impl Responder {
    fn run(&mut self) {
        let mut last_push = Instant::now();
        loop {
            match self.module.rx.recv_timeout(Duration::from_millis(20)) {
                Ok(chunk) => {
                    for &b in chunk.iter() {
                        if let Some(line) = self.assembler.push(b) {
                            self.answer(&line);
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }

            if let Some((text, interval_ms)) = &self.script.push {
                if self.script.provisioned
                    && last_push.elapsed() >= Duration::from_millis(*interval_ms)
                {
                    self.module.push_line(&format!("MDTSG-MSG:{}", text));
                    last_push = Instant::now();
                }
            }
        }
    }

    fn answer(&mut self, line: &[u8]) {
        debug!("模拟模组收到: {}", String::from_utf8_lossy(line));

        if line == CMD_REBOOT {
            self.module.push_line("REBOOT-MSG SUCCESS");
            if self.script.provisioned {
                let status = format!("SYS-MSG DEVICE PROV-ED {}", self.script.module_id);
                self.module.push_line(&status);
            } else {
                self.module.push_line("SYS-MSG DEVICE UNPROV");
            }
        } else if line == CMD_UNBIND {
            self.script.provisioned = false;
            self.module.push_line("SYS-MSG DEVICE UNPROV");
        } else if line.starts_with(CMD_SEND_PREFIX) {
            if self.script.provisioned {
                self.module.push_line("MDTS-MSG SUCCESS");
            }
        } else {
            self.module.push_line("ERR-MSG UNKNOWN CMD");
        }
    }
}

/// 模拟按键，按下即输入低电平
#[derive(Debug, Clone, Default)]
pub struct SimButton(Arc<AtomicBool>);

impl SimButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl InputPin for SimButton {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(!self.0.load(Ordering::SeqCst))
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

/// 模拟输出引脚（继电器、LED）
#[derive(Debug, Clone, Default)]
pub struct SimOutput(Arc<AtomicBool>);

impl SimOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl OutputPin for SimOutput {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// 模拟时钟：真实时间，或由测试手动推进
#[derive(Debug, Clone)]
pub struct SimClock {
    mode: ClockMode,
}

#[derive(Debug, Clone)]
enum ClockMode {
    Real(Instant),
    Manual(Arc<AtomicU64>),
}

impl SimClock {
    pub fn real() -> Self {
        Self {
            mode: ClockMode::Real(Instant::now()),
        }
    }

    /// 从 0 开始的手动时钟，`delay_ms` 只推进计数不休眠
    pub fn manual() -> Self {
        Self {
            mode: ClockMode::Manual(Arc::new(AtomicU64::new(0))),
        }
    }

    /// 推进手动时钟，对真实时钟无效
    pub fn advance(&self, ms: u64) {
        if let ClockMode::Manual(now) = &self.mode {
            now.fetch_add(ms, Ordering::SeqCst);
        }
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        match &self.mode {
            ClockMode::Real(start) => start.elapsed().as_millis() as u64,
            ClockMode::Manual(now) => now.load(Ordering::SeqCst),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        match &self.mode {
            ClockMode::Real(_) => thread::sleep(Duration::from_millis(ms as u64)),
            ClockMode::Manual(now) => {
                now.fetch_add(ms as u64, Ordering::SeqCst);
            }
        }
    }
}

/// 模拟器板卡
pub struct SimBoard {
    transport: SimTransport,
    clock: SimClock,
    pins: NodePins<SimButton, SimOutput>,
}

/// 测试与模拟入口持有的另一端句柄
pub struct SimHandles {
    pub module: SimModule,
    pub clock: SimClock,
    pub override_button: SimButton,
    pub unbind_button: SimButton,
    pub relay: SimOutput,
    pub lock_led: SimOutput,
    pub status_led: SimOutput,
}

impl SimBoard {
    pub fn new(clock: SimClock) -> (Self, SimHandles) {
        let (transport, module) = sim_link();
        let override_button = SimButton::new();
        let unbind_button = SimButton::new();
        let relay = SimOutput::new();
        let lock_led = SimOutput::new();
        let status_led = SimOutput::new();

        let board = Self {
            transport,
            clock: clock.clone(),
            pins: NodePins {
                override_button: Some(override_button.clone()),
                unbind_button: unbind_button.clone(),
                relay: relay.clone(),
                lock_led: lock_led.clone(),
                status_led: status_led.clone(),
            },
        };
        let handles = SimHandles {
            module,
            clock,
            override_button,
            unbind_button,
            relay,
            lock_led,
            status_led,
        };
        (board, handles)
    }
}

impl Board for SimBoard {
    type Transport = SimTransport;
    type Clock = SimClock;
    type PinError = Infallible;
    type Input = SimButton;
    type Output = SimOutput;

    fn split(self) -> (SimTransport, SimClock, NodePins<SimButton, SimOutput>) {
        (self.transport, self.clock, self.pins)
    }
}
