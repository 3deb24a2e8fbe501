//! 绑定状态指示：已绑定常亮，未绑定按固定间隔闪烁

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingIndicator {
    interval_ms: u64,
    blinking: bool,
    last_toggle: Option<u64>,
    is_on: bool,
}

impl BindingIndicator {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            blinking: false,
            last_toggle: None,
            is_on: false,
        }
    }

    /// 根据绑定状态和当前时间更新，返回指示灯是否点亮
    pub fn update(&mut self, bound: bool, now: u64) -> bool {
        if bound {
            self.blinking = false;
            self.last_toggle = None;
            self.is_on = true;
        } else if !self.blinking {
            // 刚进入未绑定，从熄灭开始计时
            self.blinking = true;
            self.is_on = false;
            self.last_toggle = Some(now);
        } else {
            let last = *self.last_toggle.get_or_insert(now);
            if now.saturating_sub(last) >= self.interval_ms {
                self.is_on = !self.is_on;
                self.last_toggle = Some(now);
            }
        }
        self.is_on
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }
}
