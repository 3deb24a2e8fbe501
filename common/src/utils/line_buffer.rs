use heapless::Vec;

use crate::protocol::MAX_LINE_LEN;

/// 一行完整的串口文本，不含行尾的 CR/LF
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// 行缓冲区，把零散到达的串口字节拼接成完整的行
pub struct LineBuffer<const N: usize> {
    buffer: Vec<u8, N>,
    /// 超长行已输出，丢弃剩余字节直到下一个换行
    skipping: bool,
}

impl<const N: usize> LineBuffer<N> {
    /// 创建一个新的空缓冲区
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            skipping: false,
        }
    }

    /// 写入一个字节，遇到换行时返回完整的一行
    ///
    /// 缓冲区写满仍未见换行时，把已有内容当作一行强制输出，
    /// 交给上层按无法识别的行处理；该行余下的字节直到换行都被丢弃。
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8, N>> {
        if self.skipping {
            if byte == b'\n' {
                self.skipping = false;
            }
            return None;
        }

        if byte == b'\n' {
            return Some(self.take());
        }

        if self.buffer.push(byte).is_err() {
            self.skipping = true;
            return Some(self.take());
        }

        None
    }

    /// 取出当前内容（去掉行尾 CR）并清空
    fn take(&mut self) -> Vec<u8, N> {
        let mut line = core::mem::take(&mut self.buffer);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        line
    }

    /// 获取已缓存的字节数
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 丢弃未完成的行
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.skipping = false;
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
