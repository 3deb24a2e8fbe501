//! 十六进制编解码，模组的 AT+MDTS 指令以大写十六进制携带数据

use heapless::Vec;

/// 编码为大写十六进制文本，输入超出 N/2 字节的部分被截断
pub fn encode_upper<const N: usize>(data: &[u8]) -> Vec<u8, N> {
    let take = core::cmp::min(data.len(), N / 2);
    let mut out = Vec::new();
    if out.resize(take * 2, 0).is_err() {
        return Vec::new();
    }
    if hex::encode_to_slice(&data[..take], &mut out).is_err() {
        out.clear();
        return out;
    }
    out.make_ascii_uppercase();
    out
}

/// 解码十六进制文本，长度为奇数、含非法字符或超出容量时返回 None
pub fn decode<const N: usize>(text: &[u8]) -> Option<Vec<u8, N>> {
    if text.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::new();
    out.resize(text.len() / 2, 0).ok()?;
    hex::decode_to_slice(text, &mut out).ok()?;
    Some(out)
}
