//! 串口文本行的字节级工具函数
//!
//! 模组输出均为 ASCII，这里不做 UTF-8 解码，按字节逐一映射为字符。

use heapless::String;

/// 查找子串首次出现的位置
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

/// 按空白字符切分，忽略连续空白
pub fn tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
}

/// 去除首尾空白
pub fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |pos| pos + 1);
    &bytes[start..end]
}

/// 逐字节映射为字符，超出容量的部分直接截断
pub fn to_text<const N: usize>(bytes: &[u8]) -> String<N> {
    let mut text = String::new();
    for &b in bytes {
        if text.push(b as char).is_err() {
            break;
        }
    }
    text
}
