//! # 比特流编解码模块
//!
//! 把文本转换成二进制位序列 (每个字符 8 bits，高位在前)，并在末尾追加结束标记；
//! 反方向则把位序列按 8 位一组还原为字符。

use crate::constants::{BITS_PER_CHAR, TERMINATOR};
use crate::error::{Result, StegoError};

/// 一串二进制位，每个元素表示一个 0/1。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// 截断到前 `len` 位。
    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }
}

/// 将消息转换为位序列，并追加结束标记 [`TERMINATOR`]。
///
/// 消息中若已包含结束标记，不做任何转义，解码时会在第一次出现处截断。
///
/// # Errors
///
/// 字符码位大于 0xFF 时返回 [`StegoError::UnsupportedCharacter`]。
pub fn to_bits(message: &str) -> Result<BitString> {
    let total_chars = message.chars().count() + TERMINATOR.len();
    let mut bits = BitString::with_capacity(total_chars * BITS_PER_CHAR);

    for (index, character) in message.chars().chain(TERMINATOR.chars()).enumerate() {
        let code = u8::try_from(u32::from(character))
            .map_err(|_| StegoError::UnsupportedCharacter { character, index })?;
        push_byte(&mut bits, code);
    }

    Ok(bits)
}

fn push_byte(bits: &mut BitString, byte: u8) {
    (0..BITS_PER_CHAR)
        .rev()
        .for_each(|shift| bits.push((byte >> shift) & 1 == 1));
}

/// 把位序列按 8 位一组打包为字节，不足 8 位的尾部被丢弃。
pub fn pack_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks_exact(BITS_PER_CHAR)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
        .collect()
}

/// 将位序列还原为文本，每个字节按码位映射为一个字符。
///
/// 这里不查找结束标记，那是提取阶段的工作。
pub fn from_bits(bits: &[bool]) -> String {
    pack_bytes(bits).into_iter().map(char::from).collect()
}

/// 返回结束标记在 `bytes` 中首次出现的位置 (从 `from` 开始搜索)。
pub fn find_terminator(bytes: &[u8], from: usize) -> Option<usize> {
    let needle = TERMINATOR.as_bytes();
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// 取文本中第一个结束标记之前的部分。没有结束标记时原样返回。
pub fn strip_terminator(text: &str) -> &str {
    text.split(TERMINATOR).next().unwrap_or(text)
}
