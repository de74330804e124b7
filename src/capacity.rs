//! # 容量规划模块
//!
//! 根据图像尺寸和所需位数，选出能放下消息的最小位深度 (每通道 1 ~ 4 个最低位)。
//! 头部像素不计入可用空间。

use crate::constants::{BITS_PER_CHAR, CHANNELS_PER_PIXEL, MAX_BIT_DEPTH, MIN_BIT_DEPTH, TERMINATOR};
use crate::error::{Result, StegoError};
use log::{debug, info};
use std::fmt;

/// 每个颜色通道用于承载消息的最低位数，取值范围 [1, 4]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitDepth(u8);

impl BitDepth {
    pub const MIN: BitDepth = BitDepth(MIN_BIT_DEPTH);
    pub const MAX: BitDepth = BitDepth(MAX_BIT_DEPTH);

    /// 取值在 [1, 4] 之外时返回 `None`。
    pub fn new(value: u8) -> Option<Self> {
        (MIN_BIT_DEPTH..=MAX_BIT_DEPTH)
            .contains(&value)
            .then_some(BitDepth(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// 通道中被消息占用的低位掩码，例如深度 2 对应 `0b11`。
    pub fn low_mask(self) -> u8 {
        (1u8 << self.0) - 1
    }

    /// 所有合法深度，从小到大。
    pub fn all() -> impl Iterator<Item = BitDepth> {
        (MIN_BIT_DEPTH..=MAX_BIT_DEPTH).map(BitDepth)
    }

    fn next(self) -> Option<Self> {
        BitDepth::new(self.0 + 1)
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 可承载消息的像素数 (总像素减去头部像素)。
pub fn payload_pixels(width: u32, height: u32) -> u64 {
    (u64::from(width) * u64::from(height)).saturating_sub(1)
}

/// 给定深度下可用的总位数。
pub fn available_bits(width: u32, height: u32, depth: BitDepth) -> u64 {
    payload_pixels(width, height) * CHANNELS_PER_PIXEL * u64::from(depth.get())
}

/// 从深度 1 开始逐级提升，直到放得下或达到最大深度 4。
///
/// 返回值不保证一定放得下，需要再用 [`check_fits`] 确认。
pub fn select_depth(width: u32, height: u32, required_bits: u64) -> BitDepth {
    let mut depth = BitDepth::MIN;
    while available_bits(width, height, depth) < required_bits {
        match depth.next() {
            Some(next) => depth = next,
            None => break,
        }
    }
    depth
}

pub fn check_fits(width: u32, height: u32, required_bits: u64, depth: BitDepth) -> bool {
    required_bits <= available_bits(width, height, depth)
}

/// 选择深度并确认容量足够。
///
/// # Errors
///
/// 最大深度下仍放不下时返回 [`StegoError::CapacityExceeded`]，其中带有所需与可用位数。
pub fn plan_depth(width: u32, height: u32, required_bits: u64) -> Result<BitDepth> {
    let depth = select_depth(width, height, required_bits);
    let available = available_bits(width, height, depth);
    debug!("{width}x{height} image, {required_bits} bits required, {available} available at depth {depth}");

    if !check_fits(width, height, required_bits, depth) {
        return Err(StegoError::CapacityExceeded {
            required: required_bits,
            available,
        });
    }

    info!("Using {depth} bit(s) per color channel for encoding");
    Ok(depth)
}

/// 按深度 1 估算可容纳的字符数 (已扣除结束标记)，最小为 0。
///
/// 这是一个偏保守的估计：实际编码时深度最高可自动提升到 4，
/// 能写入的字符数可能远大于这里的返回值。
pub fn estimate_capacity_chars(width: u32, height: u32) -> u64 {
    let bits = available_bits(width, height, BitDepth::MIN);
    (bits / BITS_PER_CHAR as u64).saturating_sub(TERMINATOR.len() as u64)
}
