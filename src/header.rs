//! # 头部像素模块
//!
//! 位深度保存在 (0, 0) 像素红色通道的低 3 位，解码时无需任何额外的元数据。
//! 该像素的其余位以及绿、蓝通道保持原样。

use crate::capacity::BitDepth;
use crate::constants::{HEADER_DEPTH_MASK, HEADER_KEEP_MASK, HEADER_PIXEL};
use crate::error::{Result, StegoError};
use image::RgbImage;
use log::{info, warn};

/// 读取头部的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRead {
    /// 实际使用的深度。头部损坏时为 1。
    pub depth: BitDepth,
    /// 头部损坏时读到的原始值。
    pub corrupt: Option<u8>,
}

/// 把位深度写入头部像素的红色通道低 3 位。
pub fn write_depth(image: &mut RgbImage, depth: BitDepth) -> Result<()> {
    let (x, y) = HEADER_PIXEL;
    let pixel = image
        .get_pixel_mut_checked(x, y)
        .ok_or(StegoError::EmptyImage)?;
    pixel[0] = (pixel[0] & HEADER_KEEP_MASK) | depth.get();
    Ok(())
}

/// 读取头部像素中的位深度。
///
/// 读到的值不在 [1, 4] 范围内时记录警告并回退到深度 1，而不是报错。
pub fn read_depth(image: &RgbImage) -> Result<HeaderRead> {
    let (x, y) = HEADER_PIXEL;
    let pixel = image.get_pixel_checked(x, y).ok_or(StegoError::EmptyImage)?;
    let raw = pixel[0] & HEADER_DEPTH_MASK;

    Ok(match BitDepth::new(raw) {
        Some(depth) => {
            info!("Detected {depth} bit(s) per color channel");
            HeaderRead {
                depth,
                corrupt: None,
            }
        }
        None => {
            warn!("Invalid bit depth {raw} detected, using 1 bit per channel");
            HeaderRead {
                depth: BitDepth::MIN,
                corrupt: Some(raw),
            }
        }
    })
}
