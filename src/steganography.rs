//! # 核心隐写算法模块
//!
//! 按行优先顺序 (先 y 后 x) 遍历除头部像素外的所有像素，通道顺序为 R, G, B，
//! 每个通道使用最低的 `depth` 位承载消息，通道内从第 0 位开始。

use crate::bitstream::{BitString, find_terminator, pack_bytes};
use crate::capacity::BitDepth;
use crate::constants::{BITS_PER_CHAR, HEADER_PIXEL, PROGRESS_ROW_INTERVAL, TERMINATOR};
use image::RgbImage;
use log::{debug, info, warn};

/// 提取结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// 提取到的位序列。找到结束标记时恰好截断在标记末尾的字节边界。
    pub bits: BitString,
    pub terminator_found: bool,
}

/// 把位序列写入图像像素的低位，返回被修改的像素数。
///
/// 调用前必须已通过容量检查。位序列写完后立即停止遍历，之后的通道和像素保持原样。
pub fn embed(image: &mut RgbImage, bits: &BitString, depth: BitDepth) -> u64 {
    let mut stream = bits.as_slice().iter().copied().peekable();
    let mut touched = 0u64;

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if (x, y) == HEADER_PIXEL {
            continue;
        }
        if stream.peek().is_none() {
            break;
        }

        for channel in pixel.0.iter_mut() {
            let mut value = *channel;
            for bit_pos in 0..depth.get() {
                // 只替换实际写入的位：流在通道中途结束时，其余低位保持原值，尽量少改动像素
                let Some(bit) = stream.next() else {
                    break;
                };
                value = (value & !(1 << bit_pos)) | (u8::from(bit) << bit_pos);
            }
            *channel = value;
        }
        touched += 1;
    }

    debug!("Embedded {} bits into {touched} pixel(s)", bits.len());
    touched
}

/// 按与 [`embed`] 相同的顺序读取低位，直到发现结束标记。
///
/// 每累计 `24 × depth` 位 (8 个像素) 检查一次是否已出现结束标记，
/// 一旦出现就截断并立即返回，不再扫描剩余像素。
/// 扫完整幅图像仍未找到时记录警告，并返回全部位。
pub fn extract(image: &RgbImage, depth: BitDepth) -> Extraction {
    let scan_unit = 24 * usize::from(depth.get());
    let height = image.height();
    let mut bits = BitString::new();
    let mut bytes = Vec::new();

    info!("Scanning image using {depth} bit(s) per channel...");

    for (x, y, pixel) in image.enumerate_pixels() {
        if (x, y) == HEADER_PIXEL {
            continue;
        }

        for &channel in pixel.0.iter() {
            for bit_pos in 0..depth.get() {
                bits.push((channel >> bit_pos) & 1 == 1);
            }
        }

        if bits.len() % scan_unit == 0 {
            if let Some(end) = scan_for_terminator(&bits, &mut bytes) {
                info!("Terminator found at position {x},{y}");
                bits.truncate(end);
                return Extraction {
                    bits,
                    terminator_found: true,
                };
            }
        }

        if x == 0 && y > 0 && y % PROGRESS_ROW_INTERVAL == 0 {
            let progress = u64::from(y) * 100 / u64::from(height);
            info!("Progress: {progress}% - Processed {y} of {height} rows...");
        }
    }

    // 图像末尾可能不足一个检查单元
    if let Some(end) = scan_for_terminator(&bits, &mut bytes) {
        info!("Terminator found in the final pixels");
        bits.truncate(end);
        return Extraction {
            bits,
            terminator_found: true,
        };
    }

    warn!("No terminator found when analysing image");
    Extraction {
        bits,
        terminator_found: false,
    }
}

/// 把新增的完整字节追加到 `bytes`，并只在新内容 (及与旧内容的衔接处) 中查找结束标记。
/// 找到时返回结束标记末尾对应的位数。
fn scan_for_terminator(bits: &BitString, bytes: &mut Vec<u8>) -> Option<usize> {
    let searched = bytes.len();
    bytes.extend(pack_bytes(&bits.as_slice()[searched * BITS_PER_CHAR..]));

    let from = searched.saturating_sub(TERMINATOR.len() - 1);
    find_terminator(bytes, from).map(|pos| (pos + TERMINATOR.len()) * BITS_PER_CHAR)
}
