//! # 编解码流程模块
//!
//! 编码：文本 → 位序列 → 容量规划 → 写头部 → 嵌入。
//! 解码：读头部 → 提取 → 位序列 → 文本 (截至第一个结束标记)。
//!
//! 头部损坏或找不到结束标记都不会中止解码，而是通过 [`Decoded::warnings`] 报告，
//! 由调用方决定是否接受这种“尽力而为”的结果。

use crate::bitstream::{from_bits, strip_terminator, to_bits};
use crate::capacity::{BitDepth, estimate_capacity_chars, plan_depth};
use crate::error::{Result, StegoError};
use crate::header::{read_depth, write_depth};
use crate::steganography::{embed, extract};
use image::{ImageFormat, RgbImage};
use log::info;
use std::fs;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// 解码时遇到的非致命问题。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeWarning {
    /// 头部像素中的深度值不在 [1, 4] 内，已按深度 1 解码。
    CorruptHeader { raw: u8 },
    /// 扫描完整幅图像也没有找到结束标记，返回的文本可能没有意义。
    TerminatorNotFound,
}

/// 解码结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub message: String,
    pub depth: BitDepth,
    pub warnings: Vec<DecodeWarning>,
}

impl Decoded {
    /// 没有任何警告时返回 `true`。
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// 在内存中的图像里隐藏消息，返回所使用的位深度。
///
/// 容量检查在修改任何像素之前完成，失败时图像保持不变。
pub fn encode(image: &mut RgbImage, message: &str) -> Result<BitDepth> {
    let bits = to_bits(message)?;
    let depth = plan_depth(image.width(), image.height(), bits.len() as u64)?;

    write_depth(image, depth)?;
    embed(image, &bits, depth);
    Ok(depth)
}

/// 从内存中的图像里恢复消息。
pub fn decode(image: &RgbImage) -> Result<Decoded> {
    let header = read_depth(image)?;
    let mut warnings = Vec::new();
    if let Some(raw) = header.corrupt {
        warnings.push(DecodeWarning::CorruptHeader { raw });
    }

    let extraction = extract(image, header.depth);
    if !extraction.terminator_found {
        warnings.push(DecodeWarning::TerminatorNotFound);
    }

    let text = from_bits(extraction.bits.as_slice());

    Ok(Decoded {
        message: strip_terminator(&text).to_owned(),
        depth: header.depth,
        warnings,
    })
}

/// 读取任意常见格式的图像并转换为 RGB (丢弃 alpha 通道)。
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).map_err(|source| StegoError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

/// 根据扩展名选择无损格式并保存。
///
/// 图像先完整编码到内存，再经 [`replace_file`] 写入，失败时不会留下半成品。
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    let format = lossless_format(path)?;

    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .map_err(|source| StegoError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    let bytes = buffer.into_inner();
    replace_file(path, |file| file.write_all(&bytes))
}

/// 先写入同目录下的临时文件，成功后再重命名到 `path`。
///
/// `write` 失败时临时文件被删除，`path` 上原有的文件 (如果有) 保持不变。
pub fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let io_error = |source| StegoError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(|source| StegoError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
    write(temp.as_file_mut()).map_err(io_error)?;
    temp.as_file().sync_all().map_err(io_error)?;
    temp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// 只接受能精确保存像素值的格式。
pub fn lossless_format(path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path)
        .map_err(|_| StegoError::LossyOutputFormat(path.display().to_string()))?;

    match format {
        ImageFormat::Png
        | ImageFormat::Bmp
        | ImageFormat::Tiff
        | ImageFormat::WebP
        | ImageFormat::Qoi => Ok(format),
        other => Err(StegoError::LossyOutputFormat(format!("{other:?}"))),
    }
}

/// 读取 `input`，隐藏消息后保存到 `output`，返回所使用的位深度。
pub fn encode_file(input: &Path, message: &str, output: &Path) -> Result<BitDepth> {
    info!("Starting encoding to {}", output.display());

    lossless_format(output)?;
    let mut image = load_rgb(input)?;
    let depth = encode(&mut image, message)?;
    save_rgb(&image, output)?;

    info!("Encoding completed successfully");
    Ok(depth)
}

/// 读取 `input` 并恢复其中的消息。
pub fn decode_file(input: &Path) -> Result<Decoded> {
    info!("Starting decoding from {}", input.display());

    let image = load_rgb(input)?;
    decode(&image)
}

/// 按深度 1 估算图像可容纳的字符数，见 [`estimate_capacity_chars`]。
pub fn capacity_of_file(input: &Path) -> Result<u64> {
    let (width, height) = image::image_dimensions(input).map_err(|source| StegoError::Image {
        path: input.to_path_buf(),
        source,
    })?;
    Ok(estimate_capacity_chars(width, height))
}
