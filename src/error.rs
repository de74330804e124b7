//! # 错误类型模块
//!
//! 核心库对外只暴露 [`StegoError`] 这一种错误类型，
//! 图像读写等外部协作方的失败都会被包装进来。

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegoError {
    /// 即使使用最大位深度，图像也放不下整条消息。
    #[error("Message too large: {required} bits needed, {available} available even at the maximum bit depth")]
    CapacityExceeded { required: u64, available: u64 },

    /// 消息中含有码位大于 0xFF 的字符，无法用 8 bits 表示。
    #[error("Character {character:?} at index {index} does not fit in 8 bits")]
    UnsupportedCharacter { character: char, index: usize },

    /// 图像没有任何像素，连头部像素都不存在。
    #[error("Image has no pixels")]
    EmptyImage,

    /// 输出格式不是无损格式，保存后会破坏隐写数据。
    #[error("Output format is not lossless: {0}")]
    LossyOutputFormat(String),

    #[error("Image error on {}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T, E = StegoError> = std::result::Result<T, E>;
