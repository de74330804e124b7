//! # adaptive_lsb 库
//!
//! 本库包含自适应位深度 LSB 隐写的核心逻辑：
//! 根据消息大小选择每通道使用的最低位数，把位深度写入图像自身，
//! 并用结束标记 `%%%` 界定消息边界。

// 声明库包含的所有模块。

pub mod bitstream;
pub mod capacity;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod error;
pub mod handler;
pub mod header;
pub mod logging;
pub mod steganography;

pub use codec::{DecodeWarning, Decoded, decode, decode_file, encode, encode_file};
pub use error::StegoError;
