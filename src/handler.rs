//! # 命令处理逻辑模块
//!
//! 包含处理 `encode`、`decode` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, DecodeArgs, EncodeArgs};
use crate::codec::{Decoded, capacity_of_file, decode_file, encode_file};
use crate::constants::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, SUFFIX_RANGE};
use crate::error::StegoError;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use log::{info, warn};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Encode' 命令的执行逻辑。
///
/// 负责读取消息、报告保守的容量估算、调用核心编码流程，并把结果图像写入目标路径。
/// 未指定目标路径时，在 `data/output` 下生成一个带随机后缀的文件名。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 图像即使使用最大位深度也放不下消息。
/// * 无法写入到目标图像文件。
pub fn handle_encode(args: EncodeArgs) -> Result<PathBuf> {
    let message = match (&args.message, &args.text) {
        (Some(message), _) => message.clone(),
        (None, Some(text)) => fs::read_to_string(text).with_context(|| {
            format!(
                "Unable to read text file: {}",
                text.to_string_lossy().red().bold()
            )
        })?,
        (None, None) => bail!("No message given. Use --message or --text."),
    };

    let dest = match args.dest {
        Some(dest) => dest,
        None => {
            ensure_directories(Path::new("."))?;
            default_output_path(Path::new(DEFAULT_OUTPUT_DIR))
        }
    };
    ensure_writable(&dest, args.force)?;

    match capacity_of_file(&args.image) {
        Ok(max_chars) => {
            info!("Maximum message size: {max_chars} characters with basic LSB encoding")
        }
        Err(e) => warn!("Failed to calculate capacity: {e}"),
    }

    let depth = match encode_file(&args.image, &message, &dest) {
        Ok(depth) => depth,
        Err(StegoError::CapacityExceeded {
            required,
            available,
        }) => bail!(
            "Not enough space in the image to hide the text. \nRequired: {} bits, Available: {} bits",
            required.to_string().red().bold(),
            available.to_string().green().bold()
        ),
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to hide the message in {}",
                    args.image.to_string_lossy().red().bold()
                )
            });
        }
    };

    println!(
        "The text has been successfully hidden with {} bit(s) per channel and saved: {}",
        depth.to_string().green().bold(),
        dest.to_string_lossy().green().bold()
    );

    Ok(dest)
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 恢复图像中的消息，写入目标文本文件或直接输出到终端。
/// 头部损坏或找不到结束标记时只给出警告；指定 `--strict` 时则视为失败。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 指定了 `--strict` 且解码过程中出现警告。
/// * 目标文件已存在且未指定 `--force`，或无法写入。
pub fn handle_decode(args: DecodeArgs) -> Result<Decoded> {
    let decoded = decode_file(&args.image).with_context(|| {
        format!(
            "Failed to recover the message from '{}'.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    if args.strict && !decoded.is_clean() {
        bail!(
            "The image does not contain a well-formed message: {:?}",
            decoded.warnings
        );
    }

    match &args.text {
        Some(text) => {
            ensure_writable(text, args.force)?;
            fs::write(text, &decoded.message).with_context(|| {
                format!(
                    "Unable to write to target text file: {}",
                    text.to_string_lossy().red().bold()
                )
            })?;
            println!(
                "The text has been successfully recovered and saved: {}",
                text.to_string_lossy().green().bold()
            );
        }
        None => {
            info!("Decoded message:");
            println!("\n{}\n", decoded.message);
        }
    }

    Ok(decoded)
}

/// 处理 'Capacity' 命令：输出按每通道 1 位估算的字符数。
///
/// 实际编码会按需把位深度提升到 4，因此真实容量可能高出数倍。
pub fn handle_capacity(args: CapacityArgs) -> Result<u64> {
    let max_chars = capacity_of_file(&args.image).with_context(|| {
        format!(
            "Failed to calculate capacity of {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "Maximum message size: {} characters with basic LSB encoding (1 bit per channel)",
        max_chars.to_string().green().bold()
    );

    Ok(max_chars)
}

/// 在 `dir` 中生成 `<随机数>_encoded.png`，保证与已有文件不重名。
pub fn default_output_path(dir: &Path) -> PathBuf {
    let mut rng = rand::rng();
    loop {
        let suffix = rng.random_range(SUFFIX_RANGE);
        let candidate = dir.join(format!("{suffix}_encoded.png"));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// 在 `root` 下创建默认的输入、输出目录。
pub fn ensure_directories(root: &Path) -> Result<()> {
    [DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR]
        .iter()
        .map(|dir| root.join(dir))
        .try_for_each(|dir| {
            fs::create_dir_all(&dir).with_context(|| {
                format!(
                    "Unable to create directory: {}",
                    dir.to_string_lossy().red().bold()
                )
            })
        })
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}
