//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// 一款自适应位深度的 LSB 隐写工具：根据消息大小自动选择每个颜色通道使用的最低位数 (1 ~ 4)。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款自适应位深度的 LSB 隐写工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或恢复文本。\n位深度写入图像本身，解码时无需任何额外信息。"
)]
pub struct Cli {
    /// 日志级别。设置了 RUST_LOG 环境变量时以环境变量为准。
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (隐藏)、decode (恢复) 和 capacity (容量估算)。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 在图像中隐藏一段文本。
    Encode(EncodeArgs),

    /// 从经过隐写的图像中恢复隐藏的文本。
    Decode(DecodeArgs),

    /// 按每通道 1 位估算图像能容纳的字符数。
    Capacity(CapacityArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// 用于隐写的输入图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文本。
    #[arg(short, long, conflicts_with = "text", required_unless_present = "text")]
    pub message: Option<String>,

    /// 从文件读取要隐藏的文本。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 结果图像的保存路径 (必须是无损格式)。默认为 data/output/<随机数>_encoded.png。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// 已隐藏文本数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 将恢复的文本保存到该文件。不指定时直接输出到终端。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,

    /// 头部损坏或找不到结束标记时视为失败，而不是输出尽力恢复的结果。
    #[arg(short, long)]
    pub strict: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// 要估算容量的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
