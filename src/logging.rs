//! # 日志模块
//!
//! 为命令行程序安装 `env_logger`，按级别给 `LEVEL: message` 上色。
//! 库本身只通过 `log` 宏输出，不会安装任何 logger。

use colored::Colorize;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

/// 初始化全局 logger。`RUST_LOG` 已设置时覆盖 `default_level`。
pub fn init_logger(default_level: LevelFilter) {
    Builder::new()
        .filter_level(default_level)
        .parse_env(Env::default())
        .format(|buf, record| {
            let line = format!("{}: {}", record.level(), record.args());
            let line = match record.level() {
                Level::Error => line.red(),
                Level::Warn => line.yellow(),
                Level::Info => line.green(),
                Level::Debug | Level::Trace => line.normal(),
            };
            writeln!(buf, "{line}")
        })
        .init();
}
