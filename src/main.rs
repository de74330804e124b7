use clap::Parser;

use adaptive_lsb::{
    cli::{Cli, Commands},
    handler::{handle_capacity, handle_decode, handle_encode},
    logging::init_logger,
};

/// 程序的主入口点
///
/// 负责解析命令行参数、初始化日志，并根据指定的子命令
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    init_logger(cli.log_level.into());

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Encode(args) => handle_encode(args).map(drop),
        Commands::Decode(args) => handle_decode(args).map(drop),
        Commands::Capacity(args) => handle_capacity(args).map(drop),
    }
}
