//! # armsync CLI
//!
//! armsync 控制引擎的命令行工具。
//!
//! ```bash
//! # 校验配置并打印映射表
//! armsync-cli check --config armsync.toml
//!
//! # 一次性映射（外部 7 → 内部 8 → 外部 7）
//! armsync-cli map 0,0,0,0,0,0,0.5
//!
//! # 从 stdin 读取 JSON 行指令，遥测以 JSON 行输出到 stdout
//! armsync-cli run --config armsync.toml < commands.jsonl
//! ```
//!
//! 日志输出到 stderr，由 `RUST_LOG` 控制。

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{CheckCommand, MapCommand, RunCommand};

/// armsync CLI - 关节指令桥接工具
#[derive(Parser, Debug)]
#[command(name = "armsync-cli")]
#[command(about = "Command-line interface for the armsync control engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 校验配置并打印映射表
    Check {
        #[command(flatten)]
        args: CheckCommand,
    },

    /// 一次性正向 / 逆向映射
    Map {
        #[command(flatten)]
        args: MapCommand,
    },

    /// 运行引擎（stdin 指令 → stdout 遥测）
    Run {
        #[command(flatten)]
        args: RunCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    armsync::init_logging("armsync_cli=info,armsync_control=info,armsync_driver=warn");

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { args } => args.execute(),
        Commands::Map { args } => args.execute(),
        Commands::Run { args } => args.execute(),
    }
}
