use clap::Parser;

use clickpulse::cli::{Cli, Commands};
use clickpulse::config::init_config_from;
use clickpulse::runtime::modes;
use clickpulse::system::init_logging;

async fn run_cli_or_exit(cmd: Commands) -> anyhow::Result<()> {
    if let Err(e) = modes::run_cli(cmd).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件（如果存在）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 生成示例配置时本地还没有可用配置
    if let Some(cmd @ Commands::Config { .. }) = cli.command {
        return run_cli_or_exit(cmd).await;
    }

    // 配置缺失是致命错误：彩色输出并以状态码 1 退出
    let config = match init_config_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    match cli.command {
        None | Some(Commands::Serve) => modes::run_server(config).await,
        Some(cmd) => run_cli_or_exit(cmd).await,
    }
}
