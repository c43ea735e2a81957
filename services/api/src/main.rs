//! 账户 API 二进制入口：仅负责解析命令、初始化日志并启动应用。

mod accounts;
mod api;
mod app;
mod auth;
mod cli;
mod config;
mod logging;
mod state;
mod storage;

#[tokio::main]
/// 启动账户 API 服务。
async fn main() -> anyhow::Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let seed = match cli::dispatch(&args)? {
        cli::CliDispatch::Run { seed } => seed,
        cli::CliDispatch::Exit => return Ok(()),
    };

    let config = config::Config::from_env()?;
    let _log_runtime = logging::init("account-api", &config)?;
    app::run(config, seed).await
}
