//! 配置模块职责：
//! 1. 读取 `.env` 与环境变量，提供监听地址、令牌 TTL、存储路径、日志目录与级别默认值。
//! 2. 签名密钥缺失或为空时直接启动失败，绝不延迟到请求期。

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, anyhow};
use tracing::level_filters::LevelFilter;

use crate::auth::token::SigningSecret;

/// 默认监听地址。
pub(crate) const DEFAULT_ADDR: &str = "0.0.0.0:3000";
/// 默认令牌有效期（秒）。
pub(crate) const DEFAULT_TOKEN_TTL_SEC: u64 = 3600;
/// 默认日志目录（相对当前工作目录）。
pub(crate) const DEFAULT_LOG_DIR: &str = "logs";
/// 文件日志默认保留 `debug`，网关拒绝原因可完整回放。
pub(crate) const DEFAULT_FILE_LOG_LEVEL: LevelFilter = LevelFilter::DEBUG;

const SECRET_ENV: &str = "JWT_SECRET";
const ADDR_ENV: &str = "AG_ADDR";
const TOKEN_TTL_ENV: &str = "AG_TOKEN_TTL_SEC";
const STORE_PATH_ENV: &str = "AG_ACCOUNT_STORE_PATH";
const LOG_DIR_ENV: &str = "AG_LOG_DIR";
const FILE_LOG_LEVEL_ENV: &str = "AG_FILE_LOG_LEVEL";

/// 运行时配置。
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// HTTP 监听地址。
    pub(crate) addr: String,
    /// 进程级签名密钥。
    pub(crate) signing_secret: SigningSecret,
    /// 令牌有效期。
    pub(crate) token_ttl: Duration,
    /// 账户快照路径；为空表示仅内存。
    pub(crate) store_path: Option<PathBuf>,
    /// 滚动日志文件目录。
    pub(crate) log_dir: PathBuf,
    /// 文件日志级别（stdout 仍由 `RUST_LOG` 控制）。
    pub(crate) file_log_level: LevelFilter,
}

impl Config {
    /// 加载 `.env`（可缺省）后从进程环境构建配置。
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(err).context("load .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构建配置。
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        // 密钥按原始字节使用，不经过 `read` 的裁剪。
        let secret_raw = lookup(SECRET_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| anyhow!("{SECRET_ENV} is required and must not be empty"))?;
        let signing_secret = SigningSecret::new(&secret_raw).context(SECRET_ENV)?;

        let token_ttl = match read(TOKEN_TTL_ENV) {
            None => Duration::from_secs(DEFAULT_TOKEN_TTL_SEC),
            Some(raw) => {
                let sec = raw
                    .parse::<u64>()
                    .ok()
                    .filter(|v| *v > 0)
                    .ok_or_else(|| anyhow!("{TOKEN_TTL_ENV} must be a positive integer, got {raw:?}"))?;
                Duration::from_secs(sec)
            }
        };

        let file_log_level = match read(FILE_LOG_LEVEL_ENV) {
            None => DEFAULT_FILE_LOG_LEVEL,
            Some(raw) => raw
                .parse::<LevelFilter>()
                .map_err(|_| anyhow!("{FILE_LOG_LEVEL_ENV} is not a log level, got {raw:?}"))?,
        };

        Ok(Self {
            addr: read(ADDR_ENV).unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            signing_secret,
            token_ttl,
            store_path: read(STORE_PATH_ENV).map(PathBuf::from),
            log_dir: read(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            file_log_level,
        })
    }
}
