//! 服务共享状态：存储句柄、令牌签发器与授权网关。

use std::{sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    auth::{
        gate::AuthorizationGate,
        password,
        token::{SigningSecret, TokenIssuer, TokenVerifier},
    },
    config::Config,
    storage::{AccountStore, Storage},
};

/// 每个请求共享的只读状态，克隆开销为若干 `Arc`。
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<dyn Storage>,
    pub(crate) issuer: TokenIssuer,
    pub(crate) gate: AuthorizationGate,
}

impl AppState {
    pub(crate) fn new(store: Arc<dyn Storage>, secret: SigningSecret, token_ttl: Duration) -> Self {
        let gate = AuthorizationGate::new(TokenVerifier::new(secret.clone()), store.clone());
        Self {
            store,
            issuer: TokenIssuer::new(secret, token_ttl),
            gate,
        }
    }

    /// 按配置打开存储并装配状态。
    pub(crate) fn from_config(config: &Config) -> anyhow::Result<Self> {
        password::warm_up();
        let store: Arc<dyn Storage> = match &config.store_path {
            Some(path) => Arc::new(
                AccountStore::open(path.clone())
                    .with_context(|| format!("open account store {}", path.display()))?,
            ),
            None => Arc::new(AccountStore::in_memory()),
        };
        Ok(Self::new(
            store,
            config.signing_secret.clone(),
            config.token_ttl,
        ))
    }
}
