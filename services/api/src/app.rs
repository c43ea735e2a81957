//! 应用装配：路由、鉴权中间件、CORS 与监听。

use ag_shared_protocol::TOKEN_HEADER;
use anyhow::Context;
use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::{
    accounts::handlers::{
        create_account_handler, delete_account_handler, get_account_handler,
        list_accounts_handler, login_handler, transfer_handler,
    },
    auth::gate::require_account_owner,
    config::Config,
    state::AppState,
};


/// 服务入口：装配状态、可选写入演示账户并开始监听。
pub(crate) async fn run(config: Config, seed: bool) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    if seed {
        info!("seeding the account store");
        state
            .seed_demo_account()
            .await
            .map_err(|err| anyhow::anyhow!("seed demo account: {}", err.message))?;
    }

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    info!("account api listening on {}", config.addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// 构建路由表。`/account/{id}` 上的所有方法都先经过授权网关。
pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)]);

    let owned = Router::new()
        .route(
            "/account/{id}",
            get(get_account_handler).delete(delete_account_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_account_owner,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", post(login_handler))
        .route(
            "/account",
            get(list_accounts_handler).post(create_account_handler),
        )
        .route("/transfer", post(transfer_handler))
        .merge(owned)
        .layer(cors)
        .with_state(state)
}

/// 健康检查接口。
async fn healthz() -> &'static str {
    "ok"
}
