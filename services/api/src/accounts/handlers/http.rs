//! 账户 HTTP 路由处理函数。

use ag_shared_protocol::{
    AccountView, CreateAccountRequest, DeletedResponse, LoginRequest, LoginResponse,
    TransferRequest,
};
use axum::{Extension, Json, extract::State};

use crate::{
    api::{error::ApiError, json::ApiJson},
    auth::gate::AuthorizedAccount,
    state::AppState,
};

/// 登录：校验密码并签发令牌。
pub(crate) async fn login_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    state.login(req).await.map(Json)
}

/// 账户列表。
pub(crate) async fn list_accounts_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    let accounts = state.store.list_accounts().await?;
    Ok(Json(accounts.iter().map(|account| account.view()).collect()))
}

/// 创建账户。
pub(crate) async fn create_account_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateAccountRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let account = state.create_account(req).await?;
    Ok(Json(account.view()))
}

/// 读取单个账户（经网关放行后执行）。
pub(crate) async fn get_account_handler(
    Extension(authorized): Extension<AuthorizedAccount>,
) -> Json<AccountView> {
    Json(authorized.account.view())
}

/// 删除单个账户（经网关放行后执行）。
pub(crate) async fn delete_account_handler(
    State(state): State<AppState>,
    Extension(authorized): Extension<AuthorizedAccount>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state.delete_account(&authorized).await.map(Json)
}

/// 转账占位：原样回显请求体，不做记账。
pub(crate) async fn transfer_handler(
    ApiJson(req): ApiJson<TransferRequest>,
) -> Json<TransferRequest> {
    Json(req)
}
