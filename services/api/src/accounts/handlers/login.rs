//! 登录：账号不存在与密码错误对外同一信号。

use ag_shared_protocol::{LoginRequest, LoginResponse};
use tracing::{error, info, warn};

use crate::{
    api::error::ApiError,
    auth::password,
    state::AppState,
    storage::StorageError,
};

impl AppState {
    /// 校验凭证并签发令牌。
    pub(crate) async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        let number = req.number;
        let account = match self.store.get_account_by_number(number).await {
            Ok(account) => Some(account),
            Err(StorageError::NotFound) => None,
            Err(err) => return Err(err.into()),
        };

        // argon2 校验是 CPU 密集操作，放到阻塞线程池。
        let checked = tokio::task::spawn_blocking(move || match account {
            Some(account) if account.validate_password(&req.password) => Ok(account),
            Some(_) => Err("wrong password"),
            None => {
                password::burn_verification(&req.password);
                Err("unknown account number")
            }
        })
        .await
        .map_err(|err| {
            error!("password check task failed: {err}");
            ApiError::internal()
        })?;

        let account = match checked {
            Ok(account) => account,
            Err(reason) => {
                warn!("login rejected for number {number}: {reason}");
                return Err(ApiError::not_authenticated());
            }
        };

        let token = self.issuer.issue(account.number)?;
        info!("account {} logged in", account.id);
        Ok(LoginResponse {
            token,
            number: account.number,
        })
    }
}
