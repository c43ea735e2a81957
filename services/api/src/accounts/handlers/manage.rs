//! 账户增删：编号冲突重试与演示数据写入。

use ag_shared_protocol::{CreateAccountRequest, DeletedResponse};
use tracing::{debug, error, info};

use crate::{
    accounts::model::{Account, NewAccount},
    api::error::ApiError,
    auth::gate::AuthorizedAccount,
    state::AppState,
    storage::StorageError,
};

/// 随机编号冲突时的最大尝试次数。
const CREATE_ATTEMPTS: usize = 8;

impl AppState {
    /// 创建账户；编号被占用时换号重试。
    pub(crate) async fn create_account(
        &self,
        req: CreateAccountRequest,
    ) -> Result<Account, ApiError> {
        let mut pending = tokio::task::spawn_blocking(move || {
            NewAccount::new(&req.first_name, &req.last_name, &req.password)
        })
        .await
        .map_err(|err| {
            error!("derive password task failed: {err}");
            ApiError::internal()
        })??;

        for _ in 0..CREATE_ATTEMPTS {
            match self.store.create_account(pending.clone()).await {
                Ok(account) => {
                    info!("account {} created with number {}", account.id, account.number);
                    return Ok(account);
                }
                Err(StorageError::NumberTaken(number)) => {
                    debug!("account number {number} taken, drawing another");
                    pending.reroll_number();
                }
                Err(err) => return Err(err.into()),
            }
        }
        error!("no free account number after {CREATE_ATTEMPTS} attempts");
        Err(ApiError::internal())
    }

    /// 删除网关已放行的账户。
    pub(crate) async fn delete_account(
        &self,
        authorized: &AuthorizedAccount,
    ) -> Result<DeletedResponse, ApiError> {
        let id = authorized.account.id;
        self.store.delete_account(id).await?;
        info!("account {id} deleted by its owner");
        Ok(DeletedResponse { deleted: id })
    }

    /// 写入演示账户（`--seed`）。
    pub(crate) async fn seed_demo_account(&self) -> Result<Account, ApiError> {
        let account = self
            .create_account(CreateAccountRequest {
                first_name: "Jaay".to_string(),
                last_name: "lastname".to_string(),
                password: "password".to_string(),
            })
            .await?;
        info!("seeded demo account, number {}", account.number);
        Ok(account)
    }
}
