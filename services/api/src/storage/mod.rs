//! 存储协作方：账户读写契约与默认实现。

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::accounts::model::{Account, NewAccount};

pub(crate) use memory::AccountStore;

/// 存储错误。
#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("account not found")]
    NotFound,
    #[error("account number {0} already exists")]
    NumberTaken(i64),
    #[error("persist accounts failed: {0}")]
    Persist(String),
}

/// 账户存储契约。每次调用视为一次独立原子读写，跨调用不保证一致性。
#[async_trait]
pub(crate) trait Storage: Send + Sync {
    async fn get_account_by_id(&self, id: i64) -> Result<Account, StorageError>;

    async fn get_account_by_number(&self, number: i64) -> Result<Account, StorageError>;

    /// 分配 ID 并写入；编号重复时返回 `NumberTaken`。
    async fn create_account(&self, account: NewAccount) -> Result<Account, StorageError>;

    async fn delete_account(&self, id: i64) -> Result<(), StorageError>;

    async fn list_accounts(&self) -> Result<Vec<Account>, StorageError>;
}
