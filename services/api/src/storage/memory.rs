//! 内存账户存储，可选落盘为 JSON 快照。

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{Storage, StorageError};
use crate::accounts::model::{Account, NewAccount};

/// 快照文件结构。
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    /// 最近一次分配的 ID。
    #[serde(default)]
    last_id: i64,
    #[serde(default)]
    accounts: BTreeMap<i64, Account>,
}

/// 默认存储实现。
pub(crate) struct AccountStore {
    inner: RwLock<Snapshot>,
    /// 快照路径；为空时仅驻留内存。
    path: Option<PathBuf>,
}

impl AccountStore {
    /// 纯内存存储。
    pub(crate) fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Snapshot::default()),
            path: None,
        }
    }

    /// 打开快照文件；文件不存在时从空库开始。
    pub(crate) fn open(path: PathBuf) -> Result<Self, StorageError> {
        let snapshot = load_snapshot(&path)?;
        info!(
            "account store loaded {} account(s) from {}",
            snapshot.accounts.len(),
            path.display()
        );
        Ok(Self {
            inner: RwLock::new(snapshot),
            path: Some(path),
        })
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        match &self.path {
            Some(path) => persist_snapshot(path, snapshot),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Storage for AccountStore {
    async fn get_account_by_id(&self, id: i64) -> Result<Account, StorageError> {
        let guard = self.inner.read().await;
        guard.accounts.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Account, StorageError> {
        let guard = self.inner.read().await;
        guard
            .accounts
            .values()
            .find(|account| account.number == number)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StorageError> {
        let mut guard = self.inner.write().await;
        if guard.accounts.values().any(|a| a.number == account.number) {
            return Err(StorageError::NumberTaken(account.number));
        }

        let id = guard.last_id.saturating_add(1);
        let account = account.into_account(id);
        guard.last_id = id;
        guard.accounts.insert(id, account.clone());
        if let Err(err) = self.persist(&guard) {
            guard.accounts.remove(&id);
            guard.last_id = id - 1;
            return Err(err);
        }
        debug!("account {id} created");
        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<(), StorageError> {
        let mut guard = self.inner.write().await;
        let Some(removed) = guard.accounts.remove(&id) else {
            return Err(StorageError::NotFound);
        };
        if let Err(err) = self.persist(&guard) {
            guard.accounts.insert(id, removed);
            return Err(err);
        }
        debug!("account {id} deleted");
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StorageError> {
        let guard = self.inner.read().await;
        Ok(guard.accounts.values().cloned().collect())
    }
}

/// 读取快照。
fn load_snapshot(path: &Path) -> Result<Snapshot, StorageError> {
    if !path.exists() {
        return Ok(Snapshot::default());
    }
    let raw = fs::read(path)
        .map_err(|err| StorageError::Persist(format!("read {}: {err}", path.display())))?;
    let mut snapshot: Snapshot = serde_json::from_slice(&raw)
        .map_err(|err| StorageError::Persist(format!("decode {}: {err}", path.display())))?;
    // 手工编辑过的文件里 lastId 可能落后。
    let max_id = snapshot.accounts.keys().copied().max().unwrap_or(0);
    snapshot.last_id = snapshot.last_id.max(max_id);
    Ok(snapshot)
}

/// 写入快照：先写临时文件再替换。
fn persist_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), StorageError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| StorageError::Persist(format!("create dir {}: {err}", parent.display())))?;
    }
    let encoded = serde_json::to_vec_pretty(snapshot)
        .map_err(|err| StorageError::Persist(format!("encode snapshot: {err}")))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, encoded)
        .map_err(|err| StorageError::Persist(format!("write {}: {err}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|err| StorageError::Persist(format!("rename {}: {err}", path.display())))
}
