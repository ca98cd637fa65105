use crate::domain::ports::ConfigStore;
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 行程內的設定儲存，供離線執行與測試使用
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
    read_only: bool,
    unreadable: bool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有寫入都會失敗，用來模擬儲存端故障
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// 所有讀取都會失敗，寫入照常，用來模擬儲存端暫時無法讀取
    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    /// 直接查看內容，不經過讀取失敗的模擬
    pub async fn snapshot(&self, key: &str) -> Option<Value> {
        self.values.lock().await.get(key).cloned()
    }

    pub async fn with_value(self, key: &str, value: Value) -> Self {
        self.values.lock().await.insert(key.to_string(), value);
        self
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn try_get(&self, key: &str) -> Result<Option<Value>> {
        if self.unreadable {
            return Err(PortalError::StoreError {
                message: format!("store is unreadable, cannot load '{}'", key),
            });
        }
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if self.read_only {
            return Err(PortalError::StoreError {
                message: format!("store is read-only, cannot save '{}'", key),
            });
        }
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
