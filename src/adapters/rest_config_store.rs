use crate::adapters::session::Session;
use crate::domain::ports::ConfigStore;
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// 託管資料庫（PostgREST 介面）上的設定表：`key` 唯一，`value` 為 JSON
pub struct RestConfigStore {
    session: Session,
    client: Client,
    api_key: String,
    table: String,
}

impl RestConfigStore {
    pub fn new(
        session: Session,
        api_key: impl Into<String>,
        table: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            session,
            client,
            api_key: api_key.into(),
            table: table.into(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.session.store_base_url(), self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // 已登入時用使用者 token，否則用匿名金鑰
        let bearer = self.session.token().unwrap_or_else(|| self.api_key.clone());
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }
}

#[async_trait]
impl ConfigStore for RestConfigStore {
    async fn try_get(&self, key: &str) -> Result<Option<Value>> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("key", format!("eq.{}", key)), ("select", "value".to_string())]);
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::UpstreamStatus {
                status: status.as_u16(),
                url: self.table_url(),
            });
        }

        let rows: Value = response.json().await?;
        match rows {
            Value::Array(rows) => Ok(rows
                .into_iter()
                .next()
                .and_then(|mut row| row.get_mut("value").map(Value::take))
                .filter(|value| !value.is_null())),
            other => Err(PortalError::malformed(format!(
                "settings query returned a non-array payload: {}",
                other
            ))),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let request = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", "key")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!({ "key": key, "value": value }));

        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            tracing::info!("💾 Setting '{}' saved", key);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Failed to save setting '{}': HTTP {} {}", key, status, body);
            Err(PortalError::StoreError {
                message: format!("saving '{}' failed with HTTP {}: {}", key, status.as_u16(), body),
            })
        }
    }
}
