use crate::domain::model::{Article, ArticleQuery, Category, Page};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 新聞 REST 服務。所有失敗都以 `Err` 回報，由呼叫端決定要降級為空列表還是往上拋
#[async_trait]
pub trait ContentGateway: Send + Sync {
    async fn list_articles(&self, query: &ArticleQuery) -> Result<Page<Article>>;
    async fn get_article(&self, slug: &str) -> Result<Article>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn category_articles(&self, slug: &str, page: u32) -> Result<Page<Article>>;
    async fn latest_articles(&self, page: u32) -> Result<Page<Article>>;
    async fn search(&self, query: &str, page: u32) -> Result<Page<Article>>;
}

/// 站台設定的 key/value 儲存
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// 區分「未設定」(`Ok(None)`) 與讀取失敗；管理端的讀改寫必須用這個
    async fn try_get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;

    /// 前台用：未設定或讀取失敗都回 `None`；失敗只記錄不拋出
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        match self.try_get(key).await {
            Ok(value) => {
                tracing::debug!("Setting '{}' loaded (present: {})", key, value.is_some());
                value
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to read setting '{}': {}", key, e);
                None
            }
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn gateway_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn freshness_window(&self) -> Duration;
    fn store_base_url(&self) -> &str;
    fn store_api_key(&self) -> &str;
    fn settings_table(&self) -> &str;
}

#[async_trait]
impl<T: ContentGateway + ?Sized> ContentGateway for std::sync::Arc<T> {
    async fn list_articles(&self, query: &ArticleQuery) -> Result<Page<Article>> {
        (**self).list_articles(query).await
    }

    async fn get_article(&self, slug: &str) -> Result<Article> {
        (**self).get_article(slug).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        (**self).list_categories().await
    }

    async fn category_articles(&self, slug: &str, page: u32) -> Result<Page<Article>> {
        (**self).category_articles(slug, page).await
    }

    async fn latest_articles(&self, page: u32) -> Result<Page<Article>> {
        (**self).latest_articles(page).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<Page<Article>> {
        (**self).search(query, page).await
    }
}

#[async_trait]
impl<T: ConfigStore + ?Sized> ConfigStore for std::sync::Arc<T> {
    async fn try_get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        (**self).try_get(key).await
    }

    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        (**self).set(key, value).await
    }
}
