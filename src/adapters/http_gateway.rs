use crate::adapters::session::Session;
use crate::domain::model::{Article, ArticleQuery, Category, Page};
use crate::domain::normalize::{
    normalize_slug, parse_article_detail, parse_article_page, parse_category_list,
};
use crate::domain::ports::{ConfigProvider, ContentGateway};
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

/// 新聞 REST 服務的 reqwest 實作，附帶短暫的新鮮度快取（只快取成功回應）
pub struct HttpContentGateway {
    session: Session,
    client: Client,
    freshness: Duration,
    cache: Mutex<HashMap<String, (Instant, Value)>>,
}

impl HttpContentGateway {
    pub fn new(session: Session, timeout: Duration, freshness: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            session,
            client,
            freshness,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_config<C: ConfigProvider>(session: Session, config: &C) -> Result<Self> {
        Self::new(session, config.request_timeout(), config.freshness_window())
    }

    /// 清空快取（例如管理端更新內容之後）
    pub async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }

    fn endpoint(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(self.session.gateway_base_url()).map_err(|e| {
            PortalError::InvalidConfigValueError {
                field: "gateway.base_url".to_string(),
                value: self.session.gateway_base_url().to_string(),
                reason: e.to_string(),
            }
        })?;

        url.path_segments_mut()
            .map_err(|_| PortalError::ConfigError {
                message: format!(
                    "gateway base URL cannot carry a path: {}",
                    self.session.gateway_base_url()
                ),
            })?
            .pop_if_empty()
            .extend(segments);

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn cached(&self, key: &str) -> Option<Value> {
        if self.freshness.is_zero() {
            return None;
        }
        let mut cache = self.cache.lock().await;
        match cache.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.freshness => Some(value.clone()),
            Some(_) => {
                cache.remove(key);
                None
            }
            None => None,
        }
    }

    async fn fetch_json(&self, url: Url) -> Result<Value> {
        let key = url.to_string();
        if let Some(value) = self.cached(&key).await {
            tracing::debug!("Serving fresh cached payload for {}", key);
            return Ok(value);
        }

        tracing::debug!("Making API request to: {}", key);
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(PortalError::UpstreamStatus {
                status: status.as_u16(),
                url: key,
            });
        }

        let bytes = response.bytes().await?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| PortalError::malformed(format!("{} returned invalid JSON: {}", key, e)))?;

        if !self.freshness.is_zero() {
            self.cache
                .lock()
                .await
                .insert(key, (Instant::now(), value.clone()));
        }

        Ok(value)
    }
}

#[async_trait]
impl ContentGateway for HttpContentGateway {
    async fn list_articles(&self, query: &ArticleQuery) -> Result<Page<Article>> {
        let url = self.endpoint(&["news"], &query.to_params())?;
        let payload = self.fetch_json(url).await?;
        parse_article_page(&payload)
    }

    async fn get_article(&self, slug: &str) -> Result<Article> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(PortalError::not_found("Article", slug));
        }
        let url = self.endpoint(&["news", slug], &[])?;
        match self.fetch_json(url).await {
            Ok(payload) => parse_article_detail(&payload, slug),
            Err(PortalError::UpstreamStatus { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(PortalError::not_found("Article", slug))
            }
            Err(e) => Err(e),
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let url = self.endpoint(&["categories"], &[])?;
        let payload = self.fetch_json(url).await?;
        parse_category_list(&payload)
    }

    async fn category_articles(&self, slug: &str, page: u32) -> Result<Page<Article>> {
        let slug = normalize_slug(slug);
        let url = self.endpoint(
            &["categories", slug.as_str(), "news"],
            &[("page", page.to_string())],
        )?;
        let payload = self.fetch_json(url).await?;
        parse_article_page(&payload)
    }

    async fn latest_articles(&self, page: u32) -> Result<Page<Article>> {
        let url = self.endpoint(&["latest-news"], &[("page", page.to_string())])?;
        let payload = self.fetch_json(url).await?;
        parse_article_page(&payload)
    }

    async fn search(&self, query: &str, page: u32) -> Result<Page<Article>> {
        let url = self.endpoint(
            &["search"],
            &[("q", query.trim().to_string()), ("page", page.to_string())],
        )?;
        let payload = self.fetch_json(url).await?;
        parse_article_page(&payload)
    }
}
