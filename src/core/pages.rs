use crate::domain::model::{Article, Category, Page};
use crate::domain::normalize::normalize_slug;
use crate::domain::ports::ContentGateway;
use crate::utils::error::{PortalError, Result};
use serde::Serialize;

/// 列表型請求的降級策略：失敗記錄後以空頁取代，畫面顯示「沒有文章」
pub fn or_empty<T>(result: Result<Page<T>>, context: &str) -> Page<T> {
    match result {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("⚠️ Falling back to an empty list for {}: {}", context, e);
            Page::empty()
        }
    }
}

/// 單一資源頁面的呈現狀態；找不到與暫時失敗分開處理
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "page", rename_all = "snake_case")]
pub enum PageView<T> {
    Ready(T),
    NotFound,
    Unavailable { message: String },
}

impl<T> PageView<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => PageView::Ready(value),
            Err(e) if e.is_not_found() => PageView::NotFound,
            Err(e) => {
                tracing::error!("❌ Page could not be built: {}", e);
                PageView::Unavailable {
                    message: e.user_friendly_message(),
                }
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PageView::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub articles: Page<Article>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub results: Page<Article>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticlePage {
    pub article: Article,
    pub related: Vec<Article>,
}

/// 分類頁、搜尋頁與文章頁；各自獨立抓取，不共用聚合流程
pub struct PageController<G: ContentGateway> {
    gateway: G,
    related_count: usize,
}

impl<G: ContentGateway> PageController<G> {
    pub fn new(gateway: G, related_count: usize) -> Self {
        Self {
            gateway,
            related_count,
        }
    }

    pub async fn category_page(&self, slug: &str, page: u32) -> PageView<CategoryPage> {
        PageView::from_result(self.build_category_page(slug, page.max(1)).await)
    }

    async fn build_category_page(&self, slug: &str, page: u32) -> Result<CategoryPage> {
        let slug = normalize_slug(slug);
        if slug.is_empty() {
            return Err(PortalError::not_found("Category", slug));
        }

        let category = self
            .gateway
            .list_categories()
            .await?
            .into_iter()
            .find(|c| c.slug == slug)
            .ok_or_else(|| PortalError::not_found("Category", slug.as_str()))?;

        let articles = or_empty(
            self.gateway.category_articles(&slug, page).await,
            &format!("category '{}'", slug),
        );
        tracing::debug!(
            "Category page '{}' page {} with {} articles",
            slug,
            page,
            articles.data.len()
        );

        Ok(CategoryPage { category, articles })
    }

    pub async fn search_page(&self, query: &str, page: u32) -> SearchPage {
        let query = query.trim().to_string();
        if query.is_empty() {
            return SearchPage {
                query,
                results: Page::empty(),
            };
        }

        let results = or_empty(
            self.gateway.search(&query, page.max(1)).await,
            &format!("search '{}'", query),
        );
        tracing::info!("🔎 Search '{}' returned {} results", query, results.total);
        SearchPage { query, results }
    }

    pub async fn article_page(&self, slug: &str) -> PageView<ArticlePage> {
        PageView::from_result(self.build_article_page(slug).await)
    }

    async fn build_article_page(&self, slug: &str) -> Result<ArticlePage> {
        let article = self.gateway.get_article(slug).await?;
        let related = self.related_articles(&article).await;
        Ok(ArticlePage { article, related })
    }

    /// 同分類的其他文章，排除目前這篇
    async fn related_articles(&self, article: &Article) -> Vec<Article> {
        let Some(category_slug) = article.category_slug().filter(|s| !s.is_empty()) else {
            return Vec::new();
        };

        or_empty(
            self.gateway.category_articles(category_slug, 1).await,
            &format!("related articles of '{}'", article.slug),
        )
        .data
        .into_iter()
        .filter(|candidate| candidate.slug != article.slug)
        .take(self.related_count)
        .collect()
    }
}
