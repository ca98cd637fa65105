use crate::domain::model::{Article, CategoryNewsMap, LayoutBlock};
use crate::domain::ports::ContentGateway;
use futures::future;
use std::collections::BTreeSet;

/// 版位引用到的分類 slug（去重、排序）；空 slug 與停用的版位不參與
pub fn distinct_slugs(blocks: &[LayoutBlock]) -> Vec<String> {
    blocks
        .iter()
        .filter(|b| b.active && !b.category_slug.trim().is_empty())
        .map(|b| b.category_slug.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 把版位列表解析成 CategoryNewsMap：每個分類 slug 一次請求，全部同時發出，
/// 全部結束後才回傳。單一分類失敗只影響自己（對應空列表）。
pub struct LayoutBlockResolver<'a, G: ContentGateway + ?Sized> {
    gateway: &'a G,
}

impl<'a, G: ContentGateway + ?Sized> LayoutBlockResolver<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    pub async fn resolve(&self, blocks: &[LayoutBlock]) -> CategoryNewsMap {
        self.resolve_slugs(&distinct_slugs(blocks)).await
    }

    pub async fn resolve_slugs(&self, slugs: &[String]) -> CategoryNewsMap {
        if slugs.is_empty() {
            return CategoryNewsMap::new();
        }

        tracing::debug!("📡 Resolving {} layout categories: {:?}", slugs.len(), slugs);

        let fetches = slugs.iter().map(|slug| async move {
            let articles = self.fetch_category(slug).await;
            (slug.clone(), articles)
        });

        let news: CategoryNewsMap = future::join_all(fetches).await.into_iter().collect();

        let failed = news.values().filter(|articles| articles.is_empty()).count();
        tracing::info!(
            "📂 Resolved {} layout categories ({} empty)",
            news.len(),
            failed
        );
        news
    }

    async fn fetch_category(&self, slug: &str) -> Vec<Article> {
        match self.gateway.category_articles(slug, 1).await {
            Ok(page) => page.data,
            Err(e) => {
                tracing::warn!("⚠️ Category '{}' could not be loaded: {}", slug, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::BlockKind;

    fn block(id: &str, slug: &str, order: i64, active: bool) -> LayoutBlock {
        LayoutBlock {
            id: id.to_string(),
            kind: BlockKind::Section,
            category_slug: slug.to_string(),
            order_position: order,
            active,
        }
    }

    #[test]
    fn test_distinct_slugs_skips_empty_and_inactive() {
        let blocks = vec![
            block("1", "tech", 0, true),
            block("2", "", 1, true),
            block("3", "tech", 2, true),
            block("4", "sports", 3, true),
            block("5", "politics", 4, false),
            block("6", "   ", 5, true),
        ];
        assert_eq!(distinct_slugs(&blocks), vec!["sports", "tech"]);
    }

    #[test]
    fn test_distinct_slugs_of_empty_list() {
        assert!(distinct_slugs(&[]).is_empty());
    }
}
