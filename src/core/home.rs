//! 首頁聚合。
//!
//! 四個資料來源（頭條、最新、熱門、分類版位）在同一個 task 裡並行抓取，
//! 各自完成時立即發布到 watch channel；分類版位的 CategoryNewsMap 只在所有
//! 分類請求都結束後才整批發布，讀者不會看到半成品。

use crate::core::layout::active_in_order;
use crate::core::pages::or_empty;
use crate::core::resolver::{distinct_slugs, LayoutBlockResolver};
use crate::domain::model::{
    Article, ArticleQuery, BlockKind, Category, CategoryNewsMap, LayoutBlock,
};
use crate::domain::ports::ContentGateway;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Loadable<T> {
    Loading,
    Ready(T),
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            Loadable::Loading => None,
        }
    }
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Loading
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBlock {
    pub id: String,
    pub kind: BlockKind,
    pub category_slug: String,
    pub category: Option<Category>,
    pub order_position: i64,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeModel {
    pub hero: Loadable<Vec<Article>>,
    pub latest: Loadable<Vec<Article>>,
    pub trending: Loadable<Vec<Article>>,
    pub blocks: Loadable<Vec<RenderedBlock>>,
}

impl HomeModel {
    /// 任何一個來源尚未完成都算載入中
    pub fn is_loading(&self) -> bool {
        self.hero.is_loading()
            || self.latest.is_loading()
            || self.trending.is_loading()
            || self.blocks.is_loading()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeLimits {
    pub hero_count: usize,
    pub latest_count: usize,
    pub trending_count: usize,
}

impl Default for HomeLimits {
    fn default() -> Self {
        Self {
            hero_count: 5,
            latest_count: 10,
            trending_count: 5,
        }
    }
}

/// 依版位順序組出渲染用的區塊；分類資料缺漏時給空列表
pub fn assemble_blocks(blocks: &[LayoutBlock], news: &CategoryNewsMap) -> Vec<RenderedBlock> {
    active_in_order(blocks)
        .into_iter()
        .map(|block| {
            let articles = news.get(&block.category_slug).cloned().unwrap_or_default();
            let category = articles
                .iter()
                .filter_map(|a| a.category.as_ref())
                .find(|c| c.slug == block.category_slug)
                .cloned();
            RenderedBlock {
                id: block.id,
                kind: block.kind,
                category_slug: block.category_slug,
                category,
                order_position: block.order_position,
                articles,
            }
        })
        .collect()
}

/// 頭條：第一頁中標記為精選的文章，沒有精選時退回前幾篇
pub fn select_hero(articles: &[Article], count: usize) -> Vec<Article> {
    let featured: Vec<Article> = articles
        .iter()
        .filter(|a| a.featured)
        .take(count)
        .cloned()
        .collect();
    if featured.is_empty() {
        articles.iter().take(count).cloned().collect()
    } else {
        featured
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockUpdate {
    /// 版位沒有變化
    Unchanged,
    /// 只有順序或樣式變了，沿用現有的分類資料重新組裝
    Rearranged,
    /// 分類集合變了，重新抓取
    Resolved,
}

#[derive(Default)]
struct ResolvedLayout {
    blocks: Vec<LayoutBlock>,
    slugs: Vec<String>,
    news: Option<Arc<CategoryNewsMap>>,
}

pub struct HomeController<G: ContentGateway> {
    gateway: G,
    limits: HomeLimits,
    state: watch::Sender<HomeModel>,
    layout: Mutex<ResolvedLayout>,
}

impl<G: ContentGateway> HomeController<G> {
    pub fn new(gateway: G, limits: HomeLimits) -> Self {
        let (state, _) = watch::channel(HomeModel::default());
        Self {
            gateway,
            limits,
            state,
            layout: Mutex::new(ResolvedLayout::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeModel> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> HomeModel {
        self.state.borrow().clone()
    }

    /// 完整載入首頁：所有來源回到載入中，並行抓取，全部完成後回傳最終模型
    pub async fn load(&self, blocks: Vec<LayoutBlock>) -> HomeModel {
        tracing::info!("🏠 Loading home page ({} layout blocks)", blocks.len());
        self.state.send_replace(HomeModel::default());

        tokio::join!(
            self.load_front_page(),
            self.load_latest(),
            self.resolve_blocks(blocks, true),
        );

        let model = self.snapshot();
        tracing::info!(
            "✅ Home page ready: hero={}, latest={}, trending={}, blocks={}",
            model.hero.ready().map_or(0, Vec::len),
            model.latest.ready().map_or(0, Vec::len),
            model.trending.ready().map_or(0, Vec::len),
            model.blocks.ready().map_or(0, Vec::len)
        );
        model
    }

    /// 版位列表變動時呼叫；只有分類集合改變才會重新抓取
    pub async fn update_blocks(&self, blocks: Vec<LayoutBlock>) -> BlockUpdate {
        self.resolve_blocks(blocks, false).await
    }

    /// 頭條與熱門都來自 `/news` 第一頁，只請求一次
    async fn load_front_page(&self) {
        let page = or_empty(
            self.gateway.list_articles(&ArticleQuery::page(1)).await,
            "front page articles",
        );
        let hero = select_hero(&page.data, self.limits.hero_count);
        let trending: Vec<Article> = page
            .data
            .into_iter()
            .take(self.limits.trending_count)
            .collect();
        self.state.send_modify(|model| {
            model.hero = Loadable::Ready(hero);
            model.trending = Loadable::Ready(trending);
        });
    }

    async fn load_latest(&self) {
        let page = or_empty(self.gateway.latest_articles(1).await, "latest articles");
        let latest: Vec<Article> = page.data.into_iter().take(self.limits.latest_count).collect();
        self.state.send_modify(|model| model.latest = Loadable::Ready(latest));
    }

    async fn resolve_blocks(&self, blocks: Vec<LayoutBlock>, force: bool) -> BlockUpdate {
        let active = active_in_order(&blocks);
        let slugs = distinct_slugs(&active);
        let mut layout = self.layout.lock().await;

        if !force {
            if let Some(news) = layout.news.clone() {
                if layout.blocks == active {
                    return BlockUpdate::Unchanged;
                }
                if layout.slugs == slugs {
                    let rendered = assemble_blocks(&active, &news);
                    layout.blocks = active;
                    self.state
                        .send_modify(|model| model.blocks = Loadable::Ready(rendered));
                    tracing::debug!("Layout rearranged without refetching");
                    return BlockUpdate::Rearranged;
                }
            }
        }

        self.state.send_modify(|model| model.blocks = Loadable::Loading);
        let news = LayoutBlockResolver::new(&self.gateway)
            .resolve_slugs(&slugs)
            .await;
        let rendered = assemble_blocks(&active, &news);

        layout.blocks = active;
        layout.slugs = slugs;
        layout.news = Some(Arc::new(news));
        self.state
            .send_modify(|model| model.blocks = Loadable::Ready(rendered));
        BlockUpdate::Resolved
    }
}
