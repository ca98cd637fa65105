use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_CATEGORY_COLOR: &str = "#333333";
pub const DEFAULT_CATEGORY_TEXT_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
    pub text_color: String,
    pub active: bool,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub body: String,
    pub featured_image: Option<String>,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// 列表渲染用的 key：slug 優先，id 不可靠（上游可能回 0）
    pub fn render_key(&self, index: usize) -> String {
        if self.slug.is_empty() {
            format!("#{}", index)
        } else {
            self.slug.clone()
        }
    }

    pub fn category_slug(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.slug.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Carousel,
    Section,
}

impl std::str::FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carousel" => Ok(BlockKind::Carousel),
            "section" => Ok(BlockKind::Section),
            other => Err(format!("unknown block type: {}", other)),
        }
    }
}

/// 首頁版位：持久化格式 `{ id, type, category_slug, order_position, active }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub category_slug: String,
    pub order_position: i64,
    pub active: bool,
}

/// 分頁結果；上游回傳裸陣列時視為單頁
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: 0,
            total: 0,
            data: Vec::new(),
        }
    }

    pub fn single(data: Vec<T>) -> Self {
        let len = data.len();
        Self {
            current_page: 1,
            last_page: 1,
            per_page: len as u32,
            total: len as u64,
            data,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 每個被引用的分類 slug 各一筆；抓取失敗的 slug 對應空列表
pub type CategoryNewsMap = HashMap<String, Vec<Article>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub page: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ArticleQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}
