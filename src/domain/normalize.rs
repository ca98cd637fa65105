//! 上游資料的唯一解析邊界。
//!
//! 新聞 API 的欄位型別並不穩定（id 可能是字串、顏色可能缺漏、回應可能是裸陣列
//! 也可能是分頁信封），所有防禦性判斷都集中在這裡，下游只接觸型別完整的值。

use crate::domain::model::{
    Article, BlockKind, Category, LayoutBlock, Page, Tag, DEFAULT_CATEGORY_COLOR,
    DEFAULT_CATEGORY_TEXT_COLOR,
};
use crate::utils::error::{PortalError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;

/// slug 在進入系統時統一正規化（去空白、轉小寫），讀取端不再做大小寫比對
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn field<'a>(obj: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

fn as_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn as_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn as_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().map(|i| i != 0).unwrap_or(default),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => default,
        },
        _ => default,
    }
}

fn as_non_empty(value: Option<&Value>, default: &str) -> String {
    let s = as_string(value);
    if s.trim().is_empty() {
        default.to_string()
    } else {
        s
    }
}

fn as_datetime(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = value?.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn parse_category(value: &Value) -> Option<Category> {
    match value {
        Value::Object(_) => Some(Category {
            id: as_i64(field(value, &["id"])),
            name: as_string(field(value, &["name"])),
            slug: normalize_slug(&as_string(field(value, &["slug"]))),
            description: as_string(field(value, &["description"])),
            color: as_non_empty(field(value, &["color"]), DEFAULT_CATEGORY_COLOR),
            text_color: as_non_empty(field(value, &["text_color"]), DEFAULT_CATEGORY_TEXT_COLOR),
            active: as_bool(field(value, &["is_active", "active"]), true),
            order: as_i64(field(value, &["order", "display_order"])),
        }),
        // 部分舊資料只給分類名稱字串
        Value::String(name) if !name.trim().is_empty() => Some(Category {
            id: 0,
            name: name.clone(),
            slug: normalize_slug(name),
            description: String::new(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            text_color: DEFAULT_CATEGORY_TEXT_COLOR.to_string(),
            active: true,
            order: 0,
        }),
        _ => None,
    }
}

fn parse_tag(value: &Value) -> Option<Tag> {
    match value {
        Value::Object(_) => Some(Tag {
            id: as_i64(field(value, &["id"])),
            name: as_string(field(value, &["name"])),
            slug: normalize_slug(&as_string(field(value, &["slug"]))),
        }),
        Value::String(name) => Some(Tag {
            id: 0,
            name: name.clone(),
            slug: normalize_slug(name),
        }),
        _ => None,
    }
}

pub fn parse_article(value: &Value) -> Option<Article> {
    if !value.is_object() {
        return None;
    }

    let tags = match field(value, &["tags"]) {
        Some(Value::Array(items)) => items.iter().filter_map(parse_tag).collect(),
        _ => Vec::new(),
    };

    let featured_image = field(value, &["featured_image", "image", "image_url"])
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(Article {
        id: as_i64(field(value, &["id"])),
        title: as_string(field(value, &["title"])),
        slug: as_string(field(value, &["slug"])).trim().to_string(),
        excerpt: as_string(field(value, &["excerpt", "summary"])),
        body: as_string(field(value, &["content", "body"])),
        featured_image,
        category: field(value, &["category"]).and_then(parse_category),
        tags,
        featured: as_bool(field(value, &["is_featured", "featured"]), false),
        published_at: as_datetime(field(value, &["published_at", "created_at"])),
    })
}

/// 同一批資料內以 slug 去重（先出現者保留）；沒有 slug 的文章不參與去重
pub fn dedupe_by_slug(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| a.slug.is_empty() || seen.insert(a.slug.clone()))
        .collect()
}

pub fn parse_articles(items: &[Value]) -> Vec<Article> {
    let parsed: Vec<Article> = items.iter().filter_map(parse_article).collect();
    if parsed.len() < items.len() {
        tracing::debug!(
            "Dropped {} non-object article records",
            items.len() - parsed.len()
        );
    }
    dedupe_by_slug(parsed)
}

fn page_number(value: Option<&Value>, default: u32) -> u32 {
    match as_i64(value) {
        n if n > 0 => u32::try_from(n).unwrap_or(default),
        _ => default,
    }
}

/// 同時接受裸陣列與 `{ current_page, data, last_page, per_page, total }` 信封
pub fn parse_article_page(payload: &Value) -> Result<Page<Article>> {
    match payload {
        Value::Array(items) => Ok(Page::single(parse_articles(items))),
        Value::Object(_) => match payload.get("data") {
            Some(Value::Array(items)) => {
                let data = parse_articles(items);
                let len = data.len();
                let total = match as_i64(payload.get("total")) {
                    n if n > 0 => n as u64,
                    _ => len as u64,
                };
                Ok(Page {
                    current_page: page_number(payload.get("current_page"), 1),
                    last_page: page_number(payload.get("last_page"), 1),
                    per_page: page_number(payload.get("per_page"), len as u32),
                    total,
                    data,
                })
            }
            _ => Err(PortalError::malformed(
                "expected an article list or a paginated envelope",
            )),
        },
        _ => Err(PortalError::malformed(
            "expected an article list or a paginated envelope",
        )),
    }
}

pub fn parse_category_list(payload: &Value) -> Result<Vec<Category>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(_) => match payload.get("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(PortalError::malformed("expected a category list")),
        },
        _ => return Err(PortalError::malformed("expected a category list")),
    };

    let mut seen = HashSet::new();
    Ok(items
        .iter()
        .filter(|v| v.is_object())
        .filter_map(parse_category)
        .filter(|c| seen.insert(c.slug.clone()))
        .collect())
}

/// 單篇文章：`{ data: {...} }` 或直接物件；沒有文章內容時視為不存在
pub fn parse_article_detail(payload: &Value, slug: &str) -> Result<Article> {
    let candidate = match payload.get("data") {
        Some(inner @ Value::Object(_)) => inner,
        Some(Value::Null) => return Err(PortalError::not_found("Article", slug)),
        Some(_) => return Err(PortalError::malformed("article detail has a non-object data field")),
        None => payload,
    };

    match candidate {
        Value::Object(map) if map.is_empty() => Err(PortalError::not_found("Article", slug)),
        Value::Object(_) => parse_article(candidate)
            .filter(|a| !a.slug.is_empty() || !a.title.is_empty())
            .ok_or_else(|| PortalError::not_found("Article", slug)),
        Value::Null => Err(PortalError::not_found("Article", slug)),
        _ => Err(PortalError::malformed("article detail is not an object")),
    }
}

fn parse_layout_block(index: usize, item: &Value) -> Result<LayoutBlock> {
    if !item.is_object() {
        return Err(PortalError::malformed(format!(
            "layout block #{} is not an object",
            index
        )));
    }
    let kind = as_string(field(item, &["type", "kind"]))
        .parse::<BlockKind>()
        .map_err(|e| PortalError::malformed(format!("layout block #{}: {}", index, e)))?;
    let id = match as_string(field(item, &["id"])) {
        id if id.is_empty() => format!("block-{}", index),
        id => id,
    };
    Ok(LayoutBlock {
        id,
        kind,
        category_slug: normalize_slug(&as_string(field(item, &["category_slug"]))),
        order_position: match field(item, &["order_position", "order"]) {
            Some(v) => as_i64(Some(v)),
            None => index as i64,
        },
        active: as_bool(field(item, &["active", "is_active"]), true),
    })
}

/// 解析設定表中的版位列表（前台用）；無法辨識的項目略過並記錄
pub fn parse_layout_blocks(value: &Value) -> Vec<LayoutBlock> {
    let Value::Array(items) = value else {
        tracing::warn!("⚠️ layout_blocks setting is not an array, ignoring it");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match parse_layout_block(index, item) {
            Ok(block) => Some(block),
            Err(e) => {
                tracing::warn!("⚠️ Skipping {}", e);
                None
            }
        })
        .collect()
}

/// 管理端寫回前的嚴格解析：任何一列無法辨識就整批失敗，避免寫回時把它抹掉
pub fn try_parse_layout_blocks(value: &Value) -> Result<Vec<LayoutBlock>> {
    let Value::Array(items) = value else {
        return Err(PortalError::malformed("layout_blocks setting is not an array"));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_layout_block(index, item))
        .collect()
}
