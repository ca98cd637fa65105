use crate::domain::model::{BlockKind, LayoutBlock};
use crate::domain::normalize::{normalize_slug, parse_layout_blocks, try_parse_layout_blocks};
use crate::domain::ports::ConfigStore;
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::validate_slug;

pub const LAYOUT_BLOCKS_KEY: &str = "layout_blocks";

/// 依 order_position 穩定排序（同值保留原順序）
pub fn sort_by_position(blocks: &mut [LayoutBlock]) {
    blocks.sort_by_key(|b| b.order_position);
}

/// 首頁實際要渲染的版位：啟用、有分類、依位置排序
pub fn active_in_order(blocks: &[LayoutBlock]) -> Vec<LayoutBlock> {
    let mut active: Vec<LayoutBlock> = blocks
        .iter()
        .filter(|b| b.active && !b.category_slug.trim().is_empty())
        .cloned()
        .collect();
    sort_by_position(&mut active);
    active
}

/// 重新編號為 0..n，保持序列連續無缺口
pub fn renumber(blocks: &mut [LayoutBlock]) {
    for (position, block) in blocks.iter_mut().enumerate() {
        block.order_position = position as i64;
    }
}

/// 把指定版位移到 `position`（超出範圍時放到最後），其餘版位依序遞補
pub fn move_block(blocks: &mut Vec<LayoutBlock>, id: &str, position: usize) -> Result<()> {
    sort_by_position(blocks);
    let from = blocks
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| PortalError::not_found("Layout block", id))?;
    let block = blocks.remove(from);
    let to = position.min(blocks.len());
    blocks.insert(to, block);
    renumber(blocks);
    Ok(())
}

fn checked_slug(raw: &str) -> Result<String> {
    let slug = normalize_slug(raw);
    validate_slug("category_slug", &slug)?;
    Ok(slug)
}

/// 版位的管理端 CRUD；每次變更都重新編號並整批寫回設定儲存
pub struct LayoutManager<S: ConfigStore> {
    store: S,
}

impl<S: ConfigStore> LayoutManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<LayoutBlock> {
        let mut blocks = self
            .store
            .get(LAYOUT_BLOCKS_KEY)
            .await
            .map(|value| parse_layout_blocks(&value))
            .unwrap_or_default();
        sort_by_position(&mut blocks);
        blocks
    }

    pub async fn active(&self) -> Vec<LayoutBlock> {
        active_in_order(&self.list().await)
    }

    /// 變更前的讀取：讀取失敗或有無法辨識的列都回錯誤，不能當成空列表寫回
    async fn load_for_update(&self) -> Result<Vec<LayoutBlock>> {
        let mut blocks = match self.store.try_get(LAYOUT_BLOCKS_KEY).await? {
            Some(value) => try_parse_layout_blocks(&value)?,
            None => Vec::new(),
        };
        sort_by_position(&mut blocks);
        Ok(blocks)
    }

    pub async fn create(&self, kind: BlockKind, category_slug: &str) -> Result<LayoutBlock> {
        let category_slug = checked_slug(category_slug)?;
        let mut blocks = self.load_for_update().await?;
        renumber(&mut blocks);
        let block = LayoutBlock {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            category_slug,
            order_position: blocks.len() as i64,
            active: true,
        };
        blocks.push(block.clone());
        self.save(&mut blocks).await?;
        tracing::info!("➕ Layout block {} created for '{}'", block.id, block.category_slug);
        Ok(block)
    }

    pub async fn update(
        &self,
        id: &str,
        kind: Option<BlockKind>,
        category_slug: Option<&str>,
    ) -> Result<LayoutBlock> {
        let category_slug = category_slug.map(checked_slug).transpose()?;
        self.modify(id, |block| {
            if let Some(kind) = kind {
                block.kind = kind;
            }
            if let Some(slug) = category_slug {
                block.category_slug = slug;
            }
        })
        .await
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<LayoutBlock> {
        self.modify(id, |block| block.active = active).await
    }

    pub async fn move_to(&self, id: &str, position: usize) -> Result<Vec<LayoutBlock>> {
        let mut blocks = self.load_for_update().await?;
        move_block(&mut blocks, id, position)?;
        self.save(&mut blocks).await?;
        Ok(blocks)
    }

    pub async fn delete(&self, id: &str) -> Result<Vec<LayoutBlock>> {
        let mut blocks = self.load_for_update().await?;
        let before = blocks.len();
        blocks.retain(|b| b.id != id);
        if blocks.len() == before {
            return Err(PortalError::not_found("Layout block", id));
        }
        self.save(&mut blocks).await?;
        tracing::info!("🗑️ Layout block {} deleted", id);
        Ok(blocks)
    }

    async fn modify<F>(&self, id: &str, change: F) -> Result<LayoutBlock>
    where
        F: FnOnce(&mut LayoutBlock),
    {
        let mut blocks = self.load_for_update().await?;
        let block = blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| PortalError::not_found("Layout block", id))?;
        change(block);
        let updated = block.clone();
        self.save(&mut blocks).await?;
        Ok(updated)
    }

    async fn save(&self, blocks: &mut [LayoutBlock]) -> Result<()> {
        sort_by_position(blocks);
        renumber(blocks);
        let value = serde_json::to_value(&*blocks)?;
        self.store.set(LAYOUT_BLOCKS_KEY, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryConfigStore;
    use serde_json::json;

    fn block(id: &str, slug: &str, order: i64) -> LayoutBlock {
        LayoutBlock {
            id: id.to_string(),
            kind: BlockKind::Section,
            category_slug: slug.to_string(),
            order_position: order,
            active: true,
        }
    }

    fn ids(blocks: &[LayoutBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_active_in_order_sorts_ascending() {
        let blocks = vec![block("c", "x", 2), block("a", "y", 0), block("b", "z", 1)];
        assert_eq!(ids(&active_in_order(&blocks)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_active_in_order_is_stable_on_ties() {
        let blocks = vec![block("first", "x", 1), block("zero", "y", 0), block("second", "z", 1)];
        assert_eq!(ids(&active_in_order(&blocks)), vec!["zero", "first", "second"]);
    }

    #[test]
    fn test_active_in_order_drops_inactive_and_slugless() {
        let mut hidden = block("hidden", "x", 0);
        hidden.active = false;
        let blocks = vec![hidden, block("empty", "", 1), block("shown", "y", 2)];
        assert_eq!(ids(&active_in_order(&blocks)), vec!["shown"]);
    }

    #[test]
    fn test_move_block_renumbers_densely() {
        let mut blocks = vec![block("a", "x", 0), block("b", "y", 1), block("c", "z", 2)];
        move_block(&mut blocks, "c", 0).unwrap();
        assert_eq!(ids(&blocks), vec!["c", "a", "b"]);
        let positions: Vec<i64> = blocks.iter().map(|b| b.order_position).collect();
        assert_eq!(positions, vec![0, 1, 2]);

        move_block(&mut blocks, "c", 99).unwrap();
        assert_eq!(ids(&blocks), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_unknown_block() {
        let mut blocks = vec![block("a", "x", 0)];
        assert!(move_block(&mut blocks, "nope", 0).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_appends_and_persists() {
        let store = MemoryConfigStore::new();
        let manager = LayoutManager::new(store.clone());

        let first = manager.create(BlockKind::Carousel, "Tech").await.unwrap();
        let second = manager.create(BlockKind::Section, "sports").await.unwrap();

        assert_eq!(first.category_slug, "tech");
        assert_eq!(first.order_position, 0);
        assert_eq!(second.order_position, 1);

        let stored = store.get(LAYOUT_BLOCKS_KEY).await.unwrap();
        assert_eq!(stored.as_array().unwrap().len(), 2);
        assert_eq!(stored[0]["type"], "carousel");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_slug() {
        let manager = LayoutManager::new(MemoryConfigStore::new());
        assert!(manager.create(BlockKind::Section, "  ").await.is_err());
        assert!(manager.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_closes_gaps() {
        let store = MemoryConfigStore::new()
            .with_value(
                LAYOUT_BLOCKS_KEY,
                json!([
                    {"id": "a", "type": "section", "category_slug": "x", "order_position": 0, "active": true},
                    {"id": "b", "type": "section", "category_slug": "y", "order_position": 1, "active": true},
                    {"id": "c", "type": "carousel", "category_slug": "z", "order_position": 2, "active": true}
                ]),
            )
            .await;
        let manager = LayoutManager::new(store);

        let remaining = manager.delete("b").await.unwrap();
        assert_eq!(ids(&remaining), vec!["a", "c"]);
        assert_eq!(remaining[1].order_position, 1);
        assert!(manager.delete("b").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_toggle_and_update() {
        let manager = LayoutManager::new(MemoryConfigStore::new());
        let created = manager.create(BlockKind::Section, "economia").await.unwrap();

        let hidden = manager.set_active(&created.id, false).await.unwrap();
        assert!(!hidden.active);
        assert!(manager.active().await.is_empty());

        let updated = manager
            .update(&created.id, Some(BlockKind::Carousel), Some("Mundo"))
            .await
            .unwrap();
        assert_eq!(updated.kind, BlockKind::Carousel);
        assert_eq!(updated.category_slug, "mundo");
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn test_unreadable_store_blocks_every_mutation() {
        let store = MemoryConfigStore::unreadable()
            .with_value(
                LAYOUT_BLOCKS_KEY,
                json!([{"id": "a", "type": "section", "category_slug": "x", "order_position": 0, "active": true}]),
            )
            .await;
        let manager = LayoutManager::new(store.clone());

        assert!(manager.create(BlockKind::Section, "world").await.is_err());
        assert!(manager.delete("a").await.is_err());
        assert!(manager.set_active("a", false).await.is_err());
        assert!(manager.move_to("a", 3).await.is_err());

        let stored = store.snapshot(LAYOUT_BLOCKS_KEY).await.unwrap();
        assert_eq!(stored.as_array().unwrap().len(), 1);
        assert_eq!(stored[0]["id"], "a");
    }

    #[tokio::test]
    async fn test_unknown_row_is_not_erased_by_create() {
        let rows = json!([
            {"id": "a", "type": "section", "category_slug": "x", "order_position": 0, "active": true},
            {"id": "b", "type": "banner", "category_slug": "y", "order_position": 1, "active": true}
        ]);
        let store = MemoryConfigStore::new()
            .with_value(LAYOUT_BLOCKS_KEY, rows.clone())
            .await;
        let manager = LayoutManager::new(store.clone());

        // 前台照樣略過無法辨識的列
        assert_eq!(manager.list().await.len(), 1);

        let err = manager.create(BlockKind::Carousel, "tech").await.unwrap_err();
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Data);
        assert_eq!(store.snapshot(LAYOUT_BLOCKS_KEY).await, Some(rows));
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let manager = LayoutManager::new(MemoryConfigStore::read_only());
        let err = manager.create(BlockKind::Section, "tech").await.unwrap_err();
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Storage);
    }
}
