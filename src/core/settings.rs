use crate::domain::ports::ConfigStore;
use crate::utils::error::{PortalError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// 每個功能自己擁有 key 與值的格式，生產端（管理後台）與消費端（前台）依約定共用
pub const HTML_BLOCKS_KEY: &str = "html_blocks";
pub const AD_SLOTS_KEY: &str = "ad_slots";
pub const VIDEO_SETTINGS_KEY: &str = "video_settings";
pub const WEATHER_SETTINGS_KEY: &str = "weather_settings";
pub const FRONTEND_SETTINGS_KEY: &str = "frontend_settings";

pub trait Identified {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlBlock {
    pub id: String,
    pub name: String,
    pub position: String,
    pub html: String,
    pub active: bool,
}

impl Identified for HtmlBlock {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdSlot {
    pub id: String,
    pub name: String,
    pub position: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub html: Option<String>,
    pub active: bool,
}

impl Identified for AdSlot {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub enabled: bool,
    pub title: String,
    pub videos: Vec<VideoItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub enabled: bool,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub units: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            city: String::new(),
            latitude: None,
            longitude: None,
            units: "metric".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendSettings {
    pub site_name: String,
    pub tagline: String,
    pub primary_color: String,
    pub ticker_enabled: bool,
    pub ticker_interval_seconds: u64,
    pub show_weather: bool,
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            site_name: "Portal de Notícias".to_string(),
            tagline: String::new(),
            primary_color: "#c4170c".to_string(),
            ticker_enabled: true,
            ticker_interval_seconds: 5,
            show_weather: false,
        }
    }
}

/// 有型別的設定存取；讀取失敗一律視為「未設定」，寫入失敗回報給呼叫端
pub struct SettingsRepository<S: ConfigStore> {
    store: S,
}

impl<S: ConfigStore> SettingsRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.get(key).await?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("⚠️ Setting '{}' has an unexpected shape: {}", key, e);
                None
            }
        }
    }

    pub async fn save<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.store.set(key, value).await
    }

    pub async fn list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.load(key).await.unwrap_or_default()
    }

    /// 寫回前的讀取：讀取或解碼失敗都要回錯誤，不能當成空列表覆寫
    async fn load_for_update<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.store.try_get(key).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                PortalError::malformed(format!("setting '{}' cannot be edited safely: {}", key, e))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// 依 id 新增或取代一筆；id 為空時自動產生
    pub async fn upsert_item<T>(&self, key: &str, mut item: T) -> Result<T>
    where
        T: Identified + Serialize + DeserializeOwned + Clone + Send + Sync,
    {
        if item.id().trim().is_empty() {
            item.set_id(uuid::Uuid::new_v4().to_string());
        }
        let mut items: Vec<T> = self.load_for_update(key).await?;
        match items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        self.save(key, &items).await?;
        Ok(item)
    }

    pub async fn remove_item<T>(&self, key: &str, id: &str) -> Result<Vec<T>>
    where
        T: Identified + Serialize + DeserializeOwned + Send + Sync,
    {
        let mut items: Vec<T> = self.load_for_update(key).await?;
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            return Err(PortalError::not_found(key, id));
        }
        self.save(key, &items).await?;
        Ok(items)
    }

    pub async fn html_blocks(&self, position: &str) -> Vec<HtmlBlock> {
        self.list::<HtmlBlock>(HTML_BLOCKS_KEY)
            .await
            .into_iter()
            .filter(|b| b.active && b.position == position)
            .collect()
    }

    pub async fn ads_for_position(&self, position: &str) -> Vec<AdSlot> {
        self.list::<AdSlot>(AD_SLOTS_KEY)
            .await
            .into_iter()
            .filter(|ad| ad.active && ad.position == position)
            .collect()
    }

    pub async fn video_settings(&self) -> Option<VideoSettings> {
        self.load::<VideoSettings>(VIDEO_SETTINGS_KEY)
            .await
            .filter(|v| v.enabled && !v.videos.is_empty())
    }

    /// 沒設定、設定錯誤或停用時不顯示天氣元件
    pub async fn weather_settings(&self) -> Option<WeatherSettings> {
        self.load::<WeatherSettings>(WEATHER_SETTINGS_KEY)
            .await
            .filter(|w| w.enabled && !w.city.trim().is_empty())
    }

    pub async fn frontend_settings(&self) -> FrontendSettings {
        self.load(FRONTEND_SETTINGS_KEY).await.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryConfigStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_settings_fall_back() {
        let repo = SettingsRepository::new(MemoryConfigStore::new());
        assert!(repo.weather_settings().await.is_none());
        assert!(repo.video_settings().await.is_none());
        assert_eq!(repo.frontend_settings().await, FrontendSettings::default());
        assert!(repo.ads_for_position("sidebar").await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_setting_is_treated_as_absent() {
        let store = MemoryConfigStore::new()
            .with_value(WEATHER_SETTINGS_KEY, json!("not an object"))
            .await;
        let repo = SettingsRepository::new(store);
        assert!(repo.weather_settings().await.is_none());
    }

    #[tokio::test]
    async fn test_weather_enabled_with_partial_fields() {
        let store = MemoryConfigStore::new()
            .with_value(WEATHER_SETTINGS_KEY, json!({"enabled": true, "city": "Lisboa"}))
            .await;
        let repo = SettingsRepository::new(store);
        let weather = repo.weather_settings().await.unwrap();
        assert_eq!(weather.city, "Lisboa");
        assert_eq!(weather.units, "metric");
    }

    #[tokio::test]
    async fn test_ad_crud() {
        let repo = SettingsRepository::new(MemoryConfigStore::new());

        let ad = repo
            .upsert_item(
                AD_SLOTS_KEY,
                AdSlot {
                    name: "Topo".to_string(),
                    position: "header".to_string(),
                    image_url: Some("https://cdn/banner.png".to_string()),
                    active: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!ad.id.is_empty());
        assert_eq!(repo.ads_for_position("header").await.len(), 1);

        let mut edited = ad.clone();
        edited.active = false;
        repo.upsert_item(AD_SLOTS_KEY, edited).await.unwrap();
        assert!(repo.ads_for_position("header").await.is_empty());
        assert_eq!(repo.list::<AdSlot>(AD_SLOTS_KEY).await.len(), 1);

        let remaining: Vec<AdSlot> = repo.remove_item(AD_SLOTS_KEY, &ad.id).await.unwrap();
        assert!(remaining.is_empty());
        assert!(repo
            .remove_item::<AdSlot>(AD_SLOTS_KEY, &ad.id)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_row_blocks_upsert() {
        let rows = json!([
            {"id": "a1", "name": "Topo", "position": "header", "active": true},
            {"id": "a2", "name": "Lateral", "position": "sidebar", "active": "yes"}
        ]);
        let store = MemoryConfigStore::new()
            .with_value(AD_SLOTS_KEY, rows.clone())
            .await;
        let repo = SettingsRepository::new(store.clone());

        let result = repo
            .upsert_item(
                AD_SLOTS_KEY,
                AdSlot {
                    name: "Novo".to_string(),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_err());
        assert!(repo.remove_item::<AdSlot>(AD_SLOTS_KEY, "a1").await.is_err());
        assert_eq!(store.snapshot(AD_SLOTS_KEY).await, Some(rows));
    }

    #[tokio::test]
    async fn test_unreadable_store_blocks_upsert() {
        let store = MemoryConfigStore::unreadable()
            .with_value(HTML_BLOCKS_KEY, json!([{"id": "1", "name": "Rodapé"}]))
            .await;
        let repo = SettingsRepository::new(store.clone());

        let result = repo
            .upsert_item(HTML_BLOCKS_KEY, HtmlBlock::default())
            .await;
        assert!(result.is_err());
        assert_eq!(
            store.snapshot(HTML_BLOCKS_KEY).await,
            Some(json!([{"id": "1", "name": "Rodapé"}]))
        );
    }

    #[tokio::test]
    async fn test_failed_save_surfaces_error() {
        let repo = SettingsRepository::new(MemoryConfigStore::read_only());
        let result = repo
            .save(FRONTEND_SETTINGS_KEY, &FrontendSettings::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_html_blocks_by_position() {
        let store = MemoryConfigStore::new()
            .with_value(
                HTML_BLOCKS_KEY,
                json!([
                    {"id": "1", "name": "Rodapé", "position": "footer", "html": "<p>x</p>", "active": true},
                    {"id": "2", "name": "Topo", "position": "header", "html": "<p>y</p>", "active": true},
                    {"id": "3", "name": "Old", "position": "footer", "html": "", "active": false}
                ]),
            )
            .await;
        let repo = SettingsRepository::new(store);
        let footer = repo.html_blocks("footer").await;
        assert_eq!(footer.len(), 1);
        assert_eq!(footer[0].name, "Rodapé");
    }
}
