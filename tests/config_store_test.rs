use httpmock::prelude::*;
use portal_noticias::core::layout::LAYOUT_BLOCKS_KEY;
use portal_noticias::core::settings::{AdSlot, AD_SLOTS_KEY, WEATHER_SETTINGS_KEY};
use portal_noticias::core::ConfigStore;
use portal_noticias::domain::model::BlockKind;
use portal_noticias::{LayoutManager, RestConfigStore, Session, SettingsRepository};
use serde_json::json;
use std::time::Duration;

fn store(server: &MockServer) -> RestConfigStore {
    RestConfigStore::new(
        Session::new("http://api.invalid", format!("{}/", server.base_url())),
        "anon-key",
        "site_settings",
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_get_reads_value_column_with_api_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/site_settings")
                .query_param("key", "eq.weather_settings")
                .query_param("select", "value")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer anon-key");
            then.status(200).json_body(json!([
                {"value": {"enabled": true, "city": "Recife"}}
            ]));
        })
        .await;

    let value = store(&server).get(WEATHER_SETTINGS_KEY).await.unwrap();
    mock.assert_async().await;
    assert_eq!(value["city"], "Recife");
}

#[tokio::test]
async fn test_missing_row_and_read_failure_are_absent() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("key", "eq.html_blocks");
            then.status(200).json_body(json!([]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("key", "eq.ad_slots");
            then.status(500).body("boom");
        })
        .await;

    let store = store(&server);
    assert!(store.get("html_blocks").await.is_none());
    assert!(store.get("ad_slots").await.is_none());
}

#[tokio::test]
async fn test_signed_in_session_uses_user_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/site_settings")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer user-jwt");
            then.status(200).json_body(json!([{"value": 1}]));
        })
        .await;

    let store = store(&server);
    let session = Session::new("http://api.invalid", server.base_url());
    session.sign_in("user-jwt");
    let signed_in = RestConfigStore::new(session, "anon-key", "site_settings", Duration::from_secs(5))
        .unwrap();

    assert_eq!(signed_in.get("anything").await, Some(json!(1)));
    mock.assert_async().await;
    assert!(store.get("anything").await.is_none());
}

#[tokio::test]
async fn test_set_upserts_by_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/site_settings")
                .query_param("on_conflict", "key")
                .header("apikey", "anon-key")
                .header_exists("prefer")
                .body_contains("\"key\":\"frontend_settings\"")
                .body_contains("\"site_name\":\"Diário\"");
            then.status(201);
        })
        .await;

    store(&server)
        .set("frontend_settings", json!({"site_name": "Diário"}))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/site_settings");
            then.status(401).body("{\"message\":\"JWT expired\"}");
        })
        .await;

    let err = store(&server)
        .set("ad_slots", json!([]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_layout_manager_over_rest_store() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("key", "eq.layout_blocks");
            then.status(200).json_body(json!([{
                "value": [
                    {"id": "b1", "type": "section", "category_slug": "sports", "order_position": 3, "active": true},
                    {"id": "b0", "type": "carousel", "category_slug": "tech", "order_position": 1, "active": true}
                ]
            }]));
        })
        .await;
    let save = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/site_settings")
                .body_contains(format!("\"key\":\"{}\"", LAYOUT_BLOCKS_KEY))
                .body_contains("\"category_slug\":\"world\"");
            then.status(201);
        })
        .await;

    let manager = LayoutManager::new(store(&server));
    let listed = manager.list().await;
    assert_eq!(listed[0].id, "b0");
    assert_eq!(listed[1].id, "b1");

    let created = manager.create(BlockKind::Section, "World").await.unwrap();
    assert_eq!(created.category_slug, "world");
    assert_eq!(created.order_position, 2);
    save.assert_async().await;
}

#[tokio::test]
async fn test_settings_repository_over_rest_store() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("key", "eq.weather_settings");
            then.status(200)
                .json_body(json!([{"value": {"enabled": true, "city": ""}}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("key", "eq.frontend_settings");
            then.status(503);
        })
        .await;

    let settings = SettingsRepository::new(store(&server));
    assert!(settings.weather_settings().await.is_none());
    let frontend = settings.frontend_settings().await;
    assert_eq!(frontend.site_name, "Portal de Notícias");
    assert!(frontend.ticker_enabled);
}

#[tokio::test]
async fn test_admin_changes_refuse_to_write_after_failed_read() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/site_settings");
            then.status(503);
        })
        .await;
    let writes = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/site_settings");
            then.status(201);
        })
        .await;

    let manager = LayoutManager::new(store(&server));
    assert!(manager.create(BlockKind::Section, "world").await.is_err());
    assert!(manager.delete("b0").await.is_err());

    let settings = SettingsRepository::new(store(&server));
    let result = settings
        .upsert_item(
            AD_SLOTS_KEY,
            AdSlot {
                name: "Novo".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());

    writes.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_malformed_stored_row_is_not_overwritten() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("key", "eq.ad_slots");
            then.status(200).json_body(json!([{
                "value": [
                    {"id": "a1", "name": "Topo", "position": "header", "active": true},
                    {"id": "a2", "name": "Lateral", "position": "sidebar", "active": "yes"}
                ]
            }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("key", "eq.layout_blocks");
            then.status(200).json_body(json!([{
                "value": [
                    {"id": "b0", "type": "carousel", "category_slug": "tech"},
                    {"id": "b1", "type": "banner", "category_slug": "promo"}
                ]
            }]));
        })
        .await;
    let writes = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/site_settings");
            then.status(201);
        })
        .await;

    let settings = SettingsRepository::new(store(&server));
    let result = settings
        .upsert_item(
            AD_SLOTS_KEY,
            AdSlot {
                name: "Novo".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());

    let manager = LayoutManager::new(store(&server));
    assert!(manager.set_active("b0", false).await.is_err());

    writes.assert_hits_async(0).await;
}
