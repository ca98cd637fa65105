use std::sync::{Arc, RwLock};

/// 明確傳遞的連線上下文：取代全域的 API client 與存在 local storage 的 token。
/// clone 之後共用同一個 token，登入登出對所有持有者立即可見。
#[derive(Debug, Clone)]
pub struct Session {
    gateway_base_url: String,
    store_base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new(gateway_base_url: impl Into<String>, store_base_url: impl Into<String>) -> Self {
        Self {
            gateway_base_url: gateway_base_url.into().trim_end_matches('/').to_string(),
            store_base_url: store_base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn gateway_base_url(&self) -> &str {
        &self.gateway_base_url
    }

    pub fn store_base_url(&self) -> &str {
        &self.store_base_url
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
            tracing::debug!("Session token set");
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
            tracing::debug!("Session token cleared");
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}
