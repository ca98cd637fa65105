use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 可重啟的輪播計時器（跑馬燈、輪播圖）。每個週期把索引往前推一格，
/// 停止或 drop 時中止背景 task，不會留下孤兒計時器。
pub struct RotationTimer {
    period: Duration,
    len: usize,
    index: Arc<watch::Sender<usize>>,
    handle: Option<JoinHandle<()>>,
}

impl RotationTimer {
    pub fn new(period: Duration, len: usize) -> Self {
        let (index, _) = watch::channel(0);
        Self {
            period,
            len,
            index: Arc::new(index),
            handle: None,
        }
    }

    pub fn current(&self) -> usize {
        *self.index.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.index.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 必須在 tokio runtime 內呼叫；已在執行或沒有項目時不做事
    pub fn start(&mut self) {
        if self.is_running() || self.len == 0 || self.period.is_zero() {
            return;
        }

        let index = Arc::clone(&self.index);
        let len = self.len;
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                interval.tick().await;
                index.send_modify(|i| *i = (*i + 1) % len);
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// 回到第一項並重新計時
    pub fn reset(&mut self) {
        self.stop();
        self.index.send_replace(0);
        self.start();
    }

    /// 項目數量改變時呼叫，例如新的頭條列表
    pub fn set_len(&mut self, len: usize) {
        let was_running = self.is_running();
        self.stop();
        self.len = len;
        if self.current() >= len {
            self.index.send_replace(0);
        }
        if was_running {
            self.start();
        }
    }
}

impl Drop for RotationTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
