//! 生成历史存储
//!
//! 只负责读写 `generation_history.json`，文件损坏时按空历史处理。

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::GenerationHistory;

pub struct HistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 读取历史；文件不存在或无法解析时返回空历史
    pub async fn load(&self) -> GenerationHistory {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// 追加一条已使用的知识点和标题
    pub async fn record(&self, belt: &str, topic: &str, title: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut history = self.read().await;
        history.record(belt, topic, title);
        self.write(&history).await?;
        debug!("记录生成历史: {} | {} | {}", belt, topic, title);
        Ok(())
    }

    /// 清空某段位的已用知识点
    pub async fn reset_topics(&self, belt: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut history = self.read().await;
        history.reset_topics(belt);
        self.write(&history).await
    }

    async fn read(&self) -> GenerationHistory {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(_) => return GenerationHistory::default(),
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("⚠️ 历史文件 {} 无法解析，按空历史处理: {}", self.path.display(), e);
            GenerationHistory::default()
        })
    }

    async fn write(&self, history: &GenerationHistory) -> AppResult<()> {
        let path = self.path.display().to_string();
        let json = serde_json::to_string_pretty(history)
            .map_err(|e| AppError::json_failed(path.clone(), e))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::file_write_failed(path, e))
    }
}
