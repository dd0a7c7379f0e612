//! 定时任务存储
//!
//! `scheduled_jobs.json` 中保存尚未执行的定时提交任务。

use std::path::PathBuf;

use chrono::NaiveDateTime;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::ScheduledJob;

pub struct JobStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn push(&self, job: ScheduledJob) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.read().await;
        jobs.push(job);
        self.write(&jobs).await
    }

    pub async fn pending(&self) -> Vec<ScheduledJob> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// 取出所有到期任务，未到期任务写回文件
    pub async fn take_due(&self, now: NaiveDateTime) -> AppResult<Vec<ScheduledJob>> {
        let _guard = self.lock.lock().await;
        let jobs = self.read().await;
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        let (due, pending): (Vec<_>, Vec<_>) = jobs.into_iter().partition(|j| j.is_due(now));
        if !due.is_empty() {
            self.write(&pending).await?;
        }
        Ok(due)
    }

    async fn read(&self) -> Vec<ScheduledJob> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("⚠️ 任务文件 {} 无法解析，按空列表处理: {}", self.path.display(), e);
            Vec::new()
        })
    }

    async fn write(&self, jobs: &[ScheduledJob]) -> AppResult<()> {
        let path = self.path.display().to_string();
        let json =
            serde_json::to_string_pretty(jobs).map_err(|e| AppError::json_failed(path.clone(), e))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::file_write_failed(path, e))
    }
}
