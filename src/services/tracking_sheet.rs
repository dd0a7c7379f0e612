//! CSV 跟踪表 - 业务能力层
//!
//! 每次提交、定时、删除都追加一行，表头为
//! `timestamp,action,belt,problem,status`。

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

const HEADER: &str = "timestamp,action,belt,problem,status";

/// 跟踪表中的操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingAction {
    Create,
    Schedule,
    Delete,
}

impl TrackingAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackingAction::Create => "CREATE",
            TrackingAction::Schedule => "SCHEDULE",
            TrackingAction::Delete => "DELETE",
        }
    }
}

/// 跟踪表中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRow {
    pub timestamp: String,
    pub action: String,
    pub belt: String,
    pub problem: String,
    pub status: String,
}

pub struct TrackingSheet {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TrackingSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 追加一行记录，文件不存在时先写表头
    pub async fn append(
        &self,
        action: TrackingAction,
        belt: &str,
        problem: &str,
        status: &str,
    ) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let path = self.path.display().to_string();
        let is_new = tokio::fs::metadata(&self.path).await.is_err();

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| AppError::file_write_failed(path.clone(), e))?;

        let mut text = String::new();
        if is_new {
            text.push_str(HEADER);
            text.push('\n');
        }
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let fields = [timestamp.as_str(), action.as_str(), belt, problem, status];
        text.push_str(
            &fields
                .iter()
                .map(|f| escape_field(f))
                .collect::<Vec<_>>()
                .join(","),
        );
        text.push('\n');

        file.write_all(text.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(path, e))?;

        debug!("跟踪表追加: {} | {} | {} | {}", action.as_str(), belt, problem, status);
        Ok(())
    }

    /// 记录一行，失败只打警告，不影响主流程
    pub async fn log(&self, action: TrackingAction, belt: &str, problem: &str, status: &str) {
        if let Err(e) = self.append(action, belt, problem, status).await {
            warn!("⚠️ 写入跟踪表失败: {}", e);
        }
    }

    /// 读取全部数据行（不含表头）
    pub async fn rows(&self) -> AppResult<Vec<TrackingRow>> {
        let _guard = self.lock.lock().await;
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::file_read_failed(self.path.display().to_string(), e)),
        };

        Ok(parse_records(&content)
            .into_iter()
            .skip(1)
            .filter_map(|mut fields| {
                if fields.len() != 5 {
                    return None;
                }
                let status = fields.pop()?;
                let problem = fields.pop()?;
                let belt = fields.pop()?;
                let action = fields.pop()?;
                let timestamp = fields.pop()?;
                Some(TrackingRow {
                    timestamp,
                    action,
                    belt,
                    problem,
                    status,
                })
            })
            .collect())
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// 解析 CSV 文本（支持引号字段和字段内换行）
fn parse_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => record.push(std::mem::take(&mut field)),
            ('\r', false) => {}
            ('\n', false) => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            (c, _) => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
