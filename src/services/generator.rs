//! 不重复出题器 - 业务能力层
//!
//! 从段位大纲中挑选尚未用过的知识点，请作者（LLM）出题，
//! 标题与历史重复时重试。某段位的知识点全部用完后重置该段位的知识点历史。

use std::future::Future;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{error, info, warn};

use crate::error::AppResult;
use crate::models::{Belt, ProblemDraft};
use crate::services::HistoryStore;

/// 出题能力
///
/// 生产环境由 [`LlmService`](crate::services::LlmService) 实现，测试中可替换。
pub trait ProblemAuthor: Send + Sync {
    /// 为段位和知识点写一道题；返回的草稿 `topic` 字段应为传入的知识点
    fn draft(
        &self,
        belt: &str,
        topic: &str,
    ) -> impl Future<Output = anyhow::Result<ProblemDraft>> + Send;
}

pub struct ProblemGenerator<A> {
    author: A,
    history: Arc<HistoryStore>,
    attempts: usize,
}

impl<A: ProblemAuthor> ProblemGenerator<A> {
    pub fn new(author: A, history: Arc<HistoryStore>, attempts: usize) -> Self {
        Self {
            author,
            history,
            attempts: attempts.max(1),
        }
    }

    /// 生成一批题目；单道题生成失败时跳过，返回实际生成的题目
    pub async fn generate_batch(&self, belt: &Belt, count: usize) -> AppResult<Vec<ProblemDraft>> {
        let mut batch: Vec<ProblemDraft> = Vec::with_capacity(count);
        for index in 0..count {
            info!("[{}] 📝 生成第 {}/{} 道题", belt.name, index + 1, count);
            if let Some(draft) = self.generate_one(belt, &batch).await? {
                batch.push(draft);
            }
        }
        Ok(batch)
    }

    /// 生成一道标题不重复的题目
    ///
    /// `batch` 为本次请求中已经生成的题目，其标题同样视为已用，
    /// 其知识点在仍有其它可选知识点时不再重复挑选。
    pub async fn generate_one(
        &self,
        belt: &Belt,
        batch: &[ProblemDraft],
    ) -> AppResult<Option<ProblemDraft>> {
        let all_concepts = belt.concepts();
        if all_concepts.is_empty() {
            warn!("[{}] ⚠️ 段位没有任何知识点", belt.name);
            return Ok(None);
        }

        let belt_history = self.history.load().await.belt(&belt.name);
        let mut available: Vec<String> = all_concepts
            .iter()
            .filter(|c| !belt_history.topics.contains(c))
            .cloned()
            .collect();

        if available.is_empty() {
            info!("[{}] 知识点已全部用完，重置该段位的知识点历史", belt.name);
            self.history.reset_topics(&belt.name).await?;
            available = all_concepts;
        }

        let fresh: Vec<String> = available
            .iter()
            .filter(|c| !batch.iter().any(|d| &d.topic == *c))
            .cloned()
            .collect();
        if !fresh.is_empty() {
            available = fresh;
        }

        let used_titles: Vec<&str> = belt_history
            .titles
            .iter()
            .map(String::as_str)
            .chain(batch.iter().map(|d| d.title.as_str()))
            .collect();

        for attempt in 1..=self.attempts {
            let topic = match pick_topic(&available) {
                Some(topic) => topic,
                None => break,
            };
            info!(
                "[{}] 第 {}/{} 次尝试，知识点: {}",
                belt.name, attempt, self.attempts, topic
            );

            match self.author.draft(&belt.name, &topic).await {
                Ok(mut draft) => {
                    if used_titles.contains(&draft.title.as_str()) {
                        warn!("[{}] ⚠️ 标题重复: '{}'，重试", belt.name, draft.title);
                        continue;
                    }
                    info!("[{}] ✓ 生成不重复题目: '{}'", belt.name, draft.title);
                    draft.topic = topic;
                    return Ok(Some(draft));
                }
                Err(e) => {
                    error!("[{}] ❌ 第 {} 次生成失败: {}", belt.name, attempt, e);
                }
            }
        }

        error!(
            "[{}] ❌ {} 次尝试后仍无法生成不重复的题目",
            belt.name, self.attempts
        );
        Ok(None)
    }
}

fn pick_topic(available: &[String]) -> Option<String> {
    let mut rng = rand::thread_rng();
    available.choose(&mut rng).cloned()
}
