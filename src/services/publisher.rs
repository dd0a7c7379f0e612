//! 题目发布服务 - 流程层
//!
//! 把"提交 / 定时提交 / 删除"与生成历史、CSV 跟踪表串起来。
//! HTTP 接口和定时任务都通过这里操作仓库。

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use crate::error::{AppResult, BusinessError};
use crate::models::{parse_schedule_time, ProblemDraft, ScheduledJob};
use crate::services::{HistoryStore, JobStore, RepoService, TrackingAction, TrackingSheet};

pub struct ProblemPublisher {
    repo: RepoService,
    history: Arc<HistoryStore>,
    jobs: JobStore,
    sheet: TrackingSheet,
}

impl ProblemPublisher {
    pub fn new(
        repo: RepoService,
        history: Arc<HistoryStore>,
        jobs: JobStore,
        sheet: TrackingSheet,
    ) -> Self {
        Self {
            repo,
            history,
            jobs,
            sheet,
        }
    }

    pub fn repo(&self) -> &RepoService {
        &self.repo
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn sheet(&self) -> &TrackingSheet {
        &self.sheet
    }

    /// 立即提交，返回给用户的提示语
    pub async fn commit_now(&self, belt: &str, draft: &ProblemDraft) -> AppResult<String> {
        self.commit(belt, draft, true).await
    }

    async fn commit(&self, belt: &str, draft: &ProblemDraft, record_history: bool) -> AppResult<String> {
        match self.repo.commit_problem(belt, draft).await {
            Ok(committed) => {
                // 已推送成功，历史写入失败不影响结果
                if record_history {
                    if let Err(e) = self.history.record(belt, &draft.topic, &draft.title).await {
                        warn!("⚠️ 记录生成历史失败: {}", e);
                    }
                }
                self.sheet
                    .log(TrackingAction::Create, belt, &committed.folder, "Committed")
                    .await;
                Ok(format!(
                    "Successfully committed '{}' as problem #{}.",
                    draft.title, committed.number
                ))
            }
            Err(e) => {
                self.sheet
                    .log(TrackingAction::Create, belt, &draft.title, "Failed")
                    .await;
                Err(e)
            }
        }
    }

    /// 登记定时提交
    pub async fn schedule(
        &self,
        belt: &str,
        draft: &ProblemDraft,
        schedule_time: Option<&str>,
    ) -> AppResult<String> {
        let at = schedule_time
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(BusinessError::ScheduleTimeMissing)?;
        if parse_schedule_time(at).is_none() {
            return Err(BusinessError::ScheduleTimeInvalid(at.to_string()).into());
        }

        self.jobs.push(ScheduledJob::new(at, belt, draft)).await?;
        self.history.record(belt, &draft.topic, &draft.title).await?;
        self.sheet
            .log(TrackingAction::Schedule, belt, &draft.title, "Scheduled")
            .await;

        info!("⏰ 已登记定时提交 '{}' @ {}", draft.title, at);
        Ok(format!("Successfully scheduled '{}' for {}.", draft.title, at))
    }

    /// 删除题目目录
    pub async fn delete(&self, belt: &str, folder: &str) -> AppResult<String> {
        match self.repo.delete_problem(belt, folder).await {
            Ok(()) => {
                self.sheet
                    .log(TrackingAction::Delete, belt, folder, "Deleted")
                    .await;
                Ok(format!("Successfully deleted '{}'.", folder))
            }
            Err(e) => {
                self.sheet
                    .log(TrackingAction::Delete, belt, folder, "Failed")
                    .await;
                Err(e)
            }
        }
    }

    pub async fn list(&self, belt: &str) -> AppResult<Vec<String>> {
        self.repo.list_problems(belt).await
    }

    /// 执行所有到期的定时任务，返回成功提交的数量
    ///
    /// 历史已在登记时写入，这里不再重复记录。
    pub async fn run_due_jobs(&self, now: NaiveDateTime) -> AppResult<usize> {
        let due = self.jobs.take_due(now).await?;
        if due.is_empty() {
            return Ok(0);
        }

        info!("⏰ 发现 {} 个到期任务", due.len());
        let mut committed = 0;
        for job in due {
            info!("执行任务 {}: {}", job.id, job.title);
            match self.commit(&job.belt, &job.draft(), false).await {
                Ok(message) => {
                    info!("✓ {}", message);
                    committed += 1;
                }
                Err(e) => error!("❌ 任务 {} 执行失败: {}", job.id, e),
            }
        }
        Ok(committed)
    }
}
