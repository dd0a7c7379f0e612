use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::models::Syllabus;
use crate::server::{self, AppState};
use crate::services::{
    HistoryStore, JobStore, LlmService, ProblemGenerator, ProblemPublisher, RepoService, Scheduler,
    TrackingSheet,
};
use crate::utils::logging::{log_shutdown, log_startup};

/// 应用主结构
pub struct App {
    config: Config,
    state: Arc<AppState<LlmService>>,
}

impl App {
    /// 初始化应用：加载大纲，组装各个服务
    pub async fn initialize(config: Config) -> Result<Self> {
        let syllabus = Syllabus::from_config(config.syllabus_file.as_deref()).await?;
        log_startup(&config, &syllabus.belt_names());

        let history = Arc::new(HistoryStore::new(&config.history_file));
        let generator = ProblemGenerator::new(
            LlmService::new(&config),
            Arc::clone(&history),
            config.generation_attempts,
        );
        let publisher = Arc::new(ProblemPublisher::new(
            RepoService::new(&config),
            history,
            JobStore::new(&config.scheduled_jobs_file),
            TrackingSheet::new(&config.tracking_sheet_file),
        ));

        let state = Arc::new(AppState {
            syllabus,
            generator,
            publisher,
            max_problems_per_request: config.max_problems_per_request,
        });

        Ok(Self { config, state })
    }

    /// 启动定时提交调度器和 HTTP 服务，直到服务退出
    pub async fn run(&self) -> Result<()> {
        let pending = self.state.publisher.jobs().pending().await.len();
        if pending > 0 {
            info!("📋 有 {} 个待执行的定时提交", pending);
        }

        let scheduler = Scheduler::new(
            Arc::clone(&self.state.publisher),
            Duration::from_secs(self.config.scheduler_interval_secs),
        )
        .spawn();

        let result = server::serve(&self.config.bind_addr, Arc::clone(&self.state)).await;

        scheduler.abort();
        log_shutdown();
        result
    }
}
