//! 定时提交调度器
//!
//! 后台任务，按固定间隔检查并执行到期的定时提交。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::services::ProblemPublisher;

pub struct Scheduler {
    publisher: Arc<ProblemPublisher>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(publisher: Arc<ProblemPublisher>, interval: Duration) -> Self {
        Self {
            publisher,
            interval,
        }
    }

    /// 执行一轮检查
    pub async fn tick(&self) -> usize {
        let now = chrono::Local::now().naive_local();
        match self.publisher.run_due_jobs(now).await {
            Ok(count) => count,
            Err(e) => {
                error!("❌ 读取定时任务失败: {}", e);
                0
            }
        }
    }

    /// 在后台循环运行
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("⏰ 调度器启动，每 {} 秒检查一次", self.interval.as_secs());
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }
}
