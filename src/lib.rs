//! # DSA Problem Studio
//!
//! 生成、审核、提交和删除 DSA 练习题的工作台
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 题目草稿、表单、段位大纲、生成历史、定时任务
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `LlmService` - 让 LLM 写一道题
//! - `ProblemGenerator` - 挑选未用过的知识点，标题去重
//! - `RepoService` - 克隆 / 拉取 / 提交 / 推送题目仓库
//! - `HistoryStore` / `JobStore` / `TrackingSheet` - 本地 JSON 与 CSV 持久化
//!
//! ### ③ 发布层（Publishing）
//! - `ProblemPublisher` - 立即提交、定时提交、删除，并同步历史和跟踪表
//! - `Scheduler` - 后台执行到期的定时提交
//!
//! ### ④ 接口层（Server）
//! - `server/` - axum HTTP 接口
//!
//! ### ⑤ 工作台流程层（Workflow）
//! - `workflow/` - 出题 → 审核 → 提交 与 段位 → 题目 → 删除 的客户端状态机
//! - `Controller` - 纯状态转换
//! - `Session` - 执行网络请求、确认框和提示消息定时器
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ProblemDraft, Syllabus};
pub use services::{ProblemAuthor, ProblemGenerator, ProblemPublisher};
pub use workflow::{Controller, Event, Session};
