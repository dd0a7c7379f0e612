//! 工作台事件与副作用
//!
//! 用户操作和后台请求的结果都以 [`Event`] 的形式送入控制器，
//! 控制器返回需要执行的 [`Effect`]。

use std::time::Duration;

use crate::models::ProblemDraft;

use super::state::{RequestId, ReviewField};

/// 表单字段（按提交顺序）
pub type FormData = Vec<(String, String)>;

/// 后端接口的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply<T> {
    /// 2xx 且响应体可以解析
    Success(T),
    /// 网络错误、非 2xx 或响应体无法解析；`message` 为服务端返回的提示（若有）
    Failure { message: Option<String> },
}

impl<T> ApiReply<T> {
    pub fn failure() -> Self {
        ApiReply::Failure { message: None }
    }

    pub fn failure_with(message: impl Into<String>) -> Self {
        ApiReply::Failure {
            message: Some(message.into()),
        }
    }
}

/// 出题接口 2xx 时的响应体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateBody {
    /// 题目数组
    Problems(Vec<ProblemDraft>),
    /// 非数组的响应，可能带 `message`
    Notice(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// 点击某个标签，参数为标签声明的目标面板标识
    TabActivated(String),
    /// 提交出题表单
    GenerateSubmitted(FormData),
    GenerateFinished {
        request: RequestId,
        reply: ApiReply<GenerateBody>,
    },
    /// 在题目选择框中选中第 n 道题
    ProblemSelected(usize),
    ReviewEdited { field: ReviewField, value: String },
    CommitSubmitted,
    CommitFinished {
        request: RequestId,
        reply: ApiReply<String>,
    },
    /// 删除面板的段位选择变化
    DeleteBeltChanged(String),
    ProblemsLoaded {
        request: RequestId,
        reply: ApiReply<Vec<String>>,
    },
    DeleteProblemChosen(String),
    DeleteSubmitted,
    /// 用户对删除确认框的回答
    DeleteConfirmed(bool),
    DeleteFinished {
        request: RequestId,
        reply: ApiReply<String>,
    },
    /// 提示消息到期
    StatusExpired(u64),
}

/// 控制器要求外部执行的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST /generate
    Generate { request: RequestId, form: FormData },
    /// POST /commit
    Commit { request: RequestId, form: FormData },
    /// GET /problems/{belt}
    FetchProblems { request: RequestId, belt: String },
    /// 向用户确认删除，回答以 [`Event::DeleteConfirmed`] 返回
    ConfirmDelete { belt: String, problem: String },
    /// POST /delete
    Delete {
        request: RequestId,
        belt: String,
        problem: String,
    },
    /// 到期后送回 [`Event::StatusExpired`]
    ExpireStatus { id: u64, after: Duration },
}

/// 删除确认框的提示文字
pub fn confirm_prompt(belt: &str, problem: &str) -> String {
    format!(
        "Are you sure you want to permanently delete '{}' from {}?",
        problem, belt
    )
}
