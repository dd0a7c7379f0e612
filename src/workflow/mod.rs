//! 工作台流程层
//!
//! 出题 → 审核 → 提交，以及 段位 → 题目 → 删除 的级联操作。
//! [`Controller`] 是纯状态机，[`Session`] 负责执行它产生的副作用。

pub mod controller;
pub mod event;
pub mod http_backend;
pub mod session;
pub mod state;

pub use controller::{Controller, DEFAULT_STATUS_DURATION};
pub use event::{confirm_prompt, ApiReply, Effect, Event, FormData, GenerateBody};
pub use http_backend::HttpBackend;
pub use session::{Backend, Confirm, Session};
pub use state::{
    Panel, ProblemLookup, RequestId, ReviewField, ReviewForm, SelectOption, StatusKind, UiState,
};
