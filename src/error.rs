use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::MessageBody;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// git 仓库操作错误
    #[error(transparent)]
    Git(#[from] GitError),
    /// LLM 服务错误
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error(transparent)]
    File(#[from] FileError),
    /// 业务逻辑错误
    #[error(transparent)]
    Business(#[from] BusinessError),
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// git 仓库操作错误
#[derive(Debug, Error)]
pub enum GitError {
    /// 无法启动 git 进程
    #[error("failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// git 命令返回非零状态
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API call failed (model: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 返回内容为空
    #[error("LLM returned empty content (model: {model})")]
    EmptyContent { model: String },
    /// 返回的 JSON 无法解析为题目
    #[error("LLM response is not a valid problem: {source}")]
    MalformedDraft {
        #[source]
        source: serde_json::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除失败
    #[error("failed to delete {path}: {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 序列化/反序列化失败
    #[error("invalid JSON in {path}: {source}")]
    JsonFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 课程大纲中不存在该段位
    #[error("Unknown belt: {0}")]
    UnknownBelt(String),
    /// 表单缺少字段或字段类型不符
    #[error("Invalid form: {0}")]
    InvalidForm(String),
    /// 表单字段取值非法
    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: String, value: String },
    /// 题目目录名非法
    #[error("Invalid problem folder: {0}")]
    InvalidFolder(String),
    /// 题目目录已存在
    #[error("Problem folder already exists: {0}")]
    FolderExists(String),
    /// 多次尝试后仍无法生成不重复的题目
    #[error("Could not generate a unique problem after several attempts. Please try again.")]
    GenerationExhausted,
    /// 定时提交缺少时间
    #[error("Error: Schedule time not provided.")]
    ScheduleTimeMissing,
    /// 定时提交时间格式错误
    #[error("Error: Invalid schedule time '{0}'.")]
    ScheduleTimeInvalid(String),
    /// 未知的提交动作
    #[error("Invalid action.")]
    InvalidAction,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 课程大纲解析失败
    #[error("invalid syllabus ({origin}): {source}")]
    SyllabusParseFailed {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    /// 课程大纲为空
    #[error("syllabus ({0}) defines no belts")]
    EmptySyllabus(String),
}

impl AppError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Business(BusinessError::GenerationExhausted) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Business(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    pub fn json_failed(path: impl Into<String>, source: serde_json::Error) -> Self {
        AppError::File(FileError::JsonFailed {
            path: path.into(),
            source,
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ 请求处理失败: {}", self);
        } else {
            tracing::warn!("⚠️ 请求被拒绝: {}", self);
        }
        (status, Json(MessageBody::new(self.to_string()))).into_response()
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
