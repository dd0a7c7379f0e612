use serde::{Deserialize, Serialize};

/// 生成的题目草稿
///
/// `topic` 由生成器填入，LLM 只返回其余三个字段。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub solution: String,
}

/// 所有变更接口统一的响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `/generate` 表单
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateForm {
    pub belt: String,
    #[serde(default)]
    pub num_problems: Option<String>,
}

impl GenerateForm {
    /// 请求的题目数量，非法或缺省时为 1，并限制在 `1..=max`
    pub fn count(&self, max: usize) -> usize {
        self.num_problems
            .as_deref()
            .and_then(|n| n.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, max.max(1))
    }
}

/// 提交方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    Now,
    Schedule,
}

impl CommitAction {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("now") => Some(CommitAction::Now),
            Some("schedule") => Some(CommitAction::Schedule),
            _ => None,
        }
    }
}

/// `/commit` 表单
///
/// 同时接受旧版字段名 `problem_title` / `readme_content` / `solution_content`。
#[derive(Debug, Clone, Deserialize)]
pub struct CommitForm {
    pub belt: String,
    #[serde(alias = "problem_title")]
    pub title: String,
    #[serde(default)]
    pub topic: String,
    #[serde(alias = "readme_content", default)]
    pub readme: String,
    #[serde(alias = "solution_content", default)]
    pub solution: String,
    #[serde(default)]
    pub commit_action: Option<String>,
    #[serde(default)]
    pub schedule_time: Option<String>,
}

impl CommitForm {
    pub fn draft(&self) -> ProblemDraft {
        ProblemDraft {
            title: self.title.clone(),
            topic: self.topic.clone(),
            readme: self.readme.clone(),
            solution: self.solution.clone(),
        }
    }
}

/// `/delete` 表单
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteForm {
    pub belt: String,
    #[serde(alias = "problem_folder")]
    pub problem: String,
}
