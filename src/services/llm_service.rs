//! LLM 服务 - 业务能力层
//!
//! 只负责"让 LLM 写一道题"的能力，不关心去重和流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::models::ProblemDraft;
use crate::services::generator::ProblemAuthor;
use crate::utils::truncate_text;

const SYSTEM_PROMPT: &str = "You are an expert DSA problem designer and a senior software engineer. \
You write high-quality, educational problems with complete, runnable reference solutions \
for a programming tutorial website. You always answer with a single JSON object and nothing else.";

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 生成单道题目
/// - 解析 LLM 返回的 JSON
/// - 不关心历史、去重和重试
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

/// LLM 返回的题目字段（不含 topic）
#[derive(Debug, Deserialize)]
struct GeneratedProblem {
    title: String,
    readme: String,
    solution: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（去掉首尾空白）
    pub async fn send_to_llm(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.9)
            .max_tokens(8192u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::ApiCallFailed {
                model: self.model_name.clone(),
                message: e.to_string(),
            }
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 为指定段位和知识点生成一道题
    pub async fn draft_problem(&self, belt: &str, topic: &str) -> Result<ProblemDraft> {
        let prompt = build_problem_prompt(belt, topic);
        let response = self.send_to_llm(&prompt, Some(SYSTEM_PROMPT)).await?;
        debug!("LLM 响应预览: {}", truncate_text(&response, 120));
        let draft = parse_problem_response(&response, topic)?;
        Ok(draft)
    }
}

impl ProblemAuthor for LlmService {
    async fn draft(&self, belt: &str, topic: &str) -> Result<ProblemDraft> {
        self.draft_problem(belt, topic).await
    }
}

/// 构建出题 prompt
fn build_problem_prompt(belt: &str, topic: &str) -> String {
    format!(
        r#"Create one DSA practice problem on the topic "{topic}" for a {belt} student.
Answer with a JSON object with exactly three string keys: "title", "readme" and "solution".

"title":
- A short, precise and original problem title about "{topic}".

"readme":
- Markdown with these H3 sections in this order: `### Description`, `### Constraints`, `### Example`, `### Concepts Covered`.
- `### Concepts Covered` is a bullet list of the syllabus concepts the solution relies on.

"solution":
- Markdown starting with `# Solutions for <title>` followed by `### Approach`.
- The approach paragraph explains the algorithm, the data structures used and the time/space complexity.
- Then five sections in this order: `## C Solution`, `## C++ Solution`, `## Java Solution`, `## Python Solution`, `## JavaScript Solution`.
- Each section holds exactly one fenced code block tagged with its language (c, cpp, java, python, javascript).

Code rules:
- Every program is complete and runnable; no placeholders.
- The problem-solving logic lives in its own function.
- `main` (or the top level) only reads stdin, calls that function and prints the result to stdout.
"#
    )
}

/// 解析 LLM 返回的题目 JSON
///
/// LLM 经常把 JSON 包在 ```json 代码块里，这里先去掉代码块标记。
fn parse_problem_response(response: &str, topic: &str) -> std::result::Result<ProblemDraft, LlmError> {
    let cleaned = strip_code_fences(response);
    let generated: GeneratedProblem = serde_json::from_str(&cleaned)
        .map_err(|source| LlmError::MalformedDraft { source })?;

    Ok(ProblemDraft {
        title: generated.title.trim().to_string(),
        topic: topic.to_string(),
        readme: generated.readme,
        solution: generated.solution,
    })
}

fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();
    match Regex::new(r"(?s)^```(?:json)?\s*(.*?)\s*```$") {
        Ok(re) => re
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| trimmed.to_string()),
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let response = r####"{"title": " Sum It Up ", "readme": "### Description", "solution": "# Solutions for Sum It Up"}"####;
        let draft = parse_problem_response(response, "Input/Output").unwrap();
        assert_eq!(draft.title, "Sum It Up");
        assert_eq!(draft.topic, "Input/Output");
        assert_eq!(draft.readme, "### Description");
    }

    #[test]
    fn test_parse_fenced_json_keeps_inner_code_blocks() {
        let response = "```json\n{\"title\": \"T\", \"readme\": \"r\", \"solution\": \"```c\\nint main(){}\\n```\"}\n```";
        let draft = parse_problem_response(response, "Loops (for, while)").unwrap();
        assert_eq!(draft.title, "T");
        assert_eq!(draft.solution, "```c\nint main(){}\n```");
    }

    #[test]
    fn test_parse_rejects_missing_keys() {
        let err = parse_problem_response(r#"{"title": "only"}"#, "x").unwrap_err();
        assert!(matches!(err, LlmError::MalformedDraft { .. }));
    }

    #[test]
    fn test_prompt_mentions_topic_and_belt() {
        let prompt = build_problem_prompt("Blue Belt", "Trie for string prefix search");
        assert!(prompt.contains("Trie for string prefix search"));
        assert!(prompt.contains("Blue Belt"));
    }

    /// 测试真实 LLM 出题
    #[tokio::test]
    #[ignore]
    async fn test_draft_problem_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = LlmService::new(&Config::from_env());
        let draft = service
            .draft_problem("White Belt", "Prime Check")
            .await
            .expect("LLM 出题失败");

        println!("标题: {}", draft.title);
        assert!(!draft.title.is_empty());
        assert!(draft.readme.contains("### Description"));
    }
}
