//! 通过 HTTP 调用出题服务的后端实现

use reqwest::multipart::Form;
use reqwest::{Client, Response, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{MessageBody, ProblemDraft};

use super::event::{ApiReply, FormData, GenerateBody};
use super::session::Backend;

pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// `base_url` 形如 `http://127.0.0.1:5000`
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Some(url)
    }

    /// GET /belts
    pub async fn belts(&self) -> anyhow::Result<Vec<String>> {
        let url = self
            .endpoint(&["belts"])
            .ok_or_else(|| anyhow::anyhow!("invalid base url: {}", self.base_url))?;
        let belts = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<String>>()
            .await?;
        Ok(belts)
    }

    async fn post_form(&self, path: &str, form: FormData) -> Option<Response> {
        let url = self.endpoint(&[path])?;
        let multipart = form
            .into_iter()
            .fold(Form::new(), |multipart, (key, value)| multipart.text(key, value));

        debug!("POST {}", url);
        match self.client.post(url).multipart(multipart).send().await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("⚠️ 请求 /{} 失败: {}", path, e);
                None
            }
        }
    }

    async fn message_reply(&self, path: &str, form: FormData) -> ApiReply<String> {
        let Some(response) = self.post_form(path, form).await else {
            return ApiReply::failure();
        };
        let ok = response.status().is_success();
        let message = response.json::<MessageBody>().await.ok().map(|body| body.message);
        match (ok, message) {
            (true, Some(message)) => ApiReply::Success(message),
            (_, message) => ApiReply::Failure { message },
        }
    }
}

impl Backend for HttpBackend {
    async fn generate(&self, form: FormData) -> ApiReply<GenerateBody> {
        let Some(response) = self.post_form("generate", form).await else {
            return ApiReply::failure();
        };
        if !response.status().is_success() {
            warn!("⚠️ 出题接口返回 {}", response.status());
            return ApiReply::failure();
        }
        match response.json::<Value>().await {
            Ok(body) => ApiReply::Success(parse_generate_body(body)),
            Err(e) => {
                warn!("⚠️ 出题响应不是 JSON: {}", e);
                ApiReply::failure()
            }
        }
    }

    async fn commit(&self, form: FormData) -> ApiReply<String> {
        self.message_reply("commit", form).await
    }

    async fn problems(&self, belt: String) -> ApiReply<Vec<String>> {
        let Some(url) = self.endpoint(&["problems", &belt]) else {
            return ApiReply::failure();
        };
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("⚠️ 查询 {} 的题目失败: {}", belt, e);
                return ApiReply::failure();
            }
        };
        if !response.status().is_success() {
            let message = response.json::<MessageBody>().await.ok().map(|b| b.message);
            return ApiReply::Failure { message };
        }
        match response.json::<Vec<String>>().await {
            Ok(names) => ApiReply::Success(names),
            Err(_) => ApiReply::failure(),
        }
    }

    async fn delete(&self, belt: String, problem: String) -> ApiReply<String> {
        let form = vec![("belt".to_string(), belt), ("problem".to_string(), problem)];
        self.message_reply("delete", form).await
    }
}

/// 2xx 的出题响应：数组按题目解析，否则取 `message`
pub fn parse_generate_body(body: Value) -> GenerateBody {
    match body {
        Value::Array(items) => GenerateBody::Problems(
            items
                .into_iter()
                .map(|item| serde_json::from_value::<ProblemDraft>(item).unwrap_or_default())
                .collect(),
        ),
        other => GenerateBody::Notice(
            other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
    }
}
