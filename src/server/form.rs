//! 表单提取器
//!
//! 前端以 multipart 提交表单，命令行和脚本常用 urlencoded，这里两种都接受。

use std::collections::HashMap;

use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use crate::error::{AppResult, BusinessError};

/// 表单字段（同名字段保留最后一个）
#[derive(Debug, Clone, Default)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
    /// 转换为具体的表单结构
    pub fn parse<T: DeserializeOwned>(self) -> AppResult<T> {
        let value = serde_json::to_value(self.0)
            .map_err(|e| BusinessError::InvalidForm(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| BusinessError::InvalidForm(e.to_string()).into())
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(FormFields(fields));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let mut fields = HashMap::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let name = field.name().unwrap_or_default().to_string();
            let value = field.text().await.map_err(IntoResponse::into_response)?;
            fields.insert(name, value);
        }
        Ok(FormFields(fields))
    }
}
