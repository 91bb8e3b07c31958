//! 模型信息查询 - 业务能力层
//!
//! 向平台 API 请求单个模型的 JSON 信息

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, Result};

/// 查询结果：能解析为 JSON 则为 Json，否则保留原文
#[derive(Debug, Clone, PartialEq)]
pub enum ModelInfo {
    Json(JsonValue),
    Text(String),
}

impl ModelInfo {
    /// 根据响应正文构建
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => ModelInfo::Json(value),
            Err(_) => ModelInfo::Text(body),
        }
    }

    /// 格式化输出，JSON 使用 4 空格缩进
    pub fn pretty(&self) -> String {
        match self {
            ModelInfo::Json(value) => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
                match serde::Serialize::serialize(value, &mut ser) {
                    Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
                    Err(_) => value.to_string(),
                }
            }
            ModelInfo::Text(text) => text.clone(),
        }
    }

    /// 模型数据位于顶层 `data` 键下
    pub fn data(&self) -> Option<&JsonValue> {
        match self {
            ModelInfo::Json(value) => value.get("data").filter(|v| !v.is_null()),
            ModelInfo::Text(_) => None,
        }
    }
}

/// 模型 API 客户端
pub struct ModelApi {
    client: reqwest::Client,
    base_url: String,
}

impl ModelApi {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            "x-api-version",
            HeaderValue::from_str(&config.api_version)
                .map_err(|e| AppError::Config(format!("无效的 API 版本号: {}", e)))?,
        );
        if let Ok(referer) = HeaderValue::from_str(&config.link_base_url) {
            headers.insert(REFERER, referer);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::api(&config.api_base_url, e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// 请求地址
    pub fn endpoint(&self, model_id: &str) -> String {
        format!("{}{}", self.base_url, model_id.trim())
    }

    /// 查询单个模型
    pub async fn fetch(&self, model_id: &str) -> Result<ModelInfo> {
        let endpoint = self.endpoint(model_id);
        debug!("GET {}", endpoint);

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::api(&endpoint, e))?;

        info!("✅ 请求成功，状态码: {}", response.status());

        let body = response
            .text()
            .await
            .map_err(|e| AppError::api(&endpoint, e))?;

        Ok(ModelInfo::from_body(body))
    }
}
