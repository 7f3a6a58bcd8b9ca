//! 翻译服务模块
//!
//! 定义翻译提供方接口，以及 DeepL 官方API 和 DeepLX 兼容接口两种实现

// 标准库导入
use std::time::Duration;

// 第三方crate导入
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

// 本地模块导入
use crate::api_constants::{deepl_api_url, service_config};
use crate::error::Result;
use crate::translation_error;
use crate::utils::preview_text;

/// 翻译提供方
#[async_trait]
pub trait Translator: Send + Sync {
    /// 将文本翻译为目标语言
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;

    /// 提供方名称，用于日志
    fn name(&self) -> &str;
}

fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(service_config::REQUEST_TIMEOUT_SECONDS))
        .build()?)
}

/// DeepL 官方API
pub struct DeeplTranslator {
    client: Client,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

impl DeeplTranslator {
    /// 根据密钥自动选择免费版或专业版地址
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_api_url(api_key, deepl_api_url(api_key))
    }

    pub fn with_api_url(api_key: &str, api_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(translation_error!(config, "deepl_api_key", "DeepL API密钥不能为空"));
        }

        Ok(Self {
            client: build_client()?,
            api_key: api_key.to_string(),
            api_url: api_url.to_string(),
        })
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        debug!("DeepL翻译请求: {}", preview_text(text, 40));

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&json!({
                "text": [text],
                "target_lang": target_lang.to_ascii_uppercase(),
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(translation_error!(translation_api, status.as_u16(), message, self.api_url));
        }

        let body: DeeplResponse = response.json().await?;
        body.translations
            .into_iter()
            .next()
            .map(|translation| translation.text)
            .ok_or_else(|| {
                translation_error!(translation_api, status.as_u16(), "响应中没有译文", self.api_url)
            })
    }

    fn name(&self) -> &str {
        "deepl"
    }
}

/// DeepLX 兼容接口
///
/// 请求体为 `{text, source_lang, target_lang}`，译文取自响应的 `data`、`text` 或 `result` 字段
pub struct ApiTranslator {
    client: Client,
    api_url: String,
}

impl ApiTranslator {
    pub fn new(api_url: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_url: api_url.to_string(),
        })
    }
}

#[async_trait]
impl Translator for ApiTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&json!({
                "text": text,
                "source_lang": "auto",
                "target_lang": target_lang,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(translation_error!(
                translation_api,
                status.as_u16(),
                format!("翻译API返回错误状态: {}", status),
                self.api_url
            ));
        }

        let response_text = response.text().await?;
        Ok(extract_translated_text(&response_text))
    }

    fn name(&self) -> &str {
        "api"
    }
}

/// 解析翻译接口响应，非JSON时原样返回
fn extract_translated_text(response_text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(response_text) {
        Ok(json_val) => json_val
            .get("data")
            .or_else(|| json_val.get("text"))
            .or_else(|| json_val.get("result"))
            .and_then(|v| v.as_str())
            .unwrap_or(response_text)
            .to_string(),
        Err(_) => response_text.to_string(),
    }
}
