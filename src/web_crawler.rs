//! Web抓取模块 - 抓取网页并提取正文文本
//!
//! 此模块负责：
//! - 使用浏览器User-Agent抓取网页HTML
//! - 拒绝非成功状态码和非文本内容
//! - 提取 `ol li`（或退而求其次的 `p`）文本供分句使用

// 标准库导入
use std::time::Duration;

// 第三方crate导入
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use tracing::{debug, info};

// 本地模块导入
use crate::api_constants::crawler_config;
use crate::error::Result;
use crate::html_processor::extract_block_text;
use crate::translation_error;
use crate::utils::validate_page_url;

/// 文档来源：给定URL，返回规范化后的块级文本
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Web抓取配置结构体
#[derive(Debug, Clone)]
pub struct WebCrawlerConfig {
    /// 用户代理字符串
    pub user_agent: String,
    /// 连接超时时间（秒）
    pub timeout: u64,
}

impl Default for WebCrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: crawler_config::DEFAULT_USER_AGENT.to_string(),
            timeout: crawler_config::DEFAULT_CRAWL_TIMEOUT,
        }
    }
}

/// Web抓取器
///
/// 单次请求，不重试；失败直接作为抓取错误返回
pub struct WebCrawler {
    config: WebCrawlerConfig,
    client: Client,
}

impl WebCrawler {
    /// 创建新的Web抓取器实例
    pub fn new(config: WebCrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self { config, client })
    }

    /// 使用默认配置创建Web抓取器
    pub fn with_defaults() -> Result<Self> {
        Self::new(WebCrawlerConfig::default())
    }

    /// 抓取网页HTML
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let url = validate_page_url(url)?;
        info!("🕷️ 开始抓取网页: {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(translation_error!(
                network,
                format!("{} 返回错误状态: {}", url, status),
                status.as_u16()
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_text_content_type(&content_type) {
            return Err(translation_error!(
                html_parse,
                format!("不支持的内容类型: {}", content_type)
            ));
        }

        let html_content = response.text().await?;
        info!("✅ 网页内容抓取完成，大小: {} 字节", html_content.len());

        Ok(html_content)
    }
}

#[async_trait]
impl DocumentSource for WebCrawler {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let html_content = self.fetch_html(url).await?;
        let text = extract_block_text(&html_content)
            .map_err(|e| translation_error!(html_parse, e))?;
        debug!("📝 提取正文 {} 字符", text.chars().count());
        Ok(text)
    }
}

/// 判断响应是否为可解析的文本内容
///
/// 缺少Content-Type时按文本处理
fn is_text_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.is_empty() || mime.starts_with("text/") || mime.ends_with("+xml") || mime == "application/xml"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_crawler_config_default() {
        let config = WebCrawlerConfig::default();
        assert_eq!(config.timeout, 30);
        assert_eq!(config.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn test_content_type_detection() {
        assert!(is_text_content_type("text/html; charset=utf-8"));
        assert!(is_text_content_type("TEXT/PLAIN"));
        assert!(is_text_content_type("application/xhtml+xml"));
        assert!(is_text_content_type(""));
        assert!(!is_text_content_type("image/png"));
        assert!(!is_text_content_type("application/octet-stream"));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let crawler = WebCrawler::with_defaults().unwrap();
        let err = crawler.fetch_text("invalid-url").await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let crawler = WebCrawler::new(WebCrawlerConfig {
            timeout: 5,
            ..Default::default()
        })
        .unwrap();

        // 端口0不可连接，失败原因因网络环境而异
        let result = crawler.fetch_text("http://127.0.0.1:0/").await;
        assert!(result.is_err());
    }
}
