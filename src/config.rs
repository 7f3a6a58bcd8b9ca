//! 配置管理模块
//!
//! 提供CLI参数解析、流式翻译配置和翻译提供方选择

// 标准库导入
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// 第三方crate导入
use clap::Parser;

// 本地模块导入
use crate::api_constants::{crawler_config, is_valid_api_url, server_config, service_config};
use crate::error::Result;
use crate::page_cache::CachePolicy;
use crate::translation_error;
use crate::translator::{ApiTranslator, DeeplTranslator, Translator};
use crate::web_crawler::WebCrawlerConfig;

/// 流式翻译配置
///
/// 支持Builder模式进行链式配置。
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use translate_stream::config::StreamSettings;
///
/// let settings = StreamSettings::new()
///     .target_language("zh")
///     .with_batch_size(5)
///     .with_pacing_delay(Duration::ZERO);
/// assert_eq!(settings.batch_size(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// 目标语言代码
    target_lang: String,
    /// 每批句子数
    batch_size: usize,
    /// 单次请求最多翻译的句子数
    max_batch_sentences: usize,
    /// 批次之间的等待时间
    pacing_delay: Duration,
    /// 翻译失败时的占位文本
    failure_text: String,
}

impl StreamSettings {
    /// 创建新的配置实例
    ///
    /// 默认值：
    /// - 目标语言: 日语 ("ja")
    /// - 批大小: 3
    /// - 单次窗口: 100 句
    /// - 批次间隔: 100ms
    pub fn new() -> Self {
        Self {
            target_lang: service_config::DEFAULT_TARGET_LANG.to_string(),
            batch_size: service_config::DEFAULT_BATCH_SIZE,
            max_batch_sentences: service_config::MAX_BATCH_SENTENCES,
            pacing_delay: Duration::from_millis(service_config::PACING_DELAY_MS),
            failure_text: service_config::TRANSLATION_FAILED_TEXT.to_string(),
        }
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn max_batch_sentences(&self) -> usize {
        self.max_batch_sentences
    }

    pub fn pacing_delay(&self) -> Duration {
        self.pacing_delay
    }

    pub fn failure_text(&self) -> &str {
        &self.failure_text
    }

    /// 设置目标语言代码
    pub fn target_language(mut self, lang: &str) -> Self {
        self.target_lang = lang.to_string();
        self
    }

    /// 设置批大小（至少为1）
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// 设置单次请求窗口
    pub fn with_max_batch_sentences(mut self, max: usize) -> Self {
        self.max_batch_sentences = max;
        self
    }

    /// 设置批次间隔
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    /// 设置翻译失败占位文本
    pub fn with_failure_text(mut self, text: &str) -> Self {
        self.failure_text = text.to_string();
        self
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// CLI参数结构
#[derive(Parser, Debug)]
#[command(author, version, about = "网页逐句翻译流服务 - 通过SSE增量推送译文", long_about = None)]
pub struct Cli {
    /// 监听地址
    #[arg(long, env = "BIND_ADDR", default_value = server_config::DEFAULT_BIND_ADDR)]
    pub bind: String,

    /// 监听端口
    #[arg(short, long, env = "PORT", default_value_t = server_config::DEFAULT_PORT)]
    pub port: u16,

    /// DeepL API密钥
    #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
    pub deepl_api_key: Option<String>,

    /// DeepLX兼容翻译API地址 (未设置DeepL密钥时使用)
    #[arg(short, long, env = "TRANSLATE_API_URL")]
    pub api_url: Option<String>,

    /// 目标语言代码 (如: ja, zh, en, ko)
    #[arg(short, long, env = "TARGET_LANG", default_value = service_config::DEFAULT_TARGET_LANG)]
    pub lang: String,

    /// 静态文件目录
    #[arg(long, env = "STATIC_DIR", default_value = server_config::DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,

    /// 自定义User-Agent
    #[arg(long, default_value = crawler_config::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// 网页抓取超时时间（秒）
    #[arg(long, default_value_t = crawler_config::DEFAULT_CRAWL_TIMEOUT)]
    pub fetch_timeout: u64,

    /// 句子缓存最大页面数 (0 表示不限)
    #[arg(long, default_value_t = 0)]
    pub cache_max_entries: usize,

    /// 句子缓存过期时间（秒，不设置则永不过期）
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// 详细输出模式
    #[arg(short, long)]
    pub verbose: bool,

    /// 静默模式 (仅输出错误)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// 根据参数选择翻译提供方：优先DeepL密钥，其次自定义API地址
    pub fn build_translator(&self) -> Result<Arc<dyn Translator>> {
        if let Some(key) = self.deepl_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(Arc::new(DeeplTranslator::new(key)?));
        }

        match self.api_url.as_deref() {
            Some(url) if is_valid_api_url(url) => Ok(Arc::new(ApiTranslator::new(url)?)),
            Some(url) => Err(translation_error!(config, "api_url", format!("无效的API地址: {}", url))),
            None => Err(translation_error!(
                config,
                "translator",
                "需要设置 DEEPL_API_KEY 或 TRANSLATE_API_URL"
            )),
        }
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings::new().target_language(&self.lang)
    }

    pub fn crawler_config(&self) -> WebCrawlerConfig {
        WebCrawlerConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.fetch_timeout,
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        let policy = CachePolicy::unbounded().with_max_entries(self.cache_max_entries);
        match self.cache_ttl {
            Some(secs) => policy.with_ttl(Duration::from_secs(secs)),
            None => policy,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
