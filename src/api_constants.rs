/// 流式翻译服务常量配置
///
/// 该文件定义了翻译服务、网页抓取和分句相关的常量，方便统一管理和维护

/// 翻译API配置
pub mod api_config {
    /// DeepL 免费版API地址（密钥以 ":fx" 结尾）
    pub const DEEPL_FREE_API_URL: &str = "https://api-free.deepl.com/v2/translate";

    /// DeepL 专业版API地址
    pub const DEEPL_PRO_API_URL: &str = "https://api.deepl.com/v2/translate";

    /// 免费版密钥后缀
    pub const DEEPL_FREE_KEY_SUFFIX: &str = ":fx";
}

/// 流式翻译配置
pub mod service_config {
    /// 默认目标语言
    pub const DEFAULT_TARGET_LANG: &str = "ja";

    /// 每个批次包含的句子数
    pub const DEFAULT_BATCH_SIZE: usize = 3;

    /// 单次请求最多翻译的句子数
    pub const MAX_BATCH_SENTENCES: usize = 100;

    /// 批次之间的节流间隔（毫秒）
    pub const PACING_DELAY_MS: u64 = 100;

    /// 批次翻译失败时的占位文本
    pub const TRANSLATION_FAILED_TEXT: &str = "(翻訳失敗)";

    /// 请求超时时间（秒）
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// 事件通道容量
    pub const EVENT_CHANNEL_CAPACITY: usize = 16;
}

/// 网页抓取配置
pub mod crawler_config {
    /// 默认抓取超时时间（秒）
    pub const DEFAULT_CRAWL_TIMEOUT: u64 = 30;

    /// 默认User-Agent
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
}

/// 分句配置
pub mod segmenter_config {
    /// 不作为句子边界的缩写（区分大小写）
    pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
        "Mr", "Mrs", "Ms", "Dr", "St", "Prof", "etc", "i.e", "e.g", "vs",
    ];
}

/// 服务器配置
pub mod server_config {
    /// 默认监听地址
    pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

    /// 默认监听端口
    pub const DEFAULT_PORT: u16 = 3000;

    /// 默认静态文件目录
    pub const DEFAULT_STATIC_DIR: &str = "public";
}

/// 错误消息常量
pub mod error_messages {
    /// 缺少url参数
    pub const URL_REQUIRED: &str = "url required";

    /// start参数无效
    pub const INVALID_START: &str = "start must be a non-negative integer";
}

/// 根据DeepL密钥选择API地址
pub fn deepl_api_url(api_key: &str) -> &'static str {
    if api_key.ends_with(api_config::DEEPL_FREE_KEY_SUFFIX) {
        api_config::DEEPL_FREE_API_URL
    } else {
        api_config::DEEPL_PRO_API_URL
    }
}

/// 验证API URL是否有效
pub fn is_valid_api_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
