use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use translate_stream::config::Cli;
use translate_stream::page_cache::{CachePolicy, PageCache};
use translate_stream::segmenter::Segmenter;
use translate_stream::server::{serve, AppState};
use translate_stream::stream::StreamController;
use translate_stream::utils::init_logging;
use translate_stream::web_crawler::WebCrawler;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    init_logging(cli.verbose, cli.quiet);

    let translator = cli.build_translator().context("创建翻译器失败")?;
    let crawler = WebCrawler::new(cli.crawler_config()).context("创建网页抓取器失败")?;
    let segmenter = Segmenter::with_default_abbreviations()?;
    info!("✂️ 分句器已加载 {} 个缩写", segmenter.abbreviation_count());

    let translator_name = translator.name().to_string();
    let controller = StreamController::new(
        Arc::new(PageCache::new(cli.cache_policy())),
        Arc::new(crawler),
        translator,
        segmenter,
        cli.stream_settings(),
    );

    let cache_policy = controller.cache().policy();
    if cache_policy == CachePolicy::unbounded() {
        info!("💾 句子缓存不限容量且永不过期，长期运行请设置 --cache-max-entries 或 --cache-ttl");
    } else {
        info!("💾 句子缓存策略: {:?}", cache_policy);
    }

    let settings = controller.settings();
    info!(
        "🌐 目标语言: {} | 翻译服务: {} | 每批 {} 句 | 间隔 {}ms",
        settings.target_lang(),
        translator_name,
        settings.batch_size(),
        settings.pacing_delay().as_millis()
    );

    let state = AppState {
        controller: Arc::new(controller),
    };

    let static_dir = if cli.static_dir.is_dir() {
        Some(cli.static_dir.as_path())
    } else {
        warn!("⚠️  静态文件目录不存在，跳过: {}", cli.static_dir.display());
        None
    };

    serve(&cli.listen_addr(), state, static_dir).await
}
