//! 批次流式翻译控制器
//!
//! 从缓存获取（或抓取并分句）页面句子，按固定批大小逐批翻译并推送事件。
//! 每次请求最多处理一个窗口的句子，客户端通过 `start` 参数续传。

// 标准库导入
use std::sync::Arc;
use std::time::Instant;

// 第三方crate导入
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// 本地模块导入
use crate::api_constants::service_config::EVENT_CHANNEL_CAPACITY;
use crate::config::StreamSettings;
use crate::error::Result;
use crate::page_cache::{PageCache, SentenceSequence};
use crate::segmenter::Segmenter;
use crate::stats::{log_stream_stats, StreamStats};
use crate::translator::Translator;
use crate::web_crawler::DocumentSource;

/// 单个批次的翻译结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEvent {
    /// 批次在句子序列中的起始位置
    pub index: usize,
    /// 原文
    pub original: String,
    /// 译文（失败时为占位文本）
    pub text: String,
}

/// 推送给客户端的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Batch(BatchEvent),
    Done,
    Error(String),
}

impl StreamEvent {
    /// `Done` 或 `Error`，之后不再有事件
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Batch(_))
    }
}

/// 批次流式翻译控制器
pub struct StreamController {
    cache: Arc<PageCache>,
    source: Arc<dyn DocumentSource>,
    translator: Arc<dyn Translator>,
    segmenter: Segmenter,
    settings: StreamSettings,
}

impl StreamController {
    pub fn new(
        cache: Arc<PageCache>,
        source: Arc<dyn DocumentSource>,
        translator: Arc<dyn Translator>,
        segmenter: Segmenter,
        settings: StreamSettings,
    ) -> Self {
        Self {
            cache,
            source,
            translator,
            segmenter,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    /// 获取页面句子，返回值中的布尔值表示是否命中缓存
    pub async fn resolve(&self, url: &str) -> Result<(SentenceSequence, bool)> {
        let mut computed = false;
        let sentences = self
            .cache
            .get_or_try_insert_with(url, || {
                computed = true;
                self.fetch_and_segment(url)
            })
            .await?;

        Ok((sentences, !computed))
    }

    async fn fetch_and_segment(&self, url: &str) -> Result<Vec<String>> {
        let text = self.source.fetch_text(url).await?;
        let sentences = self.segmenter.segment(&text);
        info!("✂️ {} 分句完成: {} 句", url, sentences.len());
        Ok(sentences)
    }

    /// 在后台任务中运行，返回事件接收端
    ///
    /// 接收端被丢弃后任务在下一个批次前停止
    pub fn spawn(self: Arc<Self>, url: String, start: usize) -> mpsc::Receiver<StreamEvent> {
        let (sink, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            self.run(&url, start, sink).await;
        });
        events
    }

    /// 处理一次流式翻译请求
    ///
    /// 恰好发送一个终止事件（`Done` 或 `Error`），除非客户端中途断开
    pub async fn run(&self, url: &str, start: usize, sink: mpsc::Sender<StreamEvent>) -> StreamStats {
        let started = Instant::now();
        let mut stats = StreamStats {
            start_index: start,
            ..Default::default()
        };

        let (sentences, cache_hit) = match self.resolve(url).await {
            Ok(resolved) => resolved,
            Err(e) => {
                error!("❌ 抓取失败 {}: {}", url, e);
                let _ = sink.send(StreamEvent::Error(e.to_string())).await;
                return stats;
            }
        };
        stats.sentences_total = sentences.len();
        stats.cache_hit = cache_hit;
        stats.resolve_time = started.elapsed();

        let batch_size = self.settings.batch_size();
        let end = sentences
            .len()
            .min(start.saturating_add(self.settings.max_batch_sentences()));
        let pacing = self.settings.pacing_delay();

        for index in (start..end).step_by(batch_size) {
            if sink.is_closed() {
                info!("🔌 客户端已断开，停止翻译: {} (位置 {})", url, index);
                return stats;
            }

            let original = sentences[index..(index + batch_size).min(sentences.len())].join(" ");

            let translate_started = Instant::now();
            let text = match self
                .translator
                .translate(&original, self.settings.target_lang())
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!("❌ 批次 {} 翻译失败 ({}): {}", index, self.translator.name(), e);
                    stats.batches_failed += 1;
                    self.settings.failure_text().to_string()
                }
            };
            stats.translation_time += translate_started.elapsed();

            let event = StreamEvent::Batch(BatchEvent {
                index,
                original,
                text,
            });
            if sink.send(event).await.is_err() {
                info!("🔌 客户端已断开，停止翻译: {} (位置 {})", url, index);
                return stats;
            }
            stats.batches_sent += 1;
            debug!("已推送批次 {}", index);

            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
        }

        let _ = sink.send(StreamEvent::Done).await;
        log_stream_stats(url, &stats, self.cache.stats(), started.elapsed());
        debug!("💾 已缓存页面: {}", self.cache.len().await);
        if let Some(next) = stats.next_start(batch_size) {
            debug!("剩余句子可从 start={} 继续", next);
        }

        stats
    }
}
