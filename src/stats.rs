//! 流式翻译统计
//!
//! 单次请求的批次计数与耗时，以及页面缓存的累计命中情况

use std::time::Duration;

use tracing::info;

use crate::page_cache::CacheStats;

/// 单次流式翻译统计
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StreamStats {
    pub sentences_total: usize,
    pub start_index: usize,
    pub batches_sent: usize,
    pub batches_failed: usize,
    pub cache_hit: bool,
    pub resolve_time: Duration,
    pub translation_time: Duration,
}

impl StreamStats {
    /// 客户端续传时应使用的起始位置，已到末尾时为None
    pub fn next_start(&self, batch_size: usize) -> Option<usize> {
        let next = self.start_index + self.batches_sent * batch_size;
        (next < self.sentences_total).then_some(next)
    }
}

/// 记录流式翻译统计
pub fn log_stream_stats(url: &str, stats: &StreamStats, cache_stats: &CacheStats, total_duration: Duration) {
    info!(
        "📊 {} | 起始 {} / 共 {} 句 | 批次 {} (失败 {}) | 缓存{} ({}) | 解析 {} | 翻译 {} | 总耗时 {}",
        url,
        stats.start_index,
        stats.sentences_total,
        stats.batches_sent,
        stats.batches_failed,
        if stats.cache_hit { "命中" } else { "未命中" },
        format_cache_stats(cache_stats),
        format_duration(stats.resolve_time),
        format_duration(stats.translation_time),
        format_duration(total_duration),
    );
}

/// 格式化缓存累计命中情况
pub fn format_cache_stats(cache_stats: &CacheStats) -> String {
    format!(
        "累计命中 {} / 未命中 {}, 命中率 {:.1}%",
        cache_stats.hits(),
        cache_stats.misses(),
        cache_stats.hit_rate() * 100.0
    )
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}
