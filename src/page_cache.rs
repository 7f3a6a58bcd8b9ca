//! 页面句子缓存
//!
//! 按源URL缓存分句结果，命中时不再重新抓取和分句。
//!
//! 默认策略不限容量、永不过期：条目在进程生命周期内单调增长。
//! 只适合短期或中期运行的进程，长期运行时应通过 [`CachePolicy`] 设置上限或TTL。
//!
//! 计算过程中不持有锁，同一URL的并发未命中可能各自计算一次。
//! 分句结果是确定的，重复计算只浪费一次抓取。

// 标准库导入
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// 第三方crate导入
use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

/// 共享的句子序列
pub type SentenceSequence = Arc<[String]>;

/// 缓存容量与过期策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// 最大条目数，超出时淘汰最久未使用的条目
    pub max_entries: Option<NonZeroUsize>,
    /// 条目存活时间
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    /// 不限容量、永不过期
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// 设置最大条目数（0 表示不限）
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = NonZeroUsize::new(max_entries);
        self
    }

    /// 设置存活时间
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[derive(Debug)]
struct CacheEntry {
    sentences: SentenceSequence,
    stored_at: Instant,
}

/// 缓存命中统计
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl CacheStats {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// 命中率，无请求时为 0
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

/// 页面句子缓存
#[derive(Debug)]
pub struct PageCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    policy: CachePolicy,
    stats: CacheStats,
}

impl PageCache {
    /// 使用给定策略创建缓存
    pub fn new(policy: CachePolicy) -> Self {
        let entries = match policy.max_entries {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };

        Self {
            entries: Mutex::new(entries),
            policy,
            stats: CacheStats::default(),
        }
    }

    /// 创建不限容量的缓存
    pub fn unbounded() -> Self {
        Self::new(CachePolicy::unbounded())
    }

    /// 当前策略
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// 命中统计
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// 查询缓存，过期条目视为未命中并被移除
    pub async fn get(&self, url: &str) -> Option<SentenceSequence> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(url) {
            Some(entry) => self.is_expired(entry),
            None => return None,
        };

        if expired {
            debug!("缓存条目已过期: {}", url);
            entries.pop(url);
            return None;
        }

        entries.get(url).map(|entry| entry.sentences.clone())
    }

    /// 写入缓存
    pub async fn insert(&self, url: &str, sentences: SentenceSequence) {
        let mut entries = self.entries.lock().await;
        entries.put(
            url.to_string(),
            CacheEntry {
                sentences,
                stored_at: Instant::now(),
            },
        );
    }

    /// 命中时直接返回，未命中时执行 `compute` 并写入结果
    ///
    /// `compute` 失败时不写入缓存，错误原样返回
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        url: &str,
        compute: F,
    ) -> Result<SentenceSequence, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>, E>>,
    {
        if let Some(sentences) = self.get(url).await {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!("💾 缓存命中: {} ({} 句)", url, sentences.len());
            return Ok(sentences);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        debug!("缓存未命中: {}", url);

        let sentences: SentenceSequence = compute().await?.into();
        self.insert(url, sentences.clone()).await;

        Ok(sentences)
    }

    /// 条目数量
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.policy
            .ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_hit_skips_compute() {
        let cache = PageCache::unbounded();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result: Result<_, String> = cache
                .get_or_try_insert_with("https://example.com", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(sentences(&["One.", "Two."]))
                })
                .await;
            assert_eq!(result.unwrap().len(), 2);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
        assert!((cache.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_failed_compute_is_not_cached() {
        let cache = PageCache::unbounded();

        let result: Result<SentenceSequence, String> = cache
            .get_or_try_insert_with("https://bad.example", || async { Err("boom".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "boom");
        assert!(cache.is_empty().await);

        let result: Result<_, String> = cache
            .get_or_try_insert_with("https://bad.example", || async { Ok(sentences(&["Ok."])) })
            .await;
        assert_eq!(&result.unwrap()[..], &["Ok.".to_string()]);
    }

    #[tokio::test]
    async fn test_separate_urls_do_not_interfere() {
        let cache = PageCache::unbounded();
        cache.insert("a", sentences(&["A."]).into()).await;
        cache.insert("b", sentences(&["B.", "C."]).into()).await;

        assert_eq!(cache.get("a").await.unwrap().len(), 1);
        assert_eq!(cache.get("b").await.unwrap().len(), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_max_entries_evicts_least_recent() {
        let cache = PageCache::new(CachePolicy::unbounded().with_max_entries(2));
        cache.insert("a", sentences(&["A."]).into()).await;
        cache.insert("b", sentences(&["B."]).into()).await;
        assert!(cache.get("a").await.is_some());
        cache.insert("c", sentences(&["C."]).into()).await;

        assert!(cache.get("a").await.is_some());
        assert!(cache.get("b").await.is_none());
        assert!(cache.get("c").await.is_some());
    }

    #[tokio::test]
    async fn test_ttl_expires_entries() {
        let cache = PageCache::new(CachePolicy::unbounded().with_ttl(Duration::from_millis(20)));
        cache.insert("a", sentences(&["A."]).into()).await;
        assert!(cache.get("a").await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("a").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_default_policy_is_unbounded() {
        let cache = PageCache::default();
        assert_eq!(cache.policy(), CachePolicy::unbounded());
        assert_eq!(cache.stats().hit_rate(), 0.0);
    }

    #[test]
    fn test_zero_max_entries_means_unbounded() {
        assert_eq!(CachePolicy::unbounded().with_max_entries(0).max_entries, None);
    }
}
