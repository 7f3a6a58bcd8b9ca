//! 测试用的文档来源和翻译提供方

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::Result;
use crate::translation_error;
use crate::translator::Translator;
use crate::web_crawler::DocumentSource;

/// 返回固定文本的文档来源，记录调用次数
pub struct StaticSource {
    text: Option<String>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// 含 `count` 个句子的文本
    pub fn with_sentences(count: usize) -> Self {
        let text = (0..count)
            .map(|i| format!("Sentence {}.", i))
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(&text)
    }

    /// 总是抓取失败
    pub fn unreachable() -> Self {
        Self {
            text: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| translation_error!(network, format!("getaddrinfo ENOTFOUND {}", url)))
    }
}

/// 将文本加上语言前缀作为译文，包含指定片段时失败
pub struct EchoTranslator {
    fail_on: Option<String>,
    calls: AtomicUsize,
}

impl EchoTranslator {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(fragment: &str) -> Self {
        Self {
            fail_on: Some(fragment.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.as_deref().is_some_and(|fragment| text.contains(fragment)) {
            return Err(translation_error!(translation_api, 503, "Service Unavailable", "mock://translate"));
        }
        Ok(format!("[{}] {}", target_lang, text))
    }

    fn name(&self) -> &str {
        "echo"
    }
}
