//! Translate Stream - 网页逐句翻译流服务库
//!
//! 这个库提供了网页抓取、正文提取、分句、句子缓存以及通过SSE增量推送批次译文的核心功能。

pub mod api_constants;
pub mod config;
pub mod error;
pub mod html_processor;
pub mod page_cache;
pub mod segmenter;
pub mod server;
pub mod stats;
pub mod stream;
pub mod translator;
pub mod utils;
pub mod web_crawler;

#[cfg(test)]
pub(crate) mod testing;
