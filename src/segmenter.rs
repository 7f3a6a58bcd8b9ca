//! 分句模块
//!
//! 将规范化后的网页文本切分为有序的句子序列。
//!
//! 候选边界是 `.`、`!`、`?` 后接空白再接大写字母的位置。
//! 如果标点是句点且前一个词在缩写表中（如 `Dr.`），该边界被抑制。

// 标准库导入
use std::collections::HashSet;

// 第三方crate导入
use anyhow::{Context, Result};
use regex::Regex;

// 本地模块导入
use crate::api_constants::segmenter_config::DEFAULT_ABBREVIATIONS;

/// 句子切分器
#[derive(Debug, Clone)]
pub struct Segmenter {
    boundary: Regex,
    abbreviations: HashSet<String>,
}

impl Segmenter {
    /// 使用给定缩写表创建切分器
    pub fn new<I, S>(abbreviations: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let boundary = Regex::new(r"([.!?])\s+([A-Z])").context("编译分句正则表达式失败")?;

        Ok(Self {
            boundary,
            abbreviations: abbreviations.into_iter().map(Into::into).collect(),
        })
    }

    /// 使用内置缩写表创建切分器
    pub fn with_default_abbreviations() -> Result<Self> {
        Self::new(DEFAULT_ABBREVIATIONS.iter().copied())
    }

    /// 切分文本，返回去除首尾空白后的非空句子
    pub fn segment(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for captures in self.boundary.captures_iter(text) {
            let (Some(punct), Some(next)) = (captures.get(1), captures.get(2)) else {
                continue;
            };

            if punct.as_str() == "." && self.ends_with_abbreviation(&text[start..punct.start()]) {
                continue;
            }

            push_trimmed(&mut sentences, &text[start..punct.end()]);
            start = next.start();
        }

        push_trimmed(&mut sentences, &text[start..]);
        sentences
    }

    /// 判断片段末尾的词是否为缩写
    fn ends_with_abbreviation(&self, span: &str) -> bool {
        let token = span
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .trim_start_matches(|c: char| !c.is_alphanumeric());

        !token.is_empty() && self.abbreviations.contains(token)
    }

    /// 缩写表大小
    pub fn abbreviation_count(&self) -> usize {
        self.abbreviations.len()
    }
}

fn push_trimmed(sentences: &mut Vec<String>, span: &str) {
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
