//! HTML处理模块
//!
//! 提供HTML解析和块级文本提取功能

// 第三方crate导入
use anyhow::Result;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

// 本地模块导入
use crate::utils::normalize_whitespace;

/// 解析HTML字符串为DOM
pub fn parse_html(html_content: &str) -> Result<RcDom> {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html_content.as_bytes())
        .map_err(|e| anyhow::anyhow!("HTML解析失败: {:?}", e))
}

/// 提取页面正文文本
///
/// 优先收集 `ol` 内所有 `li` 的文本；如果没有任何非空内容，则改为收集 `p` 的文本。
/// 每个块的空白被压缩为单个空格，并在其后追加一个空格。
pub fn extract_block_text(html_content: &str) -> Result<String> {
    let dom = parse_html(html_content)?;

    let list_text = collect_blocks(&dom, |node, ancestors| {
        element_name(node) == Some("li") && ancestors.iter().any(|name| *name == "ol")
    });
    if !list_text.trim().is_empty() {
        return Ok(list_text);
    }

    Ok(collect_blocks(&dom, |node, _| element_name(node) == Some("p")))
}

/// 按文档顺序收集匹配元素的文本
fn collect_blocks<F>(dom: &RcDom, matches: F) -> String
where
    F: Fn(&Handle, &[&str]) -> bool,
{
    let mut output = String::new();
    let mut ancestors: Vec<String> = Vec::new();
    walk(&dom.document, &mut ancestors, &matches, &mut output);
    output
}

fn walk<F>(node: &Handle, ancestors: &mut Vec<String>, matches: &F, output: &mut String)
where
    F: Fn(&Handle, &[&str]) -> bool,
{
    let names: Vec<&str> = ancestors.iter().map(String::as_str).collect();
    if matches(node, &names) {
        output.push_str(&normalize_whitespace(&text_content(node)));
        output.push(' ');
    }

    let pushed = match element_name(node) {
        Some(name) => {
            ancestors.push(name.to_string());
            true
        }
        None => false,
    };

    for child in node.children.borrow().iter() {
        walk(child, ancestors, matches, output);
    }

    if pushed {
        ancestors.pop();
    }
}

/// 元素标签名（非元素节点返回None）
fn element_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 节点下全部文本，等同于DOM的textContent
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    append_text(node, &mut text);
    text
}

fn append_text(node: &Handle, text: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        text.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        append_text(child, text);
    }
}
