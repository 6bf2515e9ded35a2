use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::fetch::RawDocument;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid tag regex"));
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punct regex"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("valid space regex"));
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("valid body selector"));

/// 提取 body 元素下的全部文本，空白保持解析器输出的原样
pub fn extract_visible(doc: &RawDocument) -> String {
    let html = Html::parse_document(&doc.body);
    html.select(&BODY_SELECTOR)
        .next()
        .map(|body| body.text().collect())
        .unwrap_or_default()
}

/// 去除标签与标点，保留空白
pub fn depunctuate(text: &str) -> String {
    let text = TAG_RE.replace_all(text, "");
    PUNCT_RE.replace_all(&text, "").into_owned()
}

/// 计数用的紧凑文本：无标签、无标点、无空白
pub fn densify(text: &str) -> String {
    let text = depunctuate(text);
    SPACE_RE.replace_all(&text, "").into_owned()
}

/// 预览文本：去除标签后把连续空白压缩为单个换行
pub fn preview(text: &str) -> String {
    let text = TAG_RE.replace_all(text, "");
    SPACE_RUN_RE.replace_all(&text, "\n").into_owned()
}
