//! 词云：直接从正文文本生成，输出 SVG
//!
//! 词频按字号缩放，按阿基米德螺线从中心向外寻找空位；
//! 横排放不下时尝试竖排，仍放不下则缩小字号重试，缩到最小字号仍失败即停止布局。

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use crate::config::WordCloudConfig;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']+").expect("valid word regex"));

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
        "during", "each", "else", "ever", "few", "for", "from", "further", "had", "has",
        "have", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his",
        "how", "however", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
        "more", "most", "my", "myself", "no", "nor", "not", "of", "off", "on", "once", "only",
        "or", "other", "otherwise", "ought", "our", "ours", "ourselves", "out", "over", "own",
        "same", "shall", "she", "should", "so", "some", "such", "than", "that", "the",
        "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
        "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
        "what", "when", "where", "which", "while", "who", "whom", "why", "with", "would",
        "you", "your", "yours", "yourself", "yourselves", "www", "com", "http", "https",
    ]
    .into_iter()
    .collect()
});

/// viridis 色带取样
const PALETTE: [&str; 8] = [
    "#fde725", "#b5de2b", "#6ece58", "#35b779", "#1f9e89", "#26828e", "#31688e", "#3e4989",
];

const MARGIN: f32 = 2.0;
const SIZE_STEP: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub count: usize,
    pub font_size: f32,
    pub vertical: bool,
    pub color: &'static str,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w + MARGIN
            && other.x < self.x + self.w + MARGIN
            && self.y < other.y + other.h + MARGIN
            && other.y < self.y + self.h + MARGIN
    }

    fn inside(&self, width: f32, height: f32) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x + self.w <= width && self.y + self.h <= height
    }

    fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct WordCloud {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub font_family: String,
    pub words: Vec<PlacedWord>,
}

impl WordCloud {
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}"><rect width="100%" height="100%" fill="{bg}"/>"#,
            w = self.width,
            h = self.height,
            font = xml_escape(&self.font_family),
            bg = xml_escape(&self.background),
        );
        for word in &self.words {
            let (cx, cy) = word.rect.center();
            let transform = if word.vertical {
                format!(r#" transform="rotate(-90 {cx:.1} {cy:.1})""#)
            } else {
                String::new()
            };
            let _ = write!(
                svg,
                r#"<text x="{cx:.1}" y="{cy:.1}" font-size="{size:.1}" fill="{color}" text-anchor="middle" dominant-baseline="central"{transform}>{text}</text>"#,
                size = word.font_size,
                color = word.color,
                text = xml_escape(&word.text),
            );
        }
        svg.push_str("</svg>");
        svg
    }
}

/// 从正文生成词云，文本为空或没有可用词时返回 None
pub fn render_wordcloud(text: &str, background: &str, config: &WordCloudConfig) -> Option<WordCloud> {
    if text.is_empty() {
        return None;
    }

    let frequencies = count_words(text, config.max_words);
    if frequencies.is_empty() {
        return None;
    }

    let width = config.width as f32;
    let height = config.height as f32;
    let max_count = frequencies[0].1 as f32;
    let mut placed: Vec<PlacedWord> = Vec::with_capacity(frequencies.len());
    let mut last_size = config.max_font_size;

    'words: for (rank, (word, count)) in frequencies.into_iter().enumerate() {
        let scale = 0.5 * (count as f32 / max_count) + 0.5;
        // 字号不超过前一个词，避免低频词反而更大
        let mut size = (config.max_font_size * scale).min(last_size);

        while size >= config.min_font_size {
            for vertical in [false, true] {
                let (tw, th) = measure(&word, size);
                let (w, h) = if vertical { (th, tw) } else { (tw, th) };
                if w > width || h > height {
                    continue;
                }
                if let Some(rect) = find_spot(w, h, width, height, &placed) {
                    placed.push(PlacedWord {
                        text: word,
                        count,
                        font_size: size,
                        vertical,
                        color: PALETTE[rank * PALETTE.len() / config.max_words.max(1) % PALETTE.len()],
                        rect,
                    });
                    last_size = size;
                    continue 'words;
                }
            }
            size -= SIZE_STEP;
        }

        tracing::debug!("词云空间不足，已放置 {} 个词", placed.len());
        break;
    }

    // 最高频的词也放不下时没有可绘制内容
    if placed.is_empty() {
        return None;
    }

    Some(WordCloud {
        width: config.width,
        height: config.height,
        background: background.to_string(),
        font_family: config.font_family.clone(),
        words: placed,
    })
}

/// 英文停用词与纯数字不计入，大小写合并到首次出现的写法
fn count_words(text: &str, max_words: usize) -> Vec<(String, usize)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for m in WORD_RE.find_iter(text) {
        let word = m.as_str();
        let word = word
            .strip_suffix("'s")
            .or_else(|| word.strip_suffix("'S"))
            .unwrap_or(word);
        let key = word.to_lowercase();
        if word.chars().count() < 2
            || STOPWORDS.contains(key.as_str())
            || word.chars().all(|c| c.is_numeric())
        {
            continue;
        }
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((word.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(max_words);
    counts
}

/// 估算文字外框，全角字符按 1em、半角按 0.6em 计
fn measure(word: &str, size: f32) -> (f32, f32) {
    let em: f32 = word
        .chars()
        .map(|c| if is_wide(c) { 1.0 } else if c.is_uppercase() { 0.7 } else { 0.6 })
        .sum();
    (em * size, size * 1.15)
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD)
}

fn find_spot(w: f32, h: f32, width: f32, height: f32, placed: &[PlacedWord]) -> Option<Rect> {
    let (cx, cy) = (width / 2.0, height / 2.0);
    let aspect = width / height;
    let max_radius = cy.max(cx / aspect) * 1.5;
    let mut theta: f32 = 0.0;

    loop {
        let r = 2.0 * theta;
        if r > max_radius {
            return None;
        }
        let rect = Rect {
            x: cx + r * aspect * theta.cos() - w / 2.0,
            y: cy + r * theta.sin() - h / 2.0,
            w,
            h,
        };
        if rect.inside(width, height) && !placed.iter().any(|p| p.rect.overlaps(&rect)) {
            return Some(rect);
        }
        theta += (8.0 / r.max(1.0)).clamp(0.05, 0.6);
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
