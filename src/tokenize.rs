//! 分词与词频统计
//!
//! 含有中日韩统一表意文字（U+4E00–U+9FFF）的文本使用 jieba 分词，
//! 其余文本按 Unicode 单词边界切分。

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::extract::{densify, depunctuate};

/// 全局 Jieba 分词器实例（延迟初始化）
static JIEBA: Lazy<jieba_rs::Jieba> = Lazy::new(|| {
    tracing::info!("初始化 Jieba 分词器...");
    jieba_rs::Jieba::new()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Cjk,
    Spaced,
}

pub fn detect_script(dense: &str) -> Script {
    if dense.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c)) {
        Script::Cjk
    } else {
        Script::Spaced
    }
}

pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

pub struct JiebaSegmenter;

impl Segmenter for JiebaSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        JIEBA
            .cut(text, true)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

pub struct UnicodeWordSegmenter;

impl Segmenter for UnicodeWordSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// 按出现次数降序排列的词频表，次数相同时保持首次出现的顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyList(Vec<WordCount>);

impl FrequencyList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordCount> {
        self.0.iter()
    }

    pub fn words(&self) -> Vec<&str> {
        self.0.iter().map(|w| w.word.as_str()).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.0.iter().map(|w| w.count).collect()
    }

    /// 统计 token 序列并截取前 limit 项
    pub fn from_tokens<I, S>(tokens: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<WordCount> = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            if token.trim().is_empty() {
                continue;
            }
            match index.get(token) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(token.to_string(), counts.len());
                    counts.push(WordCount {
                        word: token.to_string(),
                        count: 1,
                    });
                }
            }
        }

        // sort_by 是稳定排序，同频词保持首次出现顺序
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(limit);
        Self(counts)
    }
}

impl<'a> IntoIterator for &'a FrequencyList {
    type Item = &'a WordCount;
    type IntoIter = std::slice::Iter<'a, WordCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<W: Into<String>> FromIterator<(W, usize)> for FrequencyList {
    fn from_iter<T: IntoIterator<Item = (W, usize)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(word, count)| WordCount {
                    word: word.into(),
                    count,
                })
                .collect(),
        )
    }
}

pub struct Tokenizer {
    cjk: Box<dyn Segmenter>,
    spaced: Box<dyn Segmenter>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(Box::new(JiebaSegmenter), Box::new(UnicodeWordSegmenter))
    }
}

impl Tokenizer {
    pub fn new(cjk: Box<dyn Segmenter>, spaced: Box<dyn Segmenter>) -> Self {
        Self { cjk, spaced }
    }

    pub fn top_words(&self, text: &str, limit: usize) -> FrequencyList {
        if limit == 0 {
            return FrequencyList::default();
        }

        let dense = densify(text);
        let tokens = match detect_script(&dense) {
            Script::Cjk => self.cjk.segment(&dense),
            // 紧凑文本已丢失空格，按词边界切分需要保留空白的版本
            Script::Spaced => self.spaced.segment(&depunctuate(text)),
        };

        FrequencyList::from_tokens(tokens, limit)
    }
}
