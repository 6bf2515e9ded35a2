use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::extract;
use crate::fetch::{FetchError, Fetcher, RawDocument};
use crate::render::{Chart, WordCloud, render_chart_named, render_wordcloud};
use crate::tokenize::{FrequencyList, Tokenizer};

/// 一次分析的全部输入，每次交互重新构造
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub address: String,
    pub style: String,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub address: String,
    pub preview: String,
    pub words: FrequencyList,
    pub chart: Option<Chart>,
    #[serde(skip)]
    pub wordcloud: Option<WordCloud>,
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("分析任务执行异常：{0}")]
    Task(#[from] tokio::task::JoinError),
}

/// 地址为空时不抓取，返回 Ok(None)
///
/// 分词与词云布局在阻塞线程池中执行
pub async fn analyze(
    request: &AnalysisRequest,
    fetcher: &dyn Fetcher,
    tokenizer: Arc<Tokenizer>,
    config: Arc<AppConfig>,
) -> Result<Option<Analysis>, AnalyzeError> {
    let address = request.address.trim();
    if address.is_empty() {
        return Ok(None);
    }

    tracing::info!("开始分析 {address}（样式 {}，数量 {}）", request.style, request.limit);
    let doc = fetcher.fetch(address).await?;

    let request = request.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        analyze_document(&doc, &request, &tokenizer, &config)
    })
    .await?;
    Ok(Some(analysis))
}

/// 抓取之后的纯计算部分：提取 → 分词计数 → 绘图
pub fn analyze_document(
    doc: &RawDocument,
    request: &AnalysisRequest,
    tokenizer: &Tokenizer,
    config: &AppConfig,
) -> Analysis {
    let text = extract::extract_visible(doc);
    let preview = extract::preview(&text);

    // 非正数视为空结果
    let limit = usize::try_from(request.limit).unwrap_or(0);
    let words = tokenizer.top_words(&text, limit);

    let chart = render_chart_named(&words, &request.style, &config.chart);
    let wordcloud = render_wordcloud(&text, &config.wordcloud.background, &config.wordcloud);

    tracing::info!(
        "{} 分析完成（HTTP {}）：正文 {} 字，高频词 {} 个",
        doc.url,
        doc.status,
        text.chars().count(),
        words.len()
    );

    Analysis {
        address: doc.url.clone(),
        preview,
        words,
        chart,
        wordcloud,
    }
}
