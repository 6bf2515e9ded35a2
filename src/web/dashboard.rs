use axum::extract::{Query, State};
use axum::response::Html;
use minijinja::{Value, context};

use crate::pipeline;
use crate::render::ChartStyle;
use crate::state::AppState;
use crate::web::AnalysisQuery;
use crate::web::error::WebError;
use crate::web::template::render_page;

/// 单页仪表盘：侧边栏选择图表样式与词数，输入网址后整页重新分析
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Html<String>, WebError> {
    let config = &state.config;
    let request = query.into_request(&config.analysis);
    let analysis = pipeline::analyze(
        &request,
        state.fetcher.as_ref(),
        state.tokenizer.clone(),
        state.config.clone(),
    )
    .await?;

    let selected = request.style.parse::<ChartStyle>().ok();
    let styles: Vec<Value> = ChartStyle::ALL
        .iter()
        .map(|style| {
            context! {
                key => style.key(),
                label => style.label(),
                selected => Some(*style) == selected,
            }
        })
        .collect();

    let (chart, wordcloud_svg, preview) = match &analysis {
        Some(a) => (
            a.chart.as_ref().map(Value::from_serialize),
            a.wordcloud
                .as_ref()
                .map(|cloud| Value::from_safe_string(cloud.to_svg())),
            Some(a.preview.as_str()),
        ),
        None => (None, None, None),
    };

    let ctx = context! {
        page_title => "网址分析",
        address => request.address.trim(),
        styles => styles,
        // 非正数照原值显示，与空结果保持一致
        limit => request.limit,
        limit_min => request.limit.min(1),
        max_limit => config.analysis.max_limit,
        analysed => analysis.is_some(),
        chart => chart,
        wordcloud_svg => wordcloud_svg,
        preview => preview,
    };

    let html = render_page(&state.env, "dashboard.html", ctx)?;
    Ok(Html(html))
}
