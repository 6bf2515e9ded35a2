use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::pipeline::{self, Analysis};
use crate::state::AppState;
use crate::web::AnalysisQuery;
use crate::web::error::{JsonError, WebError};

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub analysis: Option<AnalysisPayload>,
}

#[derive(Serialize)]
pub struct AnalysisPayload {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub wordcloud_svg: Option<String>,
}

pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalyzeResponse>, JsonError> {
    let request = query.into_request(&state.config.analysis);
    let analysis = pipeline::analyze(
        &request,
        state.fetcher.as_ref(),
        state.tokenizer.clone(),
        state.config.clone(),
    )
    .await
    .map_err(|e| WebError::from(e).into_json())?;

    let analysis = analysis.map(|analysis| AnalysisPayload {
        wordcloud_svg: analysis.wordcloud.as_ref().map(|cloud| cloud.to_svg()),
        analysis,
    });

    Ok(Json(AnalyzeResponse { analysis }))
}

/// 单独返回词云 SVG，没有可绘制内容时返回 404
pub async fn wordcloud_svg(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Response, WebError> {
    let request = query.into_request(&state.config.analysis);
    let analysis = pipeline::analyze(
        &request,
        state.fetcher.as_ref(),
        state.tokenizer.clone(),
        state.config.clone(),
    )
    .await?;

    match analysis.and_then(|a| a.wordcloud) {
        Some(cloud) => Ok(([(header::CONTENT_TYPE, "image/svg+xml")], cloud.to_svg()).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}
