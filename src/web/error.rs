use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::AnalyzeError;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("页面渲染失败：{0:#}")]
    Render(#[from] anyhow::Error),
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::Analyze(AnalyzeError::Fetch(_)) => StatusCode::BAD_GATEWAY,
            WebError::Analyze(AnalyzeError::Task(_)) | WebError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 接口使用的 JSON 错误响应
    pub fn into_json(self) -> JsonError {
        JsonError(self)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        let status = self.status();
        let body = format!(
            r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>分析失败</title></head>
            <body style="font-family:system-ui,sans-serif;padding:24px;">
            <h1 style="color:#b71c1c;">分析失败</h1>
            <pre style="white-space:pre-wrap;">{message}</pre>
            <p><a href="/">返回</a></p></body></html>"#,
            message = html_escape(&self.to_string()),
        );
        (status, Html(body)).into_response()
    }
}

pub struct JsonError(WebError);

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);
        let status = self.0.status();
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
