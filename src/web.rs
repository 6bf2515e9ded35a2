use axum::Router;
use axum::routing::get;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::config::AnalysisConfig;
use crate::pipeline::AnalysisRequest;
use crate::state::AppState;

pub mod api;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod template;

pub fn router(state: AppState) -> Router {
    Router::new()
        // 仪表盘
        .route("/", get(dashboard::dashboard))
        // JSON 接口与词云图片
        .route("/api/analyze", get(api::analyze))
        .route("/wordcloud.svg", get(api::wordcloud_svg))
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 页面与接口共用的查询参数
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub url: Option<String>,
    pub style: Option<String>,
    pub limit: Option<i64>,
}

impl AnalysisQuery {
    pub fn into_request(self, config: &AnalysisConfig) -> AnalysisRequest {
        AnalysisRequest {
            address: self.url.unwrap_or_default(),
            style: self
                .style
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| config.default_style.clone()),
            limit: self
                .limit
                .unwrap_or(config.default_limit)
                .min(config.max_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::fetch::{FetchError, Fetcher, RawDocument};
    use async_trait::async_trait;
    use axum::body::{self, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct StubFetcher;

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, address: &str) -> Result<RawDocument, FetchError> {
            if address.contains("broken") {
                return Err(FetchError::NotText {
                    url: address.to_string(),
                    content_type: "application/pdf".to_string(),
                });
            }
            Ok(RawDocument::new(
                address,
                "<html><body><p>cat cat dog</p> <p>R&amp;D</p></body></html>",
            ))
        }
    }

    fn test_router() -> Router {
        let state = AppState::with_fetcher(AppConfig::default(), Arc::new(StubFetcher)).unwrap();
        router(state)
    }

    async fn get_body(uri: &str) -> (StatusCode, String) {
        let response = test_router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn query_defaults_and_caps() {
        let config = AnalysisConfig::default();
        let request = AnalysisQuery::default().into_request(&config);
        assert_eq!(request.address, "");
        assert_eq!(request.style, "pie");
        assert_eq!(request.limit, 20);

        let request = AnalysisQuery {
            url: Some("http://example.test".into()),
            style: Some("箱线图".into()),
            limit: Some(500),
        }
        .into_request(&config);
        assert_eq!(request.style, "箱线图");
        assert_eq!(request.limit, 50);
    }

    #[tokio::test]
    async fn dashboard_without_url_shows_controls_only() {
        let (status, html) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("网址分析"));
        assert!(html.contains("柱状图"));
        assert!(html.contains(r#"max="50""#));
        assert!(!html.contains("词云图"));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[tokio::test]
    async fn dashboard_with_url_renders_everything() {
        let (status, html) = get_body("/?url=http%3A%2F%2Fexample.test%2F&style=bar&limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("词云图"));
        assert!(html.contains("<svg"));
        assert!(html.contains("文本内容"));
        // 预览内容经过转义
        assert!(html.contains("R&amp;D"));
        assert!(html.contains(r#"<option value="bar" selected>"#));
    }

    #[tokio::test]
    async fn dashboard_shows_zero_limit_as_requested() {
        let (status, html) = get_body("/?url=http%3A%2F%2Fexample.test%2F&limit=0").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<output id="limit-value">0</output>"#));
        assert!(html.contains(r#"min="0""#));
        assert!(html.contains(r#"value="0""#));
        // 数量为 0 时没有统计图，词云仍基于正文生成
        assert!(!html.contains("Plotly.newPlot"));
        assert!(html.contains("<svg"));
    }

    #[tokio::test]
    async fn api_returns_frequencies_and_chart() {
        let (status, body) = get_body("/api/analyze?url=http%3A%2F%2Fexample.test%2F&limit=2").await;
        assert_eq!(status, StatusCode::OK);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        let analysis = &payload["analysis"];
        assert_eq!(analysis["words"][0]["word"], "cat");
        assert_eq!(analysis["words"][0]["count"], 2);
        assert_eq!(analysis["words"].as_array().unwrap().len(), 2);
        assert_eq!(analysis["chart"]["data"][0]["type"], "pie");
        assert!(analysis["wordcloud_svg"].as_str().unwrap().starts_with("<svg"));
    }

    #[tokio::test]
    async fn api_without_url_is_empty() {
        let (status, body) = get_body("/api/analyze").await;
        assert_eq!(status, StatusCode::OK);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(payload["analysis"].is_null());
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_as_bad_gateway() {
        let (status, body) = get_body("/api/analyze?url=http%3A%2F%2Fbroken.test%2F").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(payload["error"].as_str().unwrap().contains("application/pdf"));

        let (status, html) = get_body("/?url=http%3A%2F%2Fbroken.test%2F").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(html.contains("application/pdf"));
    }

    #[tokio::test]
    async fn wordcloud_endpoint_serves_svg() {
        let response = test_router()
            .oneshot(
                Request::get("/wordcloud.svg?url=http%3A%2F%2Fexample.test%2F")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/svg+xml");

        let (status, _) = get_body("/wordcloud.svg").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (status, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(payload.as_object().unwrap().len(), 2);
    }
}
