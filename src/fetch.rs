use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;

use crate::config::FetchConfig;

/// 抓取到的原始文档，正文统一按 UTF-8 解码
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl RawDocument {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            body: body.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求 {url} 失败：{source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} 返回的内容不是文本（Content-Type: {content_type}）")]
    NotText { url: String, content_type: String },

    #[error("{url} 的响应体超过 {limit} 字节上限")]
    TooLarge { url: String, limit: usize },

    #[error("创建 HTTP 客户端失败：{0}")]
    Client(#[source] reqwest::Error),
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<RawDocument, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &str) -> Result<RawDocument, FetchError> {
        let request_err = |source| FetchError::Request {
            url: address.to_string(),
            source,
        };

        let mut resp = self.client.get(address).send().await.map_err(request_err)?;
        let status = resp.status();
        let final_url = resp.url().to_string();

        if let Some(ct) = resp.headers().get(CONTENT_TYPE) {
            let ct = ct.to_str().unwrap_or_default().to_ascii_lowercase();
            if !is_textual(&ct) {
                return Err(FetchError::NotText {
                    url: final_url,
                    content_type: ct,
                });
            }
        }

        if !status.is_success() {
            // 非 2xx 仍然分析返回的页面
            tracing::warn!("{final_url} 返回状态码 {status}");
        }

        if resp
            .content_length()
            .is_some_and(|len| len as usize > self.max_body_bytes)
        {
            return Err(FetchError::TooLarge {
                url: final_url,
                limit: self.max_body_bytes,
            });
        }

        // 分块读取，超过上限立即停止，不依赖 Content-Length
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(request_err)? {
            if bytes.len().saturating_add(chunk.len()) > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    url: final_url,
                    limit: self.max_body_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!("已抓取 {final_url}：{} 字节", bytes.len());

        Ok(RawDocument {
            url: final_url,
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime.is_empty()
        || mime.starts_with("text/")
        || mime == "application/xhtml+xml"
        || mime == "application/xml"
        || mime.ends_with("+xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::{Body, Bytes};
    use axum::routing::get;
    use std::net::SocketAddr;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[test]
    fn textual_content_types() {
        assert!(is_textual("text/html; charset=gbk"));
        assert!(is_textual("text/plain"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(is_textual("application/rss+xml"));
        assert!(!is_textual("application/pdf"));
        assert!(!is_textual("image/png"));
    }

    #[tokio::test]
    async fn fetches_html_body() {
        let app = Router::new().route(
            "/page",
            get(|| async {
                (
                    [("content-type", "text/html; charset=utf-8")],
                    "<html><body>你好 world</body></html>",
                )
            }),
        );
        let addr = serve(app).await;

        let doc = fetcher()
            .fetch(&format!("http://{addr}/page"))
            .await
            .unwrap();
        assert_eq!(doc.status, 200);
        assert!(doc.body.contains("你好 world"));
    }

    #[tokio::test]
    async fn rejects_binary_content() {
        let app = Router::new().route(
            "/file.pdf",
            get(|| async { ([("content-type", "application/pdf")], "%PDF-1.4") }),
        );
        let addr = serve(app).await;

        let err = fetcher()
            .fetch(&format!("http://{addr}/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotText { .. }));
    }

    #[tokio::test]
    async fn error_status_still_returns_body() {
        let app = Router::new().fallback(|| async {
            (
                axum::http::StatusCode::NOT_FOUND,
                [("content-type", "text/html")],
                "<html><body>missing page</body></html>",
            )
        });
        let addr = serve(app).await;

        let doc = fetcher()
            .fetch(&format!("http://{addr}/nope"))
            .await
            .unwrap();
        assert_eq!(doc.status, 404);
        assert!(doc.body.contains("missing page"));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = Router::new().route(
            "/big",
            get(|| async { ([("content-type", "text/plain")], "x".repeat(64)) }),
        );
        let addr = serve(app).await;

        let small = HttpFetcher::new(&FetchConfig {
            max_body_bytes: 16,
            ..FetchConfig::default()
        })
        .unwrap();
        let err = small
            .fetch(&format!("http://{addr}/big"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 16, .. }));
    }

    #[tokio::test]
    async fn endless_stream_without_length_is_cut_at_limit() {
        let app = Router::new().route(
            "/stream",
            get(|| async {
                let chunks = futures_util::stream::repeat_with(|| {
                    Ok::<_, std::io::Error>(Bytes::from_static(&[b'x'; 32]))
                });
                ([("content-type", "text/plain")], Body::from_stream(chunks))
            }),
        );
        let addr = serve(app).await;

        let small = HttpFetcher::new(&FetchConfig {
            max_body_bytes: 16,
            timeout_secs: 5,
            ..FetchConfig::default()
        })
        .unwrap();
        let started = std::time::Instant::now();
        let err = small
            .fetch(&format!("http://{addr}/stream"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 16, .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn unreachable_host_propagates() {
        let err = fetcher().fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
