//! Web 服务器模块
//!
//! 提供 `GET /api/translate-stream` SSE 端点和静态前端文件服务

// 标准库导入
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

// 第三方crate导入
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{debug, info};

// 本地模块导入
use crate::api_constants::error_messages;
use crate::error::Result;
use crate::stream::{StreamController, StreamEvent};
use crate::translation_error;

/// 共享应用状态
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<StreamController>,
}

/// 流式翻译查询参数
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub url: Option<String>,
    pub start: Option<String>,
}

impl StreamQuery {
    /// 校验参数，返回 (url, start)
    pub fn validate(self) -> Result<(String, usize)> {
        let url = self
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| translation_error!(input_validation, "url", error_messages::URL_REQUIRED))?;

        let start = match self.start.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| translation_error!(input_validation, raw, error_messages::INVALID_START))?,
        };

        Ok((url, start))
    }
}

/// 创建路由
pub fn create_routes() -> Router<AppState> {
    Router::new().route("/api/translate-stream", get(translate_stream))
}

/// 创建带静态文件服务的完整路由器
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = create_routes().with_state(state);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
}

/// SSE 流式翻译处理器
///
/// 参数错误时直接返回 400 纯文本，不建立事件流
pub async fn translate_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Response {
    let (url, start) = match query.validate() {
        Ok(params) => params,
        Err(e) => {
            debug!("请求参数无效: {}", e);
            let message = match e {
                crate::error::TranslationError::InputValidation { reason, .. } => reason,
                other => other.to_string(),
            };
            return (StatusCode::BAD_REQUEST, message).into_response();
        }
    };

    info!("🌐 流式翻译请求: {} (start={})", url, start);
    let events = state.controller.clone().spawn(url, start);

    Sse::new(sse_events(events)).into_response()
}

/// 将控制器事件转换为 SSE 事件
///
/// 终止事件发出后立即结束响应
fn sse_events(
    events: mpsc::Receiver<StreamEvent>,
) -> impl Stream<Item = std::result::Result<Event, Infallible>> {
    stream::unfold(Some(events), |events| async move {
        let mut events = events?;
        let event = events.recv().await?;
        let remaining = if event.is_terminal() {
            debug!("事件流结束");
            None
        } else {
            Some(events)
        };
        Some((Ok(to_sse_event(&event)), remaining))
    })
}

/// 序列化单个事件
pub fn to_sse_event(event: &StreamEvent) -> Event {
    match event {
        StreamEvent::Batch(batch) => match Event::default().json_data(batch) {
            Ok(event) => event,
            Err(e) => Event::default()
                .event("error")
                .data(serde_json::Value::String(e.to_string()).to_string()),
        },
        StreamEvent::Done => Event::default().event("done").data(""),
        StreamEvent::Error(message) => Event::default()
            .event("error")
            .data(serde_json::Value::String(message.clone()).to_string()),
    }
}

/// 启动 Web 服务器
pub async fn serve(listen_addr: &str, state: AppState, static_dir: Option<&Path>) -> anyhow::Result<()> {
    let app = create_router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|e| anyhow::anyhow!("监听 {} 失败: {}", listen_addr, e))?;

    info!("🚀 服务已启动: http://{}", listen_addr);
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("服务器错误: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StreamSettings;
    use crate::page_cache::PageCache;
    use crate::segmenter::Segmenter;
    use crate::testing::{EchoTranslator, StaticSource};

    fn state(source: Arc<StaticSource>, translator: Arc<EchoTranslator>) -> AppState {
        let controller = StreamController::new(
            Arc::new(PageCache::unbounded()),
            source,
            translator,
            Segmenter::with_default_abbreviations().unwrap(),
            StreamSettings::new().with_pacing_delay(Duration::ZERO),
        );
        AppState {
            controller: Arc::new(controller),
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_query_validation() {
        let query = StreamQuery {
            url: Some("https://example.com".to_string()),
            start: None,
        };
        assert_eq!(query.validate().unwrap(), ("https://example.com".to_string(), 0));

        let query = StreamQuery {
            url: Some("https://example.com".to_string()),
            start: Some("42".to_string()),
        };
        assert_eq!(query.validate().unwrap().1, 42);

        let query = StreamQuery {
            url: Some(String::new()),
            start: None,
        };
        assert!(query.validate().unwrap_err().is_validation());

        let query = StreamQuery {
            url: Some("https://example.com".to_string()),
            start: Some("-3".to_string()),
        };
        assert!(query.validate().is_err());
    }

    #[tokio::test]
    async fn test_missing_url_returns_400() {
        let source = Arc::new(StaticSource::with_sentences(3));
        let translator = Arc::new(EchoTranslator::new());
        let app = create_router(state(source.clone(), translator.clone()), None);

        let (status, _, body) = get(app, "/api/translate-stream").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "url required");
        assert!(!body.contains("data:"));
        assert_eq!(source.calls(), 0);
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_start_returns_400() {
        let app = create_router(
            state(Arc::new(StaticSource::with_sentences(3)), Arc::new(EchoTranslator::new())),
            None,
        );

        let (status, _, body) = get(app, "/api/translate-stream?url=https%3A%2F%2Fexample.com&start=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "start must be a non-negative integer");
    }

    #[tokio::test]
    async fn test_stream_emits_data_then_done() {
        let app = create_router(
            state(Arc::new(StaticSource::with_sentences(4)), Arc::new(EchoTranslator::new())),
            None,
        );

        let (status, content_type, body) =
            get(app, "/api/translate-stream?url=https%3A%2F%2Fexample.com&start=0").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/event-stream"));
        assert!(body.contains(
            r#"data: {"index":0,"original":"Sentence 0. Sentence 1. Sentence 2.","text":"[ja] Sentence 0. Sentence 1. Sentence 2."}"#
        ));
        assert!(body.contains(r#"data: {"index":3,"original":"Sentence 3.","text":"[ja] Sentence 3."}"#));
        assert!(body.contains("event: done"));
        assert!(!body.contains("event: error"));
        assert!(body.find("\"index\":3").unwrap() < body.find("event: done").unwrap());
    }

    #[tokio::test]
    async fn test_sse_stream_ends_after_terminal_event() {
        use futures::StreamExt;

        let (sink, events) = mpsc::channel(4);
        sink.send(StreamEvent::Done).await.unwrap();
        sink.send(StreamEvent::Error("late".to_string())).await.unwrap();

        // 发送端仍存活，流也应在 Done 之后结束
        let collected = tokio::time::timeout(Duration::from_secs(1), sse_events(events).collect::<Vec<_>>())
            .await
            .unwrap();

        assert_eq!(collected.len(), 1);
        drop(sink);
    }

    #[tokio::test]
    async fn test_unreachable_url_emits_error_event() {
        let app = create_router(
            state(Arc::new(StaticSource::unreachable()), Arc::new(EchoTranslator::new())),
            None,
        );

        let (status, _, body) = get(app, "/api/translate-stream?url=https%3A%2F%2Fdown.invalid").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("event: error").count(), 1);
        assert!(body.contains(r#"data: "网络请求失败: getaddrinfo ENOTFOUND https://down.invalid""#));
        assert!(!body.contains("\"index\""));
        assert!(!body.contains("event: done"));
    }
}
