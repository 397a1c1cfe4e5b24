//! HTTP + WebSocket front end.
//!
//! - `GET /`       host page that plots the stream
//! - `GET /ws`     duplex event channel, one session per socket
//! - `GET /health` liveness probe

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    http::HeaderValue,
    response::{Html, IntoResponse},
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::session::{Connection, SessionHandler};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
struct AppState {
    handler: Arc<SessionHandler>,
}

/// Build the application router for `config`.
pub fn router(config: &ServerConfig) -> Router {
    let state = AppState {
        handler: Arc::new(SessionHandler::new(config)),
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ws", get(websocket_handler))
        .layer(cors_layer(config))
        .layer(trace_layer)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        // Origins were checked in ServerConfig::validate.
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        AllowOrigin::list(origins)
    };
    CorsLayer::new().allow_origin(origin).allow_methods(Any)
}

/// Bind `config.bind_addr()` and serve until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.bind_addr()).await?;
    serve_on(listener, config, shutdown).await
}

/// Serve on an already bound listener.
pub async fn serve_on<F>(listener: TcpListener, config: &ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Waveplot listening on http://{}", addr);
    tracing::info!("WebSocket channel at ws://{}/ws", addr);

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state.handler))
}

async fn handle_websocket(socket: WebSocket, handler: Arc<SessionHandler>) {
    let (mut sender, mut receiver) = socket.split();
    let (conn, mut outbox) = Connection::open();
    let id = conn.id();

    // Task: drain this connection's outbox to its socket
    let send_task = tokio::spawn(async move {
        while let Some(event) = outbox.recv().await {
            let Some(json) = encode(&event) else {
                continue;
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    handler.on_connect(&conn).await;

    // Frames are handled one at a time so replies keep request order.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match ClientEvent::decode(text.as_str()) {
                Ok(event) => handler.on_event(&conn, event).await,
                Err(e) => tracing::warn!("Invalid frame from {}: {}", id, e),
            },
            Ok(Message::Binary(_)) => {
                tracing::warn!("Ignoring binary frame from {}", id);
            }
            Ok(Message::Close(_)) => {
                tracing::debug!("Client {} closed connection", id);
                break;
            }
            Err(e) => {
                tracing::warn!("WebSocket error on {}: {}", id, e);
                break;
            }
            _ => {} // axum handles ping/pong automatically
        }
    }

    handler.on_disconnect(conn);
    send_task.abort();
}

fn encode(event: &ServerEvent) -> Option<String> {
    match event.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!("Failed to serialize {}: {}", event.name(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn index_serves_host_page() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("update_params"));
        assert!(text.contains("waveform_data"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn any_origin_allowed_by_default() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://blog.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn listed_origin_only() {
        let config = ServerConfig {
            cors_origins: vec!["https://allowed.example".to_string()],
            ..ServerConfig::default()
        };
        let allowed = router(&config)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://allowed.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://allowed.example"
        );

        let denied = router(&config)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://other.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
