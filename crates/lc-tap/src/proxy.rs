//! HTTP proxy exposing a single ADQL route in front of the TAP service.
//!
//! `POST {route}` with `{"adql": "..."}` forwards the query to `{tap}/sync`
//! with the server-side bearer token and relays the upstream status and body.
//! JSON bodies are re-emitted as JSON; anything else goes back as plain text.

use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tower_http::cors::CorsLayer;
use tracing::info;

use lc_config::{LightcurveConfig, ProxyConfig};

use crate::client::{ReplyBody, TapClient, TapReply};
use crate::error::{ProxyError, TapError};

/// Build the proxy router around `client`.
pub fn router(client: TapClient, config: &ProxyConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            &config.route,
            post(adql_handler).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors)
        .with_state(client)
}

/// Extract the query text from a request body.
///
/// An empty body, a non-object body, or a missing/empty/null `adql` field is
/// [`ProxyError::MissingQuery`]. Unparseable JSON is
/// [`ProxyError::MalformedBody`].
pub fn extract_adql(body: &[u8]) -> Result<String, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProxyError::MissingQuery);
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ProxyError::MalformedBody(e.to_string()))?;

    match value.get("adql") {
        Some(Value::String(adql)) if !adql.is_empty() => Ok(adql.clone()),
        None | Some(Value::Null | Value::String(_)) => Err(ProxyError::MissingQuery),
        Some(other) => Err(ProxyError::MalformedBody(format!(
            "adql must be a string, got {other}"
        ))),
    }
}

async fn adql_handler(
    State(client): State<TapClient>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let adql = extract_adql(&body)?;
    let reply = client.sync_query(&adql).await.map_err(ProxyError::from)?;
    info!(status = reply.status, "relayed adql query");
    Ok(relay(reply))
}

async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

/// Turn an upstream reply into the proxy's response, keeping its status.
fn relay(reply: TapReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    match reply.body {
        ReplyBody::Json(value) => (status, Json(value)).into_response(),
        ReplyBody::Text(text) => (
            status,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
    }
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns [`TapError::Http`] if the client cannot be built and
/// [`TapError::Io`] if binding or serving fails.
pub async fn serve(config: &LightcurveConfig) -> Result<(), TapError> {
    let client = TapClient::new(&config.tap)?;
    let app = router(client.clone(), &config.proxy);

    let address = config.proxy.bind_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;

    info!(
        port = config.proxy.port,
        route = %config.proxy.route,
        tap = %client.sync_url(),
        "Proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Proxy shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_query_text() {
        assert_eq!(
            extract_adql(br#"{"adql":"SELECT 1"}"#).unwrap(),
            "SELECT 1"
        );
    }

    #[test]
    fn missing_or_empty_query_is_rejected() {
        for body in [&b""[..], b"{}", br#"{"adql":""}"#, br#"{"adql":null}"#, b"[]"] {
            assert!(
                matches!(extract_adql(body), Err(ProxyError::MissingQuery)),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn broken_json_is_malformed() {
        assert!(matches!(
            extract_adql(b"{adql:"),
            Err(ProxyError::MalformedBody(_))
        ));
        assert!(matches!(
            extract_adql(br#"{"adql":42}"#),
            Err(ProxyError::MalformedBody(_))
        ));
    }

    #[test]
    fn relay_keeps_upstream_status() {
        let resp = relay(TapReply::interpret(418, "text/plain", "teapot".into()));
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(
            resp.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
