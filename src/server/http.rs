// src/server/http.rs

//! Preview server: static files from the output root plus the live-reload
//! channel.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use percent_encoding::percent_decode_str;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, error, info, warn};

use crate::config::ServerSection;
use crate::server::{LiveReload, ReloadMessage};

pub const CLIENT_PATH: &str = "/__livereload.js";
pub const SOCKET_PATH: &str = "/__livereload";
pub const CLIENT_SNIPPET: &str = "<script src=\"/__livereload.js\"></script>";

const CLIENT_JS: &str = include_str!("livereload.js");

#[derive(Clone)]
struct ServerState {
    output_root: PathBuf,
    notifier: LiveReload,
}

pub fn router(output_root: PathBuf, notifier: LiveReload) -> Router {
    let state = ServerState {
        output_root,
        notifier,
    };
    Router::new()
        .route(CLIENT_PATH, get(client_script))
        .route(SOCKET_PATH, get(socket_upgrade))
        .fallback(serve_asset)
        .with_state(state)
}

/// A running preview server.
#[derive(Debug)]
pub struct PreviewServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl PreviewServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

/// Bind `[server]` and serve `output_root` in the background.
pub async fn start(
    cfg: &ServerSection,
    output_root: PathBuf,
    notifier: LiveReload,
) -> anyhow::Result<PreviewServer> {
    let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port))
        .await
        .with_context(|| format!("binding preview server to {}:{}", cfg.host, cfg.port))?;
    let addr = listener.local_addr().context("reading bound address")?;

    let app = router(output_root, notifier);
    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!(error = %err, "preview server stopped");
        }
    });

    info!("preview server listening on http://{addr}");
    Ok(PreviewServer { addr, handle })
}

async fn client_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CLIENT_JS,
    )
}

async fn socket_upgrade(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    let rx = state.notifier.subscribe();
    ws.on_upgrade(move |socket| client_session(socket, rx))
}

async fn client_session(
    socket: WebSocket,
    mut rx: tokio::sync::broadcast::Receiver<ReloadMessage>,
) {
    let (mut sink, mut incoming) = socket.split();
    debug!("live-reload client connected");

    loop {
        tokio::select! {
            msg = rx.recv() => {
                let msg = match msg {
                    Ok(msg) => msg,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "live-reload client lagging; messages dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let Ok(text) = serde_json::to_string(&msg) else {
                    continue;
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            frame = incoming.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!("live-reload client disconnected");
}

/// Map a percent-encoded request path onto a file below the output root.
/// `None` for paths that are not UTF-8 or try to escape the root.
fn request_file(output_root: &Path, uri_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;
    let rel = decoded.trim_start_matches('/');
    if rel
        .split('/')
        .any(|seg| seg == ".." || seg.contains('\\') || seg.contains('\0'))
    {
        return None;
    }
    let mut path = output_root.join(rel);
    if decoded.ends_with('/') {
        path.push("index.html");
    }
    Some(path)
}

/// Insert the client snippet before the last `</body>`, or append it.
pub fn inject_client(html: &str) -> String {
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => format!("{}{}{}", &html[..idx], CLIENT_SNIPPET, &html[idx..]),
        None => format!("{html}{CLIENT_SNIPPET}"),
    }
}

async fn serve_asset(State(state): State<ServerState>, req: Request<Body>) -> Response {
    let Some(path) = request_file(&state.output_root, req.uri().path()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    if path.extension().is_some_and(|e| e == "html") {
        if let Ok(html) = tokio::fs::read_to_string(&path).await {
            return (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                inject_client(&html),
            )
                .into_response();
        }
    }

    match ServeDir::new(&state.output_root).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_before_closing_body() {
        let out = inject_client("<html><body><p>x</p></BODY></html>");
        assert_eq!(
            out,
            format!("<html><body><p>x</p>{CLIENT_SNIPPET}</BODY></html>")
        );
    }

    #[test]
    fn appends_when_no_body() {
        assert_eq!(inject_client("<p>x</p>"), format!("<p>x</p>{CLIENT_SNIPPET}"));
    }

    #[test]
    fn rejects_parent_segments() {
        let root = Path::new("/srv/dist");
        assert!(request_file(root, "/../secret").is_none());
        assert!(request_file(root, "/a/../../b").is_none());
        assert_eq!(
            request_file(root, "/docs/").unwrap(),
            PathBuf::from("/srv/dist/docs/index.html")
        );
    }

    #[test]
    fn decodes_escaped_request_paths() {
        let root = Path::new("/srv/dist");
        assert_eq!(
            request_file(root, "/my%20page.html").unwrap(),
            PathBuf::from("/srv/dist/my page.html")
        );
        assert_eq!(
            request_file(root, "/caf%C3%A9/").unwrap(),
            PathBuf::from("/srv/dist/café/index.html")
        );
    }

    #[test]
    fn escaped_traversal_is_still_rejected() {
        let root = Path::new("/srv/dist");
        assert!(request_file(root, "/%2e%2e/secret").is_none());
        assert!(request_file(root, "/a/%2E%2E%2F%2E%2E/b").is_none());
        assert_eq!(
            request_file(root, "/%2Fetc/passwd").unwrap(),
            PathBuf::from("/srv/dist/etc/passwd")
        );
        assert!(request_file(root, "/%FF.html").is_none());
    }
}
