mod common;

use std::time::Duration;

use assetflow::config::ServerSection;
use assetflow::server::http::{CLIENT_PATH, CLIENT_SNIPPET, SOCKET_PATH};
use assetflow::server::{self, LiveReload, PreviewServer, ReloadMessage};
use common::*;
use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;

async fn start_server(project: &TempProject, notifier: LiveReload) -> PreviewServer {
    let cfg = ServerSection {
        host: "127.0.0.1".into(),
        port: 0,
    };
    server::start(&cfg, project.path("dist"), notifier)
        .await
        .unwrap()
}

async fn http_get(server: &PreviewServer, path: &str) -> String {
    let mut stream = TcpStream::connect(server.addr()).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

async fn wait_for_clients(notifier: &LiveReload, n: usize) {
    while notifier.client_count() < n {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn html_pages_get_the_client_snippet() {
    init_tracing();
    let project = TempProject::new();
    project.write("dist/index.html", "<html><body><p>hi</p></body></html>");
    let server = start_server(&project, LiveReload::new()).await;

    let response = with_timeout(http_get(&server, "/")).await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains(&format!("<p>hi</p>{CLIENT_SNIPPET}</body>")));

    server.shutdown();
}

#[tokio::test]
async fn pages_with_escaped_names_get_the_client_snippet() {
    init_tracing();
    let project = TempProject::new();
    project.write("dist/my page.html", "<html><body><p>spaced</p></body></html>");
    let server = start_server(&project, LiveReload::new()).await;

    let response = with_timeout(http_get(&server, "/my%20page.html")).await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains(&format!("<p>spaced</p>{CLIENT_SNIPPET}</body>")));

    let escaped = with_timeout(http_get(&server, "/%2e%2e/Assetflow.toml")).await;
    assert!(escaped.starts_with("HTTP/1.1 400"));

    server.shutdown();
}

#[tokio::test]
async fn other_assets_are_served_verbatim() {
    init_tracing();
    let project = TempProject::new();
    project.write("dist/css/main.css", "body{margin:0}");
    let server = start_server(&project, LiveReload::new()).await;

    let response = with_timeout(http_get(&server, "/css/main.css")).await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("body{margin:0}"));
    assert!(!response.contains(CLIENT_SNIPPET));

    let missing = with_timeout(http_get(&server, "/nope.css")).await;
    assert!(missing.starts_with("HTTP/1.1 404"));

    server.shutdown();
}

#[tokio::test]
async fn client_script_is_served() {
    init_tracing();
    let project = TempProject::new();
    let server = start_server(&project, LiveReload::new()).await;

    let response = with_timeout(http_get(&server, CLIENT_PATH)).await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("application/javascript"));
    assert!(response.contains("WebSocket"));

    server.shutdown();
}

#[tokio::test]
async fn connected_clients_receive_stream_and_reload_messages() {
    init_tracing();
    let project = TempProject::new();
    let notifier = LiveReload::new();
    let server = start_server(&project, notifier.clone()).await;

    let url = format!("ws://{}{}", server.addr(), SOCKET_PATH);
    let (mut socket, _) = with_timeout(connect_async(url)).await.unwrap();
    with_timeout(wait_for_clients(&notifier, 1)).await;

    assert_eq!(notifier.stream(["css/main.css", "css/main.css.map"]), 1);
    assert_eq!(notifier.reload(), 1);

    let mut received = Vec::new();
    for _ in 0..2 {
        let frame = with_timeout(socket.next()).await.unwrap().unwrap();
        let msg: ReloadMessage = serde_json::from_str(frame.to_text().unwrap()).unwrap();
        received.push(msg);
    }
    assert_eq!(
        received,
        vec![
            ReloadMessage::Stream {
                paths: vec!["css/main.css".into()]
            },
            ReloadMessage::Reload,
        ]
    );

    server.shutdown();
}

#[tokio::test]
async fn notifications_without_clients_are_dropped() {
    let notifier = LiveReload::new();
    assert_eq!(notifier.client_count(), 0);
    assert_eq!(notifier.reload(), 0);
}
