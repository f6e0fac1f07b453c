//! Host agent and sync client over a real WebSocket

use fractal_sync::client::{SnapshotChannel, SyncClient, SyncEvent, WebSocketChannel};
use fractal_sync::error::SyncError;
use fractal_sync::host::{HostAgent, HostConfig, HostServer};
use fractal_sync::tree::ChangeKind;
use futures::{SinkExt, StreamExt};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

struct RunningHost {
    url: String,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RunningHost {
    async fn start() -> Self {
        let config = HostConfig {
            bind: "127.0.0.1".to_string(),
            port: 0,
        };
        let server = HostServer::bind(HostAgent::default(), &config).await.unwrap();
        let url = format!("ws://{}", server.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            server
                .run(async {
                    let _ = stopped.await;
                })
                .await
                .unwrap();
        });
        Self {
            url,
            stop: Some(stop),
            task,
        }
    }

    async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_snapshot_over_websocket() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "a").unwrap();

    let host = RunningHost::start().await;
    let channel = WebSocketChannel::connect(&host.url, Duration::from_secs(5))
        .await
        .unwrap();

    let response = channel
        .request_snapshot(&temp_dir.path().to_string_lossy())
        .await
        .unwrap();
    assert_eq!(response.tree.children().len(), 1);
    assert!(response.latency_ms >= 0.0);

    drop(channel);
    host.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_requests_share_one_connection() {
    let dirs: Vec<TempDir> = (0..4).map(|_| TempDir::new().unwrap()).collect();
    for (i, dir) in dirs.iter().enumerate() {
        for j in 0..=i {
            fs::write(dir.path().join(format!("f{}", j)), "x").unwrap();
        }
    }

    let host = RunningHost::start().await;
    let channel = WebSocketChannel::connect(&host.url, Duration::from_secs(5))
        .await
        .unwrap();

    let paths: Vec<String> = dirs
        .iter()
        .map(|d| d.path().to_string_lossy().into_owned())
        .collect();
    let requests = paths.iter().map(|p| channel.request_snapshot(p));
    let responses = futures::future::join_all(requests).await;

    for (i, response) in responses.into_iter().enumerate() {
        let response = response.unwrap();
        assert_eq!(response.tree.path, paths[i]);
        assert_eq!(response.tree.children().len(), i + 1);
    }

    drop(channel);
    host.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_raw_frames_unknown_type_and_garbage() {
    let host = RunningHost::start().await;
    let (mut socket, _) = connect_async(host.url.as_str()).await.unwrap();

    socket
        .send(Message::Text(
            r#"{"id":"req-1","type":"EXECUTE_COMMAND","payload":"ls"}"#.to_string(),
        ))
        .await
        .unwrap();
    let reply = next_text(&mut socket).await;
    let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(value["id"], "req-1");
    assert_eq!(value["type"], "ERROR");
    assert_eq!(value["error"], "Unknown command type: EXECUTE_COMMAND");

    socket
        .send(Message::Text("not json".to_string()))
        .await
        .unwrap();
    let reply = next_text(&mut socket).await;
    let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(value["type"], "ERROR");
    assert!(value.get("id").is_none());
    assert!(value["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to parse message"));

    socket.close(None).await.unwrap();
    host.stop().await;
}

async fn next_text<S>(socket: &mut S) -> String
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => return text,
            Some(Ok(_)) => continue,
            other => panic!("unexpected frame: {:?}", other),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sync_client_detects_remote_change() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a.txt"), "one").unwrap();
    let path = root.to_string_lossy().into_owned();

    let host = RunningHost::start().await;
    let channel = WebSocketChannel::connect(&host.url, Duration::from_secs(5))
        .await
        .unwrap();
    let client = SyncClient::new(channel);

    assert!(matches!(
        client.poll_once(&path).await.unwrap(),
        SyncEvent::Initial { .. }
    ));

    fs::write(root.join("b.txt"), "two").unwrap();
    match client.poll_once(&path).await.unwrap() {
        SyncEvent::Changed { changes, .. } => {
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].path, format!("{}/b.txt", path));
            assert_eq!(changes[0].change, ChangeKind::Added);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    drop(client);
    host.stop().await;
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = WebSocketChannel::connect(&format!("ws://{}", addr), Duration::from_secs(2)).await;
    assert!(matches!(
        result,
        Err(SyncError::Transport(_)) | Err(SyncError::Timeout(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_request_after_host_hangs_up_fails_fast() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let host = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = socket.close(None).await;
    });

    let channel = WebSocketChannel::connect(&url, Duration::from_secs(30))
        .await
        .unwrap();
    host.await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while channel.is_connected() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("client never noticed the close");

    for _ in 0..2 {
        let result = tokio::time::timeout(Duration::from_secs(5), channel.request_snapshot("/tmp"))
            .await
            .expect("request waited for its full timeout");
        assert!(matches!(result, Err(SyncError::Disconnected)));
    }
}
