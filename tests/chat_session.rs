use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use patient_chat::common::SocketEvent;
use patient_chat::common::events::ABNORMAL_CLOSURE;
use patient_chat::{ChatClient, ClientOptions};

const WAIT: Duration = Duration::from_secs(5);

async fn next_event(events: &mut mpsc::Receiver<SocketEvent>) -> SocketEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("socket event should arrive in time")
        .expect("event channel should stay open until close")
}

/// Đưa sự kiện cho client cho tới khi socket báo đóng.
async fn pump_until_closed(
    client: &mut ChatClient,
    events: &mut mpsc::Receiver<SocketEvent>,
) -> (u16, String) {
    loop {
        let event = next_event(events).await;
        let closed = match &event {
            SocketEvent::Closed { code, reason } => Some((*code, reason.clone())),
            _ => None,
        };
        client.handle_event(event);
        if let Some(closed) = closed {
            return closed;
        }
    }
}

#[tokio::test]
async fn session_against_local_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let (path_tx, path_rx) = oneshot::channel();
    let (frame_tx, frame_rx) = oneshot::channel();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let callback =
            move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                let _ = path_tx.send(request.uri().path().to_string());
                Ok(response)
            };
        let mut ws = tokio_tungstenite::accept_hdr_async(tcp, callback)
            .await
            .unwrap();

        let received = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(_)) => continue,
                other => panic!("expected a text frame, got {other:?}"),
            }
        };
        let _ = frame_tx.send(received);

        for frame in [
            r#"{"message":"*hi*","sender":"provider"}"#,
            "garbage",
            r#"{"message":"second","sender":"bot","format":"markdown"}"#,
        ] {
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }
        ws.close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "server shutdown".into(),
        }))
        .await
        .unwrap();
        let _ = timeout(WAIT, async { while let Some(Ok(_)) = ws.next().await {} }).await;
    });

    let (mut client, mut events) = ChatClient::connect(&host, "42", ClientOptions::default());
    assert_eq!(client.endpoint(), format!("ws://{host}/ws/chat/42/"));

    // Gửi trước khi socket mở; frame nằm chờ trong command channel.
    client.state_mut().input_text = "  Hello **world**  ".to_string();
    assert!(client.submit());
    assert_eq!(client.state().input_text, "");

    let path = timeout(WAIT, path_rx).await.unwrap().unwrap();
    assert_eq!(path, "/ws/chat/42/");

    let frame = timeout(WAIT, frame_rx).await.unwrap().unwrap();
    let frame: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(frame, json!({"message": "Hello **world**", "patient_id": "42"}));

    let (code, reason) = pump_until_closed(&mut client, &mut events).await;
    assert_eq!(code, 1001);
    assert_eq!(reason, "server shutdown");

    let history = &client.state().history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender, "provider");
    assert!(history[0].html.contains("<em>hi</em>"));
    assert_eq!(history[1].sender, "bot");
    assert!(history[1].html.contains("second"));

    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_reports_error_then_abnormal_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let (mut client, mut events) = ChatClient::connect(&host, "42", ClientOptions::default());
    client.state_mut().input_text = "anyone there?".to_string();
    client.submit();

    assert!(matches!(next_event(&mut events).await, SocketEvent::Error(_)));
    let (code, _) = pump_until_closed(&mut client, &mut events).await;
    assert_eq!(code, ABNORMAL_CLOSURE);
    assert!(client.state().history.is_empty());
    assert_eq!(client.state().input_text, "");
}

#[tokio::test]
async fn client_close_performs_close_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let (close_tx, close_rx) = oneshot::channel();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Close(frame) = message {
                let _ = close_tx.send(frame.map(|frame| u16::from(frame.code)));
                break;
            }
        }
        // Tiếp tục đọc để gửi trả lời close frame của client.
        let _ = timeout(WAIT, async { while let Some(Ok(_)) = ws.next().await {} }).await;
    });

    let (mut client, mut events) = ChatClient::connect(&host, "7", ClientOptions::default());
    assert_eq!(next_event(&mut events).await, SocketEvent::Opened);

    client.close();
    let (code, _) = pump_until_closed(&mut client, &mut events).await;
    assert_eq!(code, 1000);
    assert_eq!(timeout(WAIT, close_rx).await.unwrap().unwrap(), Some(1000));

    server.await.unwrap();
}

#[tokio::test]
async fn close_without_server_reply_times_out_as_abnormal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        // Giữ kết nối mở nhưng không đọc nữa: close frame của client không bao giờ được trả lời.
        let _ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        let _ = release_rx.await;
    });

    let (mut client, mut events) = ChatClient::connect(&host, "7", ClientOptions::default());
    assert_eq!(next_event(&mut events).await, SocketEvent::Opened);

    client.close();
    let (code, _) = pump_until_closed(&mut client, &mut events).await;
    assert_eq!(code, ABNORMAL_CLOSURE);

    client.state_mut().input_text = "after close".to_string();
    assert!(!client.submit());

    let _ = release_tx.send(());
    server.await.unwrap();
}

#[tokio::test]
async fn server_error_frame_is_rendered_with_default_options() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::Text(
            r#"{"message": "Error: Patient not found"}"#.to_string(),
        ))
        .await
        .unwrap();
        ws.close(None).await.unwrap();
        let _ = timeout(WAIT, async { while let Some(Ok(_)) = ws.next().await {} }).await;
    });

    let (mut client, mut events) = ChatClient::connect(&host, "999", ClientOptions::default());
    pump_until_closed(&mut client, &mut events).await;

    let history = &client.state().history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].sender, "undefined");
    assert!(history[0].html.contains("Error: Patient not found"));

    server.await.unwrap();
}
