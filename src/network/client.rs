use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::common::events::{ABNORMAL_CLOSURE, NO_STATUS_RECEIVED};
use crate::common::{SocketCommand, SocketEvent};
use crate::error::ChatResult;

use super::transport::open_stream;

/// Thời gian tối đa chờ server trả lời close frame.
pub const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(3);

/// Giữ kết nối WebSocket duy nhất, chuyển frame qua lại với ChatClient.
/// Không bao giờ tự kết nối lại.
pub struct ChatSocket {
    endpoint: String,
    event_sender: mpsc::Sender<SocketEvent>,
    command_receiver: mpsc::Receiver<SocketCommand>,
    close_timeout: Duration,
}

impl ChatSocket {
    pub fn new(
        endpoint: String,
        event_sender: mpsc::Sender<SocketEvent>,
        command_receiver: mpsc::Receiver<SocketCommand>,
    ) -> Self {
        Self {
            endpoint,
            event_sender,
            command_receiver,
            close_timeout: CLOSE_HANDSHAKE_TIMEOUT,
        }
    }

    pub fn with_close_timeout(mut self, close_timeout: Duration) -> Self {
        self.close_timeout = close_timeout;
        self
    }

    pub async fn run(mut self) -> ChatResult<()> {
        // Lệnh gửi trước khi kết nối mở vẫn nằm trong channel cho tới khi vào vòng lặp.
        let stream = match open_stream(&self.endpoint).await {
            Ok(stream) => stream,
            Err(err) => {
                self.emit(SocketEvent::Error(err.to_string())).await;
                self.emit(SocketEvent::Closed {
                    code: ABNORMAL_CLOSURE,
                    reason: String::new(),
                })
                .await;
                return Err(err);
            }
        };

        log::info!("Connected to {}", self.endpoint);
        self.emit(SocketEvent::Opened).await;

        let (mut sink, mut frames) = stream.split();
        let mut closing = false;
        let mut close_deadline = Instant::now();

        loop {
            tokio::select! {
                command = self.command_receiver.recv(), if !closing => {
                    match command {
                        Some(SocketCommand::SendFrame(text)) => {
                            if let Err(err) = sink.send(WsMessage::Text(text)).await {
                                log::warn!("Failed to write frame: {err}");
                                self.emit(SocketEvent::Error(err.to_string())).await;
                            }
                        }
                        Some(SocketCommand::Close) | None => {
                            closing = true;
                            close_deadline = Instant::now() + self.close_timeout;
                            let frame = CloseFrame {
                                code: CloseCode::Normal,
                                reason: "".into(),
                            };
                            if let Err(err) = sink.send(WsMessage::Close(Some(frame))).await {
                                log::debug!("Close handshake could not start: {err}");
                                self.emit(SocketEvent::Closed {
                                    code: ABNORMAL_CLOSURE,
                                    reason: String::new(),
                                })
                                .await;
                                break;
                            }
                        }
                    }
                }
                _ = sleep_until(close_deadline), if closing => {
                    log::warn!(
                        "No close reply from {} within {:?}; dropping connection",
                        self.endpoint,
                        self.close_timeout
                    );
                    self.emit(SocketEvent::Closed {
                        code: ABNORMAL_CLOSURE,
                        reason: String::new(),
                    })
                    .await;
                    break;
                }
                frame = frames.next() => {
                    match frame {
                        Some(Ok(WsMessage::Text(text))) => {
                            self.emit(SocketEvent::Frame(text)).await;
                        }
                        Some(Ok(WsMessage::Close(frame))) => {
                            let (code, reason) = match frame {
                                Some(frame) => (u16::from(frame.code), frame.reason.into_owned()),
                                None => (NO_STATUS_RECEIVED, String::new()),
                            };
                            self.emit(SocketEvent::Closed { code, reason }).await;
                            break;
                        }
                        Some(Ok(WsMessage::Binary(data))) => {
                            log::debug!("Ignoring {} byte binary frame", data.len());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            self.emit(SocketEvent::Error(err.to_string())).await;
                            self.emit(SocketEvent::Closed {
                                code: ABNORMAL_CLOSURE,
                                reason: String::new(),
                            })
                            .await;
                            break;
                        }
                        None => {
                            let code = if closing {
                                u16::from(CloseCode::Normal)
                            } else {
                                ABNORMAL_CLOSURE
                            };
                            self.emit(SocketEvent::Closed {
                                code,
                                reason: String::new(),
                            })
                            .await;
                            break;
                        }
                    }
                }
            }
        }

        // Đẩy close frame trả lời (nếu có) ra socket; peer im lặng thì bỏ qua.
        let _ = timeout(self.close_timeout, sink.close()).await;
        log::debug!("Socket loop for {} finished", self.endpoint);
        Ok(())
    }

    async fn emit(&self, event: SocketEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::debug!("Chat client is gone; dropping socket event: {err}");
        }
    }
}
