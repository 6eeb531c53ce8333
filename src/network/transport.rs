use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::ChatResult;

pub type ChatStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub async fn open_stream(endpoint: &str) -> ChatResult<ChatStream> {
    let (stream, response) = connect_async(endpoint).await?;
    log::debug!(
        "WebSocket handshake with {endpoint} completed ({})",
        response.status()
    );
    Ok(stream)
}
