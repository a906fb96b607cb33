//! Message relay transport. The relay forwards chat messages as JSON text
//! frames of the form `{"chat": "...", "text": "..."}`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::responder::KeywordResponder;

/// Wait before reconnecting after the relay drops or refuses us.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Conversation the message belongs to. Replies go to the same chat.
    pub chat: String,
    pub text: String,
}

#[async_trait]
pub trait Transport: Send {
    /// Next incoming message, or `None` once the connection is closed.
    async fn recv(&mut self) -> Result<Option<ChatMessage>>;
    async fn send(&mut self, message: &ChatMessage) -> Result<()>;
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url)
            .await
            .with_context(|| format!("failed to connect to relay {url}"))?;
        Ok(Self { stream })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn recv(&mut self) -> Result<Option<ChatMessage>> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => match serde_json::from_str(text.as_str()) {
                    Ok(message) => return Ok(Some(message)),
                    Err(e) => warn!("Ignoring malformed relay frame: {}", e),
                },
                Message::Ping(data) => self.stream.send(Message::Pong(data)).await?,
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    async fn send(&mut self, message: &ChatMessage) -> Result<()> {
        let json = serde_json::to_string(message)?;
        self.stream.send(Message::text(json)).await?;
        Ok(())
    }
}

/// Answer messages until the transport closes. Messages without a keyword
/// get no reply.
pub async fn serve<T: Transport>(transport: &mut T, responder: &KeywordResponder) -> Result<()> {
    while let Some(message) = transport.recv().await? {
        debug!("Message in {}: {}", message.chat, message.text);

        let Some(reply) = responder.respond(&message.text) else {
            continue;
        };
        transport
            .send(&ChatMessage { chat: message.chat, text: reply })
            .await?;
    }
    Ok(())
}

/// Connect to the relay and serve forever, reconnecting after failures.
pub async fn run(url: &str, responder: KeywordResponder) {
    loop {
        match WsTransport::connect(url).await {
            Ok(mut transport) => {
                info!("Bot connected to {}", url);
                match serve(&mut transport, &responder).await {
                    Ok(()) => info!("Relay closed the connection"),
                    Err(e) => warn!("Relay connection failed: {:#}", e),
                }
            }
            Err(e) => warn!("{:#}", e),
        }

        info!("Reconnecting in {}s", RECONNECT_DELAY.as_secs());
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
