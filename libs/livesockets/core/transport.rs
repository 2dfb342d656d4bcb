//! WebSocket transport backed by tokio-tungstenite

use crate::traits::*;
use async_trait::async_trait;
use futures::{future, SinkExt, StreamExt};
use std::borrow::Cow;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// Dials real WebSocket connections
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Transport> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::WebSocket(e.to_string()))?;

        let (write, read) = ws_stream.split();

        let sink = write
            .sink_map_err(|e| ChannelError::WebSocket(e.to_string()))
            .with(|frame: Outbound| future::ready(Ok::<_, ChannelError>(outbound_to_tungstenite(frame))));

        let stream = read.filter_map(|msg| future::ready(tungstenite_to_inbound(msg)));

        Ok(Transport {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}

/// Convert an outbound frame to a tungstenite message
fn outbound_to_tungstenite(frame: Outbound) -> Message {
    match frame {
        Outbound::Message(WsMessage::Text(text)) => Message::Text(text),
        Outbound::Message(WsMessage::Binary(data)) => Message::Binary(data),
        Outbound::Close(close) => Message::Close(Some(CloseFrame {
            code: CloseCode::from(close.code),
            reason: Cow::Owned(close.reason),
        })),
    }
}

/// Convert a tungstenite message to an inbound frame
///
/// Protocol pings/pongs are answered by tungstenite itself and never
/// surface here.
fn tungstenite_to_inbound(
    msg: std::result::Result<Message, tokio_tungstenite::tungstenite::Error>,
) -> Option<Result<Inbound>> {
    match msg {
        Ok(Message::Text(text)) => Some(Ok(Inbound::Message(WsMessage::Text(text)))),
        Ok(Message::Binary(data)) => Some(Ok(Inbound::Message(WsMessage::Binary(data)))),
        Ok(Message::Close(frame)) => {
            let close = frame
                .map(|f| CloseInfo::new(u16::from(f.code), f.reason.into_owned()))
                .unwrap_or_else(|| CloseInfo::new(NORMAL_CLOSURE, ""));
            Some(Ok(Inbound::Closed(close)))
        }
        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {
            debug!("Ignoring protocol-level frame");
            None
        }
        Err(e) => Some(Err(ChannelError::WebSocket(e.to_string()))),
    }
}
