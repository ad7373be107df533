//! Telnet connection handler
//!
//! Handles individual client connections: line framing, driving the
//! `Session`, and writing its output back to the socket.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info};

use crate::client::{Client, Outbound};
use crate::codec::TelnetLineCodec;
use crate::config::Config;
use crate::error::AppError;
use crate::server::RegistryHandle;
use crate::session::{Flow, Session};
use crate::types::ClientId;

/// Handle a new TCP connection
pub async fn handle_connection(
    stream: TcpStream,
    registry: RegistryHandle,
    config: Arc<Config>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    serve_stream(stream, &peer_addr, registry, config).await
}

/// Run the protocol over any byte stream
///
/// Returns once the client quits, the stream ends, or a framing error
/// occurs. The session's registry entry is released in every case.
pub async fn serve_stream<S>(
    stream: S,
    peer_addr: &str,
    registry: RegistryHandle,
    config: Arc<Config>,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let framed = Framed::new(stream, TelnetLineCodec::new(config.max_line_length));
    let (mut line_sink, mut line_stream) = framed.split::<String>();

    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    // Channel for session -> socket lines
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outbound>();
    let mut session = Session::new(Client::new(client_id, out_tx), registry);

    // Spawn write task (Outbound -> socket)
    let write_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            match frame {
                Outbound::Line(line) => {
                    if let Err(e) = line_sink.send(line).await {
                        debug!("Socket write failed for {}: {}", client_id, e);
                        break;
                    }
                }
                Outbound::Close => break,
            }
        }

        // Flush and shut down the write half
        let _ = line_sink.close().await;
        debug!("Write task ended for {}", client_id);
    });

    let result = async {
        session.on_connect().await?;

        while let Some(line) = line_stream.next().await {
            let line = line?;
            debug!("Line from {}: {:?}", client_id, line);
            if session.on_line(&line).await? == Flow::Close {
                break;
            }
        }
        Ok::<(), AppError>(())
    }
    .await;

    if let Err(e) = session.on_disconnect().await {
        debug!("Cleanup for {} failed: {}", client_id, e);
    }

    // Last sender gone once the registry entry is released
    drop(session);
    let _ = write_task.await;

    info!("Client {} disconnected", client_id);

    result
}
