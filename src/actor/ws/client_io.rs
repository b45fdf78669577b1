use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::WebSocketStream;
use tungstenite::protocol::Message;

use super::queue::ClientQueue;
use super::registry::{ClientId, Registry};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Drive one upgraded connection until the peer goes away.
///
/// Registers the client, spawns its writer task, then reads frames only to
/// notice close or error. Whatever the client sends is ignored. When the
/// writer stops first (write failure, prune, shutdown) the read half is
/// dropped with it and the connection closes.
pub async fn serve_client(ws: WebSocketStream<TcpStream>, addr: SocketAddr, registry: Arc<Registry>) {
    let (sink, mut stream) = ws.split();
    let (id, queue) = registry.register(addr);
    crate::debug!("ws"; "client {} connected from {} (total: {})", id, addr, registry.len());

    let mut writer = tokio::spawn(write_loop(sink, id, queue, Arc::clone(&registry)));

    tokio::select! {
        () = read_until_closed(&mut stream, id) => {}
        _ = &mut writer => crate::debug!("ws"; "client {} writer stopped", id),
    }

    if registry.remove(id) {
        crate::debug!("ws"; "client {} disconnected (total: {})", id, registry.len());
    }
}

async fn read_until_closed(stream: &mut SplitStream<WebSocketStream<TcpStream>>, id: ClientId) {
    loop {
        match stream.next().await {
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                crate::debug!("ws"; "client {} read error: {}", id, e);
                return;
            }
        }
    }
}

/// Writer task: the only place that touches the client's sink.
async fn write_loop(mut sink: WsSink, id: ClientId, queue: Arc<ClientQueue>, registry: Arc<Registry>) {
    while let Some(frame) = queue.next().await {
        if let Err(e) = sink.send(frame).await {
            crate::debug!("ws"; "client {} write failed: {}", id, e);
            queue.close();
            if registry.remove(id) {
                crate::debug!("ws"; "client {} dropped (total: {})", id, registry.len());
            }
            return;
        }
    }

    // Queue closed by disconnect or shutdown
    let _ = sink.send(Message::Close(None)).await;
    let _ = sink.close().await;
}
