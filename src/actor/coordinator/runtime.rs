use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;
use crate::actor::tail::{GrowthSource, TailActor};
use crate::actor::ws::WsActor;
use crate::serve::Acceptor;

/// How often the crossbeam shutdown channel is checked.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
/// How long the WsActor gets to close its clients.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Run all actors concurrently.
///
/// Stops on the shutdown signal or when the TailActor finishes, whichever
/// comes first, then lets the WsActor close every client.
pub(super) async fn run_actors<S: GrowthSource>(
    tail: TailActor<S>,
    ws: WsActor,
    acceptor: Acceptor,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let ws_handle = tokio::spawn(ws.run());
    let accept_handle = tokio::spawn(acceptor.run());
    let mut tail_handle = tokio::spawn(tail.run());

    let outcome = tokio::select! {
        joined = &mut tail_handle => match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(anyhow::Error::new(e).context("watcher gave up")),
            Err(e) => Err(anyhow::anyhow!("watcher task failed: {}", e)),
        },
        () = wait_for_signal(shutdown_rx) => Ok(()),
    };

    tail_handle.abort();
    accept_handle.abort();

    crate::debug!("actor"; "sending shutdown to ws");
    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, ws_handle).await;

    outcome
}

/// Poll-based since the signal arrives on a crossbeam channel.
async fn wait_for_signal(shutdown_rx: Option<Receiver<()>>) {
    let Some(rx) = shutdown_rx else {
        return std::future::pending().await;
    };
    loop {
        if rx.try_recv().is_ok() {
            crate::debug!("actor"; "shutdown signal received");
            return;
        }
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
}
