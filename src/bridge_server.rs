//! Download status bridge: the engine over stdin/stdout.
//!
//! The browser side forwards download events and surface messages as
//! newline-delimited JSON frames and answers the engine's host calls.
//! See `platform::bridge` for the frame format. Logs go to stderr.

use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use download_status::app::{init_tracing, App};
use download_status::platform::bridge::{decode_frame, encode_frame, BridgeClient, InboundFrame};
use download_status::services::options_store::{OptionsStore, OptionsStoreTrait};

#[tokio::main]
async fn main() {
    init_tracing();

    let config_path = std::env::var("DOWNLOAD_STATUS_CONFIG").ok();
    let mut store = OptionsStore::new(config_path);
    if let Err(e) = store.load() {
        tracing::warn!(path = store.get_config_path(), error = %e, "using default options");
    }

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let client = Arc::new(BridgeClient::new(outbound_tx));

    let writer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(frame) = outbound_rx.recv().await {
            let line = match encode_frame(&frame) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping outbound frame");
                    continue;
                }
            };
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
                || stdout.flush().await.is_err()
            {
                break;
            }
        }
    });

    let app = App::start(client.clone(), client.clone(), store);

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match decode_frame(&line) {
            Ok(InboundFrame::DownloadCreated { item }) => app.download_created(item),
            Ok(InboundFrame::DownloadChanged { delta }) => app.download_changed(delta),
            Ok(InboundFrame::Message { message }) => {
                app.handle_message(&message);
            }
            Ok(InboundFrame::SurfaceReady { tab_id }) => app.surface_ready(tab_id),
            Ok(InboundFrame::OptionsChanged { changes }) => {
                if let Err(e) = app.options_changed(&changes) {
                    tracing::warn!(error = %e, "rejected options change");
                }
            }
            Ok(InboundFrame::Reply { call_id, result, error }) => {
                if !client.resolve(call_id, result, error) {
                    tracing::debug!(call_id, "reply for unknown call");
                }
            }
            Err(e) => tracing::debug!(error = %e, "ignoring inbound line"),
        }
    }

    tracing::info!("stdin closed, shutting down");
    client.close();
    app.shutdown().await;
    writer.abort();
}
