use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::gate::{GateSession, GateState};
use crate::reading::BlockSample;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Pump viewport samples into a session until the view closes.
///
/// Stops when the token is cancelled or every sample sender is dropped, and
/// hands the session back so the caller can continue with the quiz.
pub async fn reading_loop(
    mut session: GateSession,
    mut samples: mpsc::Receiver<BlockSample>,
    state_tx: watch::Sender<GateState>,
    cancel_token: CancellationToken,
) -> GateSession {
    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("reading loop for article {} cancelled", session.article_id());
                break;
            }
            maybe_sample = samples.recv() => {
                let Some(sample) = maybe_sample else {
                    log_info!("sample stream closed for article {}", session.article_id());
                    break;
                };
                let state = session.observe(&sample);
                state_tx.send_if_modified(|current| {
                    let changed = *current != state;
                    *current = state;
                    changed
                });
            }
        }
    }

    session
}
