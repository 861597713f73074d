use anyhow::{anyhow, bail, Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::gate::{GateSession, GateState};
use crate::reading::BlockSample;

use super::loop_worker::reading_loop;

const ENABLE_LOGS: bool = true;

use crate::log_info;

const SAMPLE_BUFFER: usize = 256;

/// Runs a gate session's reading phase on a background task.
///
/// The viewport side pushes samples through the sender returned by `start`;
/// the UI watches state changes and calls `stop` to get the session back
/// once the user opts into the quiz or leaves the view.
pub struct ReaderController {
    handle: Option<JoinHandle<GateSession>>,
    cancel_token: Option<CancellationToken>,
    state_rx: Option<watch::Receiver<GateState>>,
}

impl ReaderController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            state_rx: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the session (if still idle) and start consuming samples.
    pub fn start(&mut self, mut session: GateSession) -> Result<mpsc::Sender<BlockSample>> {
        if self.handle.is_some() {
            bail!("reader already active");
        }

        if session.state() == GateState::Idle {
            session
                .open(chrono::Utc::now())
                .map_err(|err| anyhow!("failed to open gate session: {err}"))?;
        }
        log_info!(
            "starting reader for article {} in state {}",
            session.article_id(),
            session.state().as_str()
        );

        let (sample_tx, sample_rx) = mpsc::channel(SAMPLE_BUFFER);
        let (state_tx, state_rx) = watch::channel(session.state());
        let cancel_token = CancellationToken::new();

        let handle = tokio::spawn(reading_loop(
            session,
            sample_rx,
            state_tx,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.state_rx = Some(state_rx);
        Ok(sample_tx)
    }

    /// Latest session state seen by the loop.
    pub fn subscribe(&self) -> Option<watch::Receiver<GateState>> {
        self.state_rx.clone()
    }

    /// Stop the loop and return the session; `None` if nothing was running.
    pub async fn stop(&mut self) -> Result<Option<GateSession>> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.state_rx = None;

        match self.handle.take() {
            Some(handle) => handle
                .await
                .context("reading loop task failed to join")
                .map(Some),
            None => Ok(None),
        }
    }

    /// Wait for the sample stream to close on its own, then return the session.
    pub async fn finish(&mut self) -> Result<Option<GateSession>> {
        self.cancel_token = None;
        self.state_rx = None;

        match self.handle.take() {
            Some(handle) => handle
                .await
                .context("reading loop task failed to join")
                .map(Some),
            None => Ok(None),
        }
    }
}

impl Default for ReaderController {
    fn default() -> Self {
        Self::new()
    }
}
