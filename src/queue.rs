//! Single-channel announcement queue.
//!
//! Phrases from every producer land in one FIFO drained by a single consumer
//! task, which awaits each utterance before taking the next. At most one
//! phrase is ever in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::settings::SettingsHandle;
use crate::speech::SpeechBackend;

#[derive(Debug)]
struct PlaybackState {
    speaking: AtomicBool,
    /// Phrases accepted but not yet finished (queued plus in flight).
    outstanding: watch::Sender<usize>,
}

#[derive(Debug, Clone)]
pub struct AnnouncementQueue {
    tx: mpsc::UnboundedSender<String>,
    settings: SettingsHandle,
    state: Arc<PlaybackState>,
}

impl AnnouncementQueue {
    /// Starts the consumer task on the current tokio runtime.
    ///
    /// The task runs until every clone of the returned queue is dropped.
    pub fn spawn(settings: SettingsHandle, backend: Arc<dyn SpeechBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(PlaybackState {
            speaking: AtomicBool::new(false),
            outstanding: watch::Sender::new(0),
        });
        tokio::spawn(pump(rx, backend, settings.clone(), Arc::clone(&state)));
        Self {
            tx,
            settings,
            state,
        }
    }

    /// Queues `phrase` for playback. Returns `false` when the phrase was
    /// dropped because speech is muted; dropped phrases are never replayed.
    pub fn enqueue(&self, phrase: impl Into<String>) -> bool {
        let phrase = phrase.into();
        if self.settings.muted() {
            debug!(%phrase, "muted, dropping phrase");
            return false;
        }

        debug!(%phrase, "enqueue");
        self.state.outstanding.send_modify(|count| *count += 1);
        if self.tx.send(phrase).is_err() {
            // consumer is gone; only happens while the runtime shuts down
            self.state.outstanding.send_modify(|count| *count -= 1);
            return false;
        }
        true
    }

    pub fn is_speaking(&self) -> bool {
        self.state.speaking.load(Ordering::SeqCst)
    }

    pub fn outstanding(&self) -> usize {
        *self.state.outstanding.borrow()
    }

    /// Resolves once every accepted phrase has finished or failed.
    pub async fn wait_idle(&self) {
        let mut rx = self.state.outstanding.subscribe();
        // the sender lives in `self.state`, so the channel cannot close here
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

async fn pump(
    mut rx: mpsc::UnboundedReceiver<String>,
    backend: Arc<dyn SpeechBackend>,
    settings: SettingsHandle,
    state: Arc<PlaybackState>,
) {
    while let Some(phrase) = rx.recv().await {
        state.speaking.store(true, Ordering::SeqCst);
        let rate = settings.rate();
        debug!(%phrase, rate, "speech start");

        // a backend that panics only loses its own utterance
        let utterance = {
            let backend = Arc::clone(&backend);
            let phrase = phrase.clone();
            tokio::spawn(async move { backend.speak(&phrase, rate).await })
        };
        match utterance.await {
            Ok(Ok(())) => debug!(%phrase, "speech end"),
            Ok(Err(error)) => warn!(%phrase, "speech failed: {error:#}"),
            Err(error) => warn!(%phrase, "speech backend crashed: {error}"),
        }

        state.speaking.store(false, Ordering::SeqCst);
        state.outstanding.send_modify(|count| *count -= 1);
    }
}
