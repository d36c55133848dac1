use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::speech::SpeechBackend;

/// Backend that records every utterance and takes `utterance` to "play" it.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    spoken: Arc<Mutex<Vec<(String, f64)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    panicking: Arc<Mutex<HashSet<String>>>,
    utterance: Duration,
}

impl RecordingBackend {
    pub fn with_utterance(utterance: Duration) -> Self {
        Self {
            utterance,
            ..Self::default()
        }
    }

    pub fn fail_on(&self, text: &str) {
        self.failing.lock().unwrap().insert(text.to_string());
    }

    pub fn panic_on(&self, text: &str) {
        self.panicking.lock().unwrap().insert(text.to_string());
    }

    pub fn phrases(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.spoken.lock().unwrap().iter().map(|(_, rate)| *rate).collect()
    }
}

#[async_trait]
impl SpeechBackend for RecordingBackend {
    async fn speak(&self, text: &str, rate: f64) -> Result<()> {
        self.spoken.lock().unwrap().push((text.to_string(), rate));
        if self.panicking.lock().unwrap().contains(text) {
            panic!("backend crashed on {text:?}");
        }
        if self.failing.lock().unwrap().contains(text) {
            bail!("synthesis failed for {text:?}");
        }
        tokio::time::sleep(self.utterance).await;
        Ok(())
    }
}
