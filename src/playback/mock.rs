//! Recording playback double shared by the playback and controller tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::playback::sink::{PlaybackError, PlaybackPort};
use crate::relay::SynthesizedAudio;

/// Records what was played and how many playbacks overlapped.
///
/// Works with [`ScriptedRelay`](crate::relay::ScriptedRelay), whose "audio"
/// is the utterance text itself.
pub struct RecordingPlayback {
    delay: Duration,
    played: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    fail_for: Mutex<Vec<String>>,
}

impl RecordingPlayback {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            played: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            fail_for: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_for(&self, text: &str) {
        self.fail_for.lock().unwrap().push(text.to_string());
    }

    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaybackPort for RecordingPlayback {
    async fn play(&self, audio: SynthesizedAudio) -> Result<(), PlaybackError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let text = String::from_utf8_lossy(&audio.bytes).into_owned();
        if self.fail_for.lock().unwrap().contains(&text) {
            return Err(PlaybackError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "device unplugged",
            )));
        }

        self.played.lock().unwrap().push(text);
        Ok(())
    }
}
