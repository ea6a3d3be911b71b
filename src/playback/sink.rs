//! Playback port and the file-based implementation used by the console host.
//!
//! [`PlaybackPort::play`] resolves when the utterance has finished playing
//! (or failed). The audio buffer is moved in and dropped when playback ends,
//! which releases it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppConfig;
use crate::relay::SynthesizedAudio;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("cannot write audio: {0}")]
    Io(#[from] std::io::Error),

    #[error("player command is empty")]
    NoPlayer,

    #[error("player exited with {0}")]
    PlayerFailed(std::process::ExitStatus),
}

// ---------------------------------------------------------------------------
// PlaybackPort
// ---------------------------------------------------------------------------

/// Plays synthesized audio on whatever output the host has.
///
/// Implementors must be `Send + Sync`; the playback queue shares them behind
/// an `Arc<dyn PlaybackPort>`.
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// Play `audio` to completion.
    async fn play(&self, audio: SynthesizedAudio) -> Result<(), PlaybackError>;
}

// ---------------------------------------------------------------------------
// FilePlayback
// ---------------------------------------------------------------------------

/// Writes every utterance to `<dir>/utterance-NNNN-<voice>.mp3` and, when a
/// player command is configured, runs it on the file and waits for it.
#[derive(Debug)]
pub struct FilePlayback {
    dir: PathBuf,
    player: Option<Vec<String>>,
    counter: AtomicU64,
}

impl FilePlayback {
    /// `player` is split on whitespace: `"mpg123 -q"` runs
    /// `mpg123 -q <file>`.
    pub fn new(dir: impl Into<PathBuf>, player: Option<&str>) -> Self {
        Self {
            dir: dir.into(),
            player: player.map(|cmd| cmd.split_whitespace().map(str::to_owned).collect()),
            counter: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.utterances_dir(),
            config.playback.player_command.as_deref(),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn run_player(&self, file: &Path) -> Result<(), PlaybackError> {
        let Some(argv) = &self.player else {
            return Ok(());
        };
        let (program, args) = argv.split_first().ok_or(PlaybackError::NoPlayer)?;

        let status = tokio::process::Command::new(program)
            .args(args)
            .arg(file)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(PlaybackError::PlayerFailed(status))
        }
    }
}

#[async_trait]
impl PlaybackPort for FilePlayback {
    async fn play(&self, audio: SynthesizedAudio) -> Result<(), PlaybackError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let file = self.dir.join(format!("utterance-{n:04}-{}.mp3", audio.voice));

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&file, &audio.bytes).await?;
        drop(audio);

        log::debug!("playback: wrote {}", file.display());
        self.run_player(&file).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::Voice;
    use tempfile::tempdir;

    fn audio(bytes: &[u8], voice: Voice) -> SynthesizedAudio {
        SynthesizedAudio {
            bytes: bytes.to_vec(),
            voice,
        }
    }

    #[tokio::test]
    async fn writes_numbered_files_per_utterance() {
        let dir = tempdir().expect("temp dir");
        let out = dir.path().join("utterances");
        let playback = FilePlayback::new(&out, None);

        playback.play(audio(b"first", Voice::Nova)).await.unwrap();
        playback.play(audio(b"second", Voice::Echo)).await.unwrap();

        let first = std::fs::read(out.join("utterance-0001-nova.mp3")).unwrap();
        let second = std::fs::read(out.join("utterance-0002-echo.mp3")).unwrap();
        assert_eq!(first, b"first");
        assert_eq!(second, b"second");
    }

    #[test]
    fn player_command_is_split_on_whitespace() {
        let playback = FilePlayback::new("/tmp", Some("mpg123  -q"));
        assert_eq!(
            playback.player,
            Some(vec!["mpg123".to_string(), "-q".to_string()])
        );
    }

    #[tokio::test]
    async fn blank_player_command_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let playback = FilePlayback::new(dir.path(), Some("   "));

        let err = playback.play(audio(b"x", Voice::Nova)).await.unwrap_err();
        assert!(matches!(err, PlaybackError::NoPlayer));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_player_is_reported() {
        let dir = tempdir().expect("temp dir");
        let playback = FilePlayback::new(dir.path(), Some("false"));

        let err = playback.play(audio(b"x", Voice::Nova)).await.unwrap_err();
        assert!(matches!(err, PlaybackError::PlayerFailed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_player_completes_playback() {
        let dir = tempdir().expect("temp dir");
        let playback = FilePlayback::new(dir.path(), Some("true"));
        assert!(playback.play(audio(b"x", Voice::Nova)).await.is_ok());
    }
}
