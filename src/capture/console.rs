//! Line-based capture for the console host.
//!
//! Each line read from the input is treated as the finalized transcript of
//! one listening session. Two lines are commands instead:
//!
//! | Line | Effect |
//! |------|--------|
//! | `/theme` | toggle the colour theme, keep listening |
//! | `/repeat` | [`CaptureInput::Repeat`]: speak the last examiner line again |

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::capture::{CaptureError, CaptureInput, CapturePort, Transcript};
use crate::config::SharedPreferences;

const THEME_COMMAND: &str = "/theme";
const REPEAT_COMMAND: &str = "/repeat";

pub struct ConsoleCapture<R> {
    reader: R,
    prefs: SharedPreferences,
}

impl<R> ConsoleCapture<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, prefs: SharedPreferences) -> Self {
        Self { reader, prefs }
    }

    fn toggle_theme(&self) {
        let mut prefs = match self.prefs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match prefs.toggle_theme() {
            Ok(theme) => log::info!("capture: theme switched to {}", theme.label()),
            Err(e) => log::warn!("capture: theme switched but not saved: {e}"),
        }
    }
}

impl ConsoleCapture<BufReader<Stdin>> {
    pub fn from_stdin(prefs: SharedPreferences) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), prefs)
    }
}

#[async_trait]
impl<R> CapturePort for ConsoleCapture<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn listen_once(&mut self) -> Result<Transcript, CaptureError> {
        loop {
            match self.next_input().await? {
                CaptureInput::Transcript(transcript) => return Ok(transcript),
                CaptureInput::Repeat => log::debug!("capture: replay request ignored"),
            }
        }
    }

    async fn next_input(&mut self) -> Result<CaptureInput, CaptureError> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                return Err(CaptureError::Closed);
            }

            let command = line.trim();
            if command.eq_ignore_ascii_case(THEME_COMMAND) {
                self.toggle_theme();
                continue;
            }
            if command.eq_ignore_ascii_case(REPEAT_COMMAND) {
                return Ok(CaptureInput::Repeat);
            }

            return Transcript::new(&line).map(CaptureInput::Transcript);
        }
    }
}
