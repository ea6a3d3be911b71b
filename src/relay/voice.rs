//! TTS voice selection.
//!
//! The speech relay accepts a fixed set of voices. Anything else is silently
//! replaced by [`Voice::Nova`] instead of being rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Voices accepted by the speech-synthesis relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    #[default]
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    /// Exact, lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }

    /// Parse a wire name. Matching is exact, as on the relay side.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == name)
    }

    /// Parse `name`, substituting the default voice when it is not one of
    /// [`Voice::ALL`].
    ///
    /// ```
    /// use speak_eval::relay::Voice;
    ///
    /// assert_eq!(Voice::resolve("shimmer"), Voice::Shimmer);
    /// assert_eq!(Voice::resolve("robot"), Voice::Nova);
    /// ```
    pub fn resolve(name: &str) -> Self {
        match Self::parse(name) {
            Some(voice) => voice,
            None => {
                log::debug!("voice {name:?} is not supported; using {}", Voice::default());
                Voice::default()
            }
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
