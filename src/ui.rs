//! Console view for a running session.
//!
//! [`ConsoleView`] consumes [`SessionEvent`]s and prints one line per event.
//! Colours follow the current [`Theme`], which can change mid-session
//! (`/theme`), so the palette is looked up for every line.
//!
//! | Event | Output |
//! |-------|--------|
//! | `MessageAdded` (assistant) | `Examiner: …` |
//! | `MessageAdded` (user) | `You: …` |
//! | `Notice` | `! …` in the warning colour |
//! | `Thinking(true)` | `… evaluating` |
//! | `Progress` | `Evaluation Progress: N%` |
//! | `CaptureEnabled(true)` | `> ` prompt hint |
//! | `Completed` | `📊 Evaluation Complete!` banner + report |

use console::{Color, Style};

use crate::config::{SharedPreferences, Theme};
use crate::conversation::Role;
use crate::events::{EventStream, SessionEvent};

/// 256-colour foregrounds for one theme.
struct Palette {
    assistant: Color,
    user: Color,
    notice: Color,
    dim: Color,
    accent: Color,
}

const LIGHT: Palette = Palette {
    assistant: Color::Color256(26),
    user: Color::Color256(236),
    notice: Color::Color256(166),
    dim: Color::Color256(244),
    accent: Color::Color256(29),
};

const DARK: Palette = Palette {
    assistant: Color::Color256(111),
    user: Color::Color256(253),
    notice: Color::Color256(215),
    dim: Color::Color256(246),
    accent: Color::Color256(78),
};

fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Light => &LIGHT,
        Theme::Dark => &DARK,
    }
}

pub struct ConsoleView {
    prefs: SharedPreferences,
    /// `None` leaves the decision to `console` (tty check, `NO_COLOR`,
    /// `CLICOLOR_FORCE`).
    colours: Option<bool>,
}

impl ConsoleView {
    pub fn new(prefs: SharedPreferences) -> Self {
        Self {
            prefs,
            colours: None,
        }
    }

    /// Force colours on or off regardless of the terminal.
    pub fn with_colours(mut self, enabled: bool) -> Self {
        self.colours = Some(enabled);
        self
    }

    fn theme(&self) -> Theme {
        match self.prefs.lock() {
            Ok(prefs) => prefs.theme(),
            Err(poisoned) => poisoned.into_inner().theme(),
        }
    }

    fn paint(&self, colour: Color, text: &str) -> String {
        let mut style = Style::new().fg(colour);
        if let Some(enabled) = self.colours {
            style = style.force_styling(enabled);
        }
        style.apply_to(text).to_string()
    }

    /// Text to print for `event`, or `None` when it has no visible effect.
    pub fn render(&self, event: &SessionEvent) -> Option<String> {
        let p = palette(self.theme());

        let line = match event {
            SessionEvent::MessageAdded {
                role: Role::Assistant,
                content,
            } => self.paint(p.assistant, &format!("Examiner: {content}")),
            SessionEvent::MessageAdded {
                role: Role::User,
                content,
            } => self.paint(p.user, &format!("You: {content}")),
            SessionEvent::MessageAdded {
                role: Role::System, ..
            } => return None,
            SessionEvent::Notice(message) => self.paint(p.notice, &format!("! {message}")),
            SessionEvent::Thinking(true) => self.paint(p.dim, "… evaluating"),
            SessionEvent::Thinking(false) => return None,
            SessionEvent::Progress { percent, .. } => {
                self.paint(p.dim, &format!("Evaluation Progress: {percent}%"))
            }
            SessionEvent::CaptureEnabled(true) => {
                self.paint(p.dim, "> type your answer and press Enter (/repeat, /theme)")
            }
            SessionEvent::CaptureEnabled(false) => return None,
            SessionEvent::Speaking(_) => return None,
            SessionEvent::Completed { report } => format!(
                "{}\n{}",
                self.paint(p.accent, "📊 Evaluation Complete!"),
                report
            ),
        };
        Some(line)
    }

    /// Print events until every sender is dropped.
    pub async fn run(self, mut events: EventStream) {
        while let Some(event) = events.recv().await {
            log::debug!("view: {event:?}");
            if let Some(line) = self.render(&event) {
                println!("{line}");
            }
        }
    }
}
