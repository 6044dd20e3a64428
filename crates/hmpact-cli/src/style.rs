use std::env;

use color_eyre::owo_colors::{OwoColorize, Style as Paint};
use hmpact_core::CommandStatus;

/// Terminal painter for command reports. Plain text unless stdout is a
/// terminal and neither `--no-color` nor `NO_COLOR` asks otherwise.
pub struct Style {
    color: bool,
}

impl Style {
    pub fn new(no_color_flag: bool, is_tty: bool) -> Self {
        Self::with_env(no_color_flag, is_tty, env::var_os("NO_COLOR").is_some())
    }

    fn with_env(no_color_flag: bool, is_tty: bool, no_color_env: bool) -> Self {
        Self {
            color: is_tty && !no_color_flag && !no_color_env,
        }
    }

    /// Headline for an outcome: a status mark followed by the message.
    pub fn status(&self, status: CommandStatus, text: &str) -> String {
        self.apply(
            &format!("{} {text}", status_mark(status)),
            status_paint(status).bold(),
        )
    }

    /// A registry entry or rule that did not make it into the manifest.
    pub fn issue(&self, text: &str) -> String {
        self.apply(&format!("  ✗ {text}"), Paint::new().yellow())
    }

    /// Follow-up advice: the trailing tip and the bullets under `Fix:`.
    pub fn hint(&self, text: &str) -> String {
        self.apply(text, Paint::new().cyan())
    }

    pub fn heading(&self, text: &str) -> String {
        self.apply(text, Paint::new().bold())
    }

    fn apply(&self, text: &str, paint: Paint) -> String {
        if self.color {
            text.style(paint).to_string()
        } else {
            text.to_string()
        }
    }
}

fn status_mark(status: CommandStatus) -> &'static str {
    match status {
        CommandStatus::Ok => "✔",
        CommandStatus::UserError => "✗",
        CommandStatus::Failure => "✖",
    }
}

fn status_paint(status: CommandStatus) -> Paint {
    match status {
        CommandStatus::Ok => Paint::new().green(),
        CommandStatus::UserError => Paint::new().yellow(),
        CommandStatus::Failure => Paint::new().red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_off_a_terminal() {
        let style = Style::with_env(false, false, false);
        assert_eq!(style.status(CommandStatus::Ok, "imported"), "✔ imported");
        assert_eq!(style.status(CommandStatus::UserError, "rejected"), "✗ rejected");
        assert_eq!(style.status(CommandStatus::Failure, "crashed"), "✖ crashed");
        assert_eq!(style.issue("npm: blank format"), "  ✗ npm: blank format");
        assert_eq!(style.hint("Tip: run again"), "Tip: run again");
    }

    #[test]
    fn either_opt_out_disables_color() {
        assert!(!Style::with_env(true, true, false).color);
        assert!(!Style::with_env(false, true, true).color);

        let painted = Style::with_env(false, true, false);
        assert!(painted.color);
        let headline = painted.status(CommandStatus::Failure, "crashed");
        assert!(headline.contains("\u{1b}["), "{headline:?}");
        assert!(headline.contains("✖ crashed"));
    }
}
