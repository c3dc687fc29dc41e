// Terminal presentation layer

use colored::*;
use parking_lot::Mutex;
use smartmeeting_core::{Mode, SessionDelegate, SessionSnapshot};

pub const MEETING_PROMPT: &str = "Would you like to join meeting?";

/// Answer given to the meeting prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Ok,
    Cancel,
}

pub struct TerminalDelegate {
    answer: PromptAnswer,
    json: bool,
    last: Mutex<Option<SessionSnapshot>>,
    answers: Mutex<Vec<PromptAnswer>>,
}

impl TerminalDelegate {
    pub fn new(answer: PromptAnswer, json: bool) -> Self {
        Self {
            answer,
            json,
            last: Mutex::new(None),
            answers: Mutex::new(Vec::new()),
        }
    }

    pub fn last_snapshot(&self) -> Option<SessionSnapshot> {
        self.last.lock().clone()
    }

    /// Prompt answers given so far
    pub fn answers(&self) -> Vec<PromptAnswer> {
        self.answers.lock().clone()
    }
}

/// One status line for a snapshot
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mode = match snapshot.mode {
        Mode::Unselected => "Choose Role".normal(),
        Mode::Broadcasting => "Room".bright_cyan(),
        Mode::Listening => "Attendee".bright_green(),
    };
    let distance = if snapshot.has_distance() {
        format!("{:.2}", snapshot.last_distance)
    } else {
        "-".to_string()
    };

    format!(
        "{} Distance: {} {}",
        mode.bold(),
        distance.bright_yellow(),
        snapshot.status_message.dimmed()
    )
}

impl SessionDelegate for TerminalDelegate {
    fn on_state_changed(&self, snapshot: SessionSnapshot) {
        if self.json {
            match snapshot.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!("Failed to encode snapshot: {}", e),
            }
        } else {
            println!("{}", render_snapshot(&snapshot));
        }
        *self.last.lock() = Some(snapshot);
    }

    fn on_meeting_detected(&self) {
        println!();
        println!("{}", "Meeting".bold());
        println!("  {}", MEETING_PROMPT);
        let label = match self.answer {
            PromptAnswer::Ok => "OK".bright_green(),
            PromptAnswer::Cancel => "Cancel".bright_red(),
        };
        println!("  {} {}", "→".bright_cyan(), label);
        println!();

        tracing::info!("Meeting prompt answered: {:?}", self.answer);
        self.answers.lock().push(self.answer);
    }

    fn on_alert(&self, message: String) {
        println!("{} {}", "Alert:".bright_red().bold(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(mode: Mode, distance: f64) -> SessionSnapshot {
        SessionSnapshot {
            mode,
            last_distance: distance,
            meeting_triggered: false,
            status_message: "listening".to_string(),
        }
    }

    #[test]
    fn test_render_hides_unknown_distance() {
        colored::control::set_override(false);
        assert_eq!(
            render_snapshot(&snapshot(Mode::Listening, -1.0)),
            "Attendee Distance: - listening"
        );
        assert_eq!(
            render_snapshot(&snapshot(Mode::Broadcasting, 3.456)),
            "Room Distance: 3.46 listening"
        );
    }

    #[test]
    fn test_delegate_records_answers_and_snapshots() {
        let delegate = TerminalDelegate::new(PromptAnswer::Cancel, false);
        delegate.on_state_changed(snapshot(Mode::Listening, 0.4));
        delegate.on_meeting_detected();

        assert_eq!(delegate.answers(), vec![PromptAnswer::Cancel]);
        assert_eq!(
            delegate.last_snapshot().map(|s| s.last_distance),
            Some(0.4)
        );
    }
}
