//! Terminal rendering for the CLI
//!
//! Formats change events, scene state and choice lists as plain text.

use crate::choice::ChoiceView;
use crate::collaborators::ChangeSink;
use crate::types::{ChangeEvent, ChoiceDirective, SceneState};

/// Prints every dispatched change event
pub struct PrintSink;

impl ChangeSink for PrintSink {
    fn dispatch(&self, event: &ChangeEvent) {
        println!("  {}", format_event(event));
    }
}

/// Prints the offered choices and the input prompt
pub struct TerminalChoiceView;

impl ChoiceView for TerminalChoiceView {
    fn show(&self, choices: &[ChoiceDirective]) {
        println!("{}", format_choices(choices));
    }

    fn hide(&self) {
        println!();
    }
}

pub fn format_event(event: &ChangeEvent) -> String {
    format!("[{event}]")
}

pub fn format_choices(choices: &[ChoiceDirective]) -> String {
    let mut lines = vec!["[Choices]".to_string()];
    for (index, choice) in choices.iter().enumerate() {
        lines.push(format!("  {}. {}", index + 1, choice.label));
    }
    lines.push("Enter a number, free text, or an empty line to dismiss:".to_string());
    lines.join("\n")
}

pub fn format_state(state: &SceneState) -> String {
    let mut lines = vec![
        "=== Scene State ===".to_string(),
        format!("Background: {}", state.background.as_deref().unwrap_or("(none)")),
        format!("Music: {}", state.music.as_deref().unwrap_or("(none)")),
        format!("Location: {}", state.location.as_deref().unwrap_or("(unknown)")),
    ];
    if state.characters.is_empty() {
        lines.push("Characters: (nobody)".to_string());
    } else {
        lines.push("Characters:".to_string());
        for c in &state.characters {
            lines.push(format!(
                "  {} - {}, {}, {}",
                c.name, c.expression, c.outfit, c.position
            ));
        }
    }
    lines.join("\n")
}
