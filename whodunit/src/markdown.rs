//! Markdown rendering for finished game transcripts.

use whodunit_core::Outcome;

/// Convert the final transcript into a Markdown vignette.
pub fn render(outcome: &Outcome) -> String {
    let mut lines: Vec<String> = vec![
        "# Whodunit: Murder-Mystery Transcript".to_string(),
        String::new(),
        format!("- **Murderer**: {}", outcome.murderer),
        format!("- **Winner**: {}", outcome.winner),
        format!("- **Accusations**: {}", outcome.accusations),
        String::new(),
        "## Transcript".to_string(),
        String::new(),
    ];

    for entry in &outcome.transcript {
        append_entry(&mut lines, entry);
    }

    lines.push(String::new());
    lines.join("\n")
}

fn append_entry(buffer: &mut Vec<String>, line: &str) {
    let stripped = line.trim();

    if stripped.starts_with("--- Round") && stripped.ends_with("---") {
        let title = capitalize(stripped.trim_matches(|c| c == '-' || c == ' '));
        buffer.push(String::new());
        buffer.push(format!("### {title}"));
        buffer.push(String::new());
        return;
    }

    if stripped.starts_with("[Context]") {
        buffer.push(format!("> {stripped}"));
        return;
    }

    // Dialogue lines carry a bare name before the first colon; narration
    // such as "False alarms so far: 1." does not.
    if let Some((speaker, text)) = stripped.split_once(':') {
        let speaker = speaker.trim();
        if !speaker.contains(' ') {
            buffer.push(format!("- **{speaker}**: {}", text.trim()));
            return;
        }
    }

    buffer.push(format!("- {stripped}"));
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
