//! Text rendering shared by `check` and the interactive session.

use classdesk_core::tools::FieldKind;
use classdesk_core::{DisplayPolicy, FieldDisplay, GateStatus, Resolution, ToolInfo};

pub fn status_line(status: &GateStatus) -> String {
    match status {
        GateStatus::Unconfigured => "Status: not configured".to_string(),
        GateStatus::Configured { origin } => format!("Status: configured ({})", origin.description()),
    }
}

fn field_line(label: &str, field: &FieldDisplay) -> String {
    let value = if field.value.is_empty() { "(empty)" } else { field.value.as_str() };
    let lock = if field.editable { "editable" } else { "locked" };
    format!("  {:<13} {} [{}]", label, value, lock)
}

pub fn display_lines(display: &DisplayPolicy) -> Vec<String> {
    vec![
        field_line("API key:", &display.api_key),
        field_line("API endpoint:", &display.api_endpoint),
    ]
}

/// Status, fields, and any remote configuration failure
pub fn resolution_lines(status: &GateStatus, resolution: &Resolution) -> Vec<String> {
    let mut lines = vec![status_line(status)];
    lines.push(format!("Source: {}", resolution.origin.description()));
    lines.extend(display_lines(&resolution.display));
    if let Some(error) = &resolution.error {
        lines.push(format!("Configuration failed: {}", error.user_message()));
    }
    lines
}

pub fn tool_lines(tools: &[ToolInfo]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, tool) in tools.iter().enumerate() {
        lines.push(format!("{}. {} ({})", i + 1, tool.descriptor.title, tool.name));
        lines.push(format!("   {}", tool.descriptor.description));
    }
    lines
}

/// Prompt text for one input field
pub fn field_prompt(label: &str, kind: &FieldKind) -> String {
    match kind {
        FieldKind::Text | FieldKind::LongText => format!("{}: ", label),
        FieldKind::Choice { options } => {
            let numbered: Vec<String> = options
                .iter()
                .enumerate()
                .map(|(i, o)| format!("{}) {}", i + 1, o))
                .collect();
            format!("{} [{}]: ", label, numbered.join(", "))
        }
        FieldKind::Range { min, max, default } => format!("{} ({}-{}, default {}): ", label, min, max, default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classdesk_core::{CredentialPair, CredentialSource};

    #[test]
    fn test_locked_fields_render_masked() {
        let display = DisplayPolicy::for_source(
            CredentialSource::Static,
            &CredentialPair::new("sk-0123456789abcd", "https://e"),
        );
        let lines = display_lines(&display);
        assert!(lines[0].contains("[locked]"));
        assert!(lines[0].ends_with("abcd [locked]"));
        assert!(!lines[0].contains("sk-0123"));
    }

    #[test]
    fn test_blank_display_has_no_mask() {
        let lines = display_lines(&DisplayPolicy::blank());
        assert!(lines[0].contains("(empty) [editable]"));
    }

    #[test]
    fn test_choice_prompt() {
        let kind = FieldKind::Choice {
            options: vec!["Old School".to_string(), "Trap".to_string()],
        };
        assert_eq!(field_prompt("Style", &kind), "Style [1) Old School, 2) Trap]: ");
    }
}
