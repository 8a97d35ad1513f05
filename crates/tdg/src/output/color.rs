//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:   green   (applied mutations, created items)
//!   - Warning:   yellow  (nothing selected, no-op mutations)
//!   - Info:      cyan    (ticket ids)
//!   - Accent:    magenta (labels)
//!   - Muted:     dimmed  (field names, arrows)
//!   - Emphasis:  bold    (section headers)

use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Colorize labels (magenta).
pub(crate) fn colorize_labels(labels: &[&str], config: &OutputConfig) -> String {
    let names: Vec<&str> = labels.iter().copied().filter(|l| !l.is_empty()).collect();
    if names.is_empty() {
        return String::new();
    }
    let text = names.join(", ");
    if !config.use_colors {
        return text;
    }
    text.magenta().to_string()
}

/// Apply dimmed style to text (for field names and connectors).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
