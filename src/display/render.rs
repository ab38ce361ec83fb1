use std::fmt::Write;

use super::theme::{truncate_preview, DisplayTheme};
use crate::models::ModelRegistry;
use crate::routing::Availability;
use crate::vault::HistoryEntry;

/// Recent exchanges, oldest first
pub fn render_history(
    entries: &[HistoryEntry],
    preview_chars: usize,
    theme: &DisplayTheme,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", theme.heading("=== SESSION HISTORY ==="));

    if entries.is_empty() {
        let _ = writeln!(out, "No records found.");
        return out;
    }

    for entry in entries {
        let _ = writeln!(
            out,
            "\n{}",
            theme.warning(&format!("[{}] - {}", entry.time, entry.model_name))
        );
        let _ = writeln!(out, "{} {}", theme.user_label("You:"), entry.prompt);
        let _ = writeln!(
            out,
            "{} {}",
            theme.ai_label("AI:"),
            truncate_preview(&entry.response, preview_chars)
        );
    }
    out
}

/// One line per catalog entry with its live status
pub fn render_status(
    registry: &ModelRegistry,
    status: &Availability,
    theme: &DisplayTheme,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", theme.heading("=== MODEL STATUS ==="));

    for model in registry.all() {
        let online = status.get(&model.model_id).copied().unwrap_or(false);
        let badge = if online {
            theme.success("[ONLINE] ")
        } else {
            theme.error("[OFFLINE]")
        };
        let _ = writeln!(
            out,
            "  {} {:<22} {}",
            badge,
            model.display_name,
            theme.muted(&format!("{}/{}", model.provider, model.model_id))
        );
    }
    out
}

/// Numbered catalog, as used by the model switcher
pub fn render_catalog(registry: &ModelRegistry, theme: &DisplayTheme) -> String {
    let mut out = String::new();
    for (i, model) in registry.all().iter().enumerate() {
        let _ = writeln!(
            out,
            "[{}] {:<22} {} {}",
            i,
            model.display_name,
            theme.muted(&format!("({}, {})", model.provider, model.capability)),
            model.description
        );
    }
    out
}
