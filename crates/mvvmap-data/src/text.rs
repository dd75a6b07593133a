/// Separator used inside cleaned value lists.
pub const VALUE_SEPARATOR: &str = "、";

/// Trims a profile field and rewrites `;`-separated value lists to use [`VALUE_SEPARATOR`].
/// Missing or blank input yields an empty string.
pub fn clean_text(raw: Option<&str>) -> String {
    let Some(text) = raw.map(str::trim) else {
        return String::new();
    };
    if text.is_empty() {
        return String::new();
    }
    text.replace(';', VALUE_SEPARATOR)
}

/// `Mission: … | Vision: … | Values: …`, skipping empty parts.
pub fn combined_mvv(mission: &str, vision: &str, values: &str) -> String {
    [("Mission", mission), ("Vision", vision), ("Values", values)]
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(label, text)| format!("{label}: {text}"))
        .collect::<Vec<_>>()
        .join(" | ")
}
