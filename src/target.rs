/// Picks the host to probe out of a free-text symptom.
///
/// Returns the first whitespace-separated token that contains a `.` and is
/// longer than three characters, with trailing `.,!?` stripped. A token that
/// strips down to nothing is skipped. Falls back to `default_target` when no
/// token qualifies.
///
/// This is purely lexical: "my VPN keeps dropping" has no dotted token and
/// always lands on the default, whatever the user meant.
pub fn extract_target(symptom: &str, default_target: &str) -> String {
    symptom
        .split_whitespace()
        .filter(|word| word.contains('.') && word.chars().count() > 3)
        .map(|word| word.trim_end_matches(['.', ',', '!', '?']))
        .find(|word| !word.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_target.to_string())
}
