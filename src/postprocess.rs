use unicode_normalization::UnicodeNormalization;

/// Normalizes captured tool output before it is parsed.
///
/// `ProbeResult::raw_output` keeps the verbatim text; only parsers see this.
pub fn normalize_output(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text: String = text.nfkc().collect();
    sanitize_control_chars(&text)
}

fn sanitize_control_chars(s: &str) -> String {
    s.chars()
        .filter(|&ch| {
            // Structural whitespace survives; other C0/C1 controls go.
            if ch == '\n' || ch == '\t' {
                return true;
            }
            !ch.is_control()
        })
        .collect()
}

/// Lines of normalized output with trailing whitespace removed.
pub fn output_lines(raw: &str) -> Vec<String> {
    normalize_output(raw)
        .lines()
        .map(|l| l.trim_end().to_string())
        .collect()
}
