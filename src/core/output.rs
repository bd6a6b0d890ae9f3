//! Compact output rendering helpers for CLI surfaces.

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Render a ranked score for terminal display with stable width.
pub fn format_score(score: f64) -> String {
    format!("{:>8.2}", score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_line_collapses_and_bounds() {
        let s = compact_line("a  b\n\nc", 100);
        assert_eq!(s, "a b c");
        let s = compact_line("abcdefgh", 4);
        assert_eq!(s, "abcd...");
    }

    #[test]
    fn score_formatting_is_fixed_width() {
        assert_eq!(format_score(2.0), "    2.00");
        assert_eq!(format_score(40.5), "   40.50");
    }
}
