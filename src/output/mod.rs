// Output formatting — terminal display.

pub mod terminal;

/// Fit a string into exactly `width` characters: shorter strings are left
/// as-is (the caller pads), longer ones are cut and end in "...".
///
/// Counts characters, not bytes, so titles with accents or CJK characters
/// never split mid-codepoint.
pub fn fit_width(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}
