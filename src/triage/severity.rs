/// Highest score the scale allows.
pub const MAX_SEVERITY: u8 = 10;
/// Score used when the text carries no usable signal.
pub const DEFAULT_SEVERITY: u8 = 5;

/// Keyword fallbacks, checked in order after the numeric scan.
const SEVERITY_KEYWORDS: &[(&str, u8)] = &[("severe", 8), ("moderate", 5), ("mild", 2)];

/// Map a free-text severity description to a score in `0..=10`.
///
/// The first whitespace token made only of ASCII digits wins, even when a
/// later token is larger. Values above the scale saturate at 10. Without a
/// numeric token, the first matching keyword decides; otherwise the score
/// defaults to 5.
pub fn severity_score(text: &str) -> u8 {
    if let Some(token) = text
        .split_whitespace()
        .find(|t| t.bytes().all(|b| b.is_ascii_digit()))
    {
        // All-digit tokens only fail to parse on overflow.
        return token
            .parse::<u64>()
            .map(|n| n.min(u64::from(MAX_SEVERITY)) as u8)
            .unwrap_or(MAX_SEVERITY);
    }

    let lower = text.to_lowercase();
    SEVERITY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_SEVERITY)
}
