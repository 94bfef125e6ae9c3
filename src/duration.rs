use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration '{0}', use a format like '30s', '2m' or '1h'")]
    Invalid(String),
    #[error("duration '{0}' is too large")]
    Overflow(String),
}

/// Parse a duration like `30s`, `2m`, `1h` or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<u64, DurationParseError> {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let (digits, multiplier) = match normalized.chars().last() {
        Some('s') => (&normalized[..normalized.len() - 1], 1),
        Some('m') => (&normalized[..normalized.len() - 1], 60),
        Some('h') => (&normalized[..normalized.len() - 1], 3600),
        _ => (normalized.as_str(), 1),
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| DurationParseError::Invalid(input.to_string()))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| DurationParseError::Overflow(input.to_string()))
}

/// Human readable rendering of a number of seconds.
pub fn format_duration(seconds: u64) -> String {
    match seconds {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m {}s", s / 60, s % 60),
        s => format!("{}h {}m", s / 3600, (s % 3600) / 60),
    }
}
