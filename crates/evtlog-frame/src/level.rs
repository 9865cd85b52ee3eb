//! Well-known severity levels.
//!
//! Levels occupy 4 bits on the wire. Values 0-5 are named here; 6-15 are
//! reserved and pass through the codec untouched.

/// Fine-grained tracing.
pub const TRACE: u8 = 0;

/// Diagnostic detail.
pub const DEBUG: u8 = 1;

/// Normal operation milestones.
pub const INFO: u8 = 2;

/// Something unexpected but recoverable.
pub const WARN: u8 = 3;

/// An operation failed.
pub const ERROR: u8 = 4;

/// The firmware cannot continue.
pub const FATAL: u8 = 5;

/// Largest level the wire format can carry.
pub const LEVEL_MAX: u8 = 0x0F;

/// Returns a human-readable name for a level.
pub fn level_name(level: u8) -> &'static str {
    match level {
        TRACE => "TRACE",
        DEBUG => "DEBUG",
        INFO => "INFO",
        WARN => "WARN",
        ERROR => "ERROR",
        FATAL => "FATAL",
        6..=LEVEL_MAX => "RESERVED",
        _ => "INVALID",
    }
}

/// Parse a level from its name (case-insensitive) or its number.
pub fn parse_level(input: &str) -> Option<u8> {
    let input = input.trim();
    if let Ok(n) = input.parse::<u8>() {
        return Some(n);
    }
    match input.to_ascii_uppercase().as_str() {
        "TRACE" => Some(TRACE),
        "DEBUG" => Some(DEBUG),
        "INFO" => Some(INFO),
        "WARN" | "WARNING" => Some(WARN),
        "ERROR" => Some(ERROR),
        "FATAL" => Some(FATAL),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(level_name(INFO), "INFO");
        assert_eq!(level_name(FATAL), "FATAL");
        assert_eq!(level_name(9), "RESERVED");
        assert_eq!(level_name(16), "INVALID");
    }

    #[test]
    fn parse_names_and_numbers() {
        assert_eq!(parse_level("info"), Some(INFO));
        assert_eq!(parse_level(" Warning "), Some(WARN));
        assert_eq!(parse_level("12"), Some(12));
        assert_eq!(parse_level("loud"), None);
    }
}
