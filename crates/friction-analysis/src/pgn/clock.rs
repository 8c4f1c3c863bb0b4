//! `[%clk H:MM:SS]` extraction from move comments.

use std::sync::LazyLock;

use regex::Regex;

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%clk\s+(\d+):(\d+):(\d+(?:\.\d+)?)\]").expect("clock pattern compiles")
});

/// Remaining clock time in seconds, if the comment carries one.
pub fn extract_clock(comment: &str) -> Option<f64> {
    let caps = CLOCK_RE.captures(comment)?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(extract_clock("[%clk 0:10:00]"), Some(600.0));
        assert_eq!(extract_clock("[%clk 1:02:03]"), Some(3723.0));
    }

    #[test]
    fn keeps_fractional_seconds() {
        assert_eq!(extract_clock("[%eval 0.3] [%clk 0:00:09.5]"), Some(9.5));
    }

    #[test]
    fn missing_clock() {
        assert_eq!(extract_clock("[%eval 0.17]"), None);
        assert_eq!(extract_clock("good move"), None);
    }
}
