//! Human-readable numbers and durations for status lines.

use std::time::{Duration, Instant};

/// `1234567` → `"1,234,567"`
pub fn comma_separated(number: u64) -> String {
    let digits = number.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Picks the coarsest unit that keeps the value readable:
/// `1h 2m 3s`, `2m 5s`, `1.50s`, `12.00ms`, `250.00μs`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs_f64();
    let hours = (total / 3600.0).floor();
    let minutes = ((total % 3600.0) / 60.0).floor();
    let seconds = total % 60.0;

    if hours > 0.0 {
        format!("{}h {}m {}s", hours as u64, minutes as u64, seconds as u64)
    } else if minutes > 0.0 {
        format!("{}m {}s", minutes as u64, seconds as u64)
    } else if seconds >= 1.0 {
        format!("{seconds:.2}s")
    } else {
        let millis = seconds * 1000.0;
        if millis >= 1.0 {
            format!("{millis:.2}ms")
        } else {
            format!("{:.2}μs", millis * 1000.0)
        }
    }
}

/// Runs `f` and returns its result along with how long it took.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}
