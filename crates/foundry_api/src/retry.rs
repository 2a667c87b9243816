use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

/// Default total attempts per remote call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base delay between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Bounded linear-delay retry policy for transient remote failures.
///
/// `max_attempts` counts every try, including the first. The delay grows
/// linearly with the attempt number; there is no exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Delay slept after a failed attempt (1-based) before the next one.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt.max(1))
    }
}

fn transient_message_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)rate.?limit|overloaded|service.?unavailable|upstream.?connect|connection.?refused|timed.?out")
            .expect("retry regex must compile")
    })
}

/// Status-code retry classification for transient failures.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Statuses that mean the caller's credentials were rejected. Never retried.
pub fn is_auth_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// Error text retry policy for failures without a retryable status.
pub fn is_retryable_error_text(error_text: &str) -> bool {
    transient_message_regex().is_match(error_text)
}
