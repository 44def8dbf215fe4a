mod input_sanitizer;
mod rate_limiter;

pub use input_sanitizer::{InputSanitizer, MAX_TEXT_CHARS};
pub use rate_limiter::{RateLimitError, RateLimiter};
