use brat_errors::AppError;
use std::sync::OnceLock;

const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_TEXT_CHARS: usize = 500;

fn email_pattern() -> &'static regex_lite::Regex {
    static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|_| {
            regex_lite::Regex::new(".^").unwrap()
        })
    })
}

pub struct InputSanitizer;

impl InputSanitizer {
    /// Trims and lowercases an address, rejecting anything that isn't shaped like one.
    pub fn normalize_email(email: &str) -> Result<String, AppError> {
        let email = email.trim().to_lowercase();

        if email.is_empty() {
            return Err(AppError::AuthFailure("email is required".to_string()));
        }

        if email.len() > MAX_EMAIL_LENGTH || !email_pattern().is_match(&email) {
            return Err(AppError::AuthFailure(format!("'{}' is not a valid email", email)));
        }

        Ok(email)
    }

    /// Drops control characters other than newlines and tabs. Text longer
    /// than `MAX_TEXT_CHARS` is rejected rather than cut.
    pub fn sanitize_text(text: &str) -> Result<String, AppError> {
        let cleaned: String = text
            .replace("\r\n", "\n")
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let len = cleaned.chars().count();
        if len > MAX_TEXT_CHARS {
            return Err(AppError::InvalidInput(format!(
                "text is {} characters, the limit is {}",
                len, MAX_TEXT_CHARS
            )));
        }
        Ok(cleaned)
    }
}
